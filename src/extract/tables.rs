//! Static heuristic tables for candidate extraction.
//!
//! Compiled-in defaults, copied into [`crate::config::ExtractorConfig`] at
//! construction so tests and callers can substitute smaller or
//! domain-specific tables. All entries are lowercase except
//! [`KNOWN_ACRONYMS`].

/// Quoted or title-cased phrases that are conversational noise, never
/// topic names.
pub const NOISE_PHRASES: &[&str] = &[
    "all time",
    "amazing",
    "banger",
    "best movie",
    "best movie ever",
    "chef's kiss",
    "classic",
    "facts",
    "goated",
    "hear me out",
    "hot take",
    "iykyk",
    "masterpiece",
    "no notes",
    "of all time",
    "peak cinema",
    "so good",
    "so true",
    "the best",
    "the goat",
    "the one",
    "the whole thing",
    "this",
    "this one",
    "underrated",
    "unpopular opinion",
];

/// Words that disqualify a quoted span when they lead it: pronouns and
/// conjunctions signal quoted conversation, not a quoted title.
pub const LEADING_STOPWORDS: &[&str] = &[
    "and", "because", "but", "he", "her", "his", "how", "i", "if", "it", "my", "or", "our", "she",
    "that", "their", "these", "they", "this", "those", "we", "what", "when", "where", "who", "why",
    "you", "your",
];

/// Joiner words allowed inside a title-case run without breaking it:
/// articles, short prepositions, "vs", and the ampersand.
pub const TITLE_CONNECTORS: &[&str] = &[
    "a", "an", "and", "at", "by", "for", "from", "in", "of", "on", "or", "the", "to", "vs", "vs.",
    "with", "&",
];

/// All-caps tokens that are internet/common acronyms, not shouted titles.
pub const KNOWN_ACRONYMS: &[&str] = &[
    "AMA", "ASAP", "BTW", "CIA", "DM", "EU", "FBI", "FR", "FWIW", "FYI", "GOAT", "ICYMI", "IDK",
    "IIRC", "IMHO", "IMO", "IRL", "LA", "LMAO", "LMFAO", "LOL", "NASA", "NGL", "NY", "NYC", "OK",
    "OMG", "PSA", "RIP", "RT", "SMH", "TBH", "TIL", "TV", "UK", "UN", "US", "USA", "WTF",
];

/// Word (or two-word) prefixes marking a line as a sentence rather than a
/// bare answer. Deliberately excludes the article "the", which leads many
/// real titles.
pub const SENTENCE_STARTERS: &[&str] = &[
    "also",
    "and",
    "because",
    "but",
    "he",
    "honestly",
    "how",
    "i",
    "i'd",
    "i'll",
    "i'm",
    "i've",
    "if",
    "it",
    "it's",
    "just",
    "maybe",
    "my",
    "not",
    "or",
    "probably",
    "she",
    "so",
    "that",
    "the way",
    "there",
    "they",
    "this",
    "watching",
    "we",
    "what",
    "when",
    "why",
    "you",
];

/// Whole-line reaction vocabulary (the broad "is this a reaction" test).
/// A short answer line matching one of these is chatter, not an answer.
pub const REACTION_STOPWORDS: &[&str] = &[
    "amazing",
    "based",
    "beautiful",
    "crying",
    "dead",
    "facts",
    "fr",
    "ha",
    "haha",
    "hahaha",
    "incredible",
    "lmao",
    "lmfao",
    "lol",
    "love it",
    "mood",
    "no",
    "nope",
    "omg",
    "oof",
    "perfect",
    "real",
    "rip",
    "same",
    "screaming",
    "so good",
    "so true",
    "stop",
    "this",
    "wow",
    "yep",
    "yes",
];
