//! Agreement grammar: does a reply merely endorse its parent?
//!
//! A reply like "yes this one" or a bare "💯" names no topic of its own;
//! its topic is whatever its ancestor was talking about. The grammar here
//! is deliberately strict. Any word outside the closed affirmation
//! vocabulary, any non-endorsement emoji, or any text beyond a few words
//! disqualifies the post, because inheriting a label onto a post that
//! actually changed the subject is worse than leaving it unlabeled.

use crate::config::LabelConfig;
use crate::text::{is_emoji_char, is_emoji_modifier, normalize_lower, trim_punct, word_count};

/// Single words that signal agreement on their own.
pub const AFFIRMATION_WORDS: &[&str] = &[
    "100",
    "+1",
    "absolutely",
    "agree",
    "agreed",
    "also",
    "correct",
    "definitely",
    "exactly",
    "facts",
    "mine",
    "one",
    "same",
    "seconded",
    "this",
    "too",
    "true",
    "truth",
    "yeah",
    "yep",
    "yes",
    "yess",
    "yup",
];

/// Whole-post phrases that signal agreement.
pub const AFFIRMATION_PHRASES: &[&str] = &[
    "came here to say this",
    "this is it",
    "this is the answer",
    "this is the one",
    "this one",
    "this right here",
    "my answer too",
    "my pick too",
    "so true",
    "was about to say this",
    "what i was going to say",
];

/// Whole-post phrases that praise the parent's pick.
pub const PRAISE_PHRASES: &[&str] = &[
    "excellent choice",
    "good call",
    "good choice",
    "good one",
    "great answer",
    "great call",
    "great choice",
    "great pick",
    "perfect answer",
    "perfect choice",
    "solid pick",
];

/// Emoji that count as endorsement rather than topic content.
pub const ENDORSEMENT_EMOJI: &[&str] = &[
    "❤", "❤️", "✅", "🎯", "👍", "👏", "💪", "💯", "🔥", "🙌",
];

/// Matcher over the closed agreement vocabulary. Built per labeling run
/// from the active [`LabelConfig`].
pub struct AgreementGrammar<'a> {
    config: &'a LabelConfig,
}

impl<'a> AgreementGrammar<'a> {
    pub fn new(config: &'a LabelConfig) -> Self {
        Self { config }
    }

    /// Whether `text` is pure agreement with no topic content of its own.
    pub fn matches(&self, text: &str) -> bool {
        let lowered = normalize_lower(text);

        // Strip endorsement emoji, then reject any emoji that remains.
        let mut stripped = lowered.clone();
        for emoji in &self.config.endorsement_emoji {
            stripped = stripped.replace(emoji.as_str(), " ");
        }
        let had_endorsement = stripped != lowered;
        if stripped
            .chars()
            .any(|c| is_emoji_char(c) && !is_emoji_modifier(c))
        {
            return false;
        }
        let body: String = stripped
            .chars()
            .filter(|&c| !is_emoji_modifier(c))
            .collect();
        let body = body.trim();

        if body.is_empty() {
            return had_endorsement;
        }
        if word_count(body) > self.config.agreement_max_words {
            return false;
        }

        let phrase = trim_punct(body);
        if self.config.affirmation_phrases.contains(phrase)
            || self.config.praise_phrases.contains(phrase)
        {
            return true;
        }

        body.split_whitespace().all(|token| {
            let token = trim_punct(token);
            !token.is_empty() && self.config.affirmation_words.contains(token)
        })
    }
}
