//! Dictionary discovery: aggregate candidate evidence across a whole
//! thread into a small controlled vocabulary.
//!
//! Evidence comes in two grades. A **confident mention** is a candidate
//! found by structured extraction and validated by the lookup — someone
//! deliberately named the topic. An **incidental mention** is a lookup
//! pattern found only by raw substring scan — possibly a coincidence, so
//! it is held to stricter length requirements and never granted to a post
//! that is already confident for the same canonical.
//!
//! Aggregated tallies then pass a filter pipeline that deliberately trades
//! recall for precision: a false topic pollutes a user-visible list, a
//! false negative only misses one post.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::config::DiscoveryConfig;
use crate::extract::CandidateExtractor;
use crate::lookup::{Confidence, EmbedTitleMap, ValidationLookup};
use crate::post::Thread;
use crate::text::{
    find_all, normalize_lower, preceding_word, significant_words, word_count, SpanSet,
};

use super::{merge, DictionaryEntry, ThreadDictionary};

/// Words that do not count as a distinguishing prefix in the
/// prefix-fragment filter: articles, possessives, and conjunctions.
const PREFIX_NEUTRAL_WORDS: &[&str] = &[
    "a", "an", "and", "but", "her", "his", "its", "my", "or", "our", "the", "their", "your",
];

/// Per-canonical evidence tally accumulated during collection.
#[derive(Debug, Default, Clone)]
struct Tally {
    aliases: BTreeSet<String>,
    confident_posts: BTreeSet<String>,
    incidental_posts: BTreeSet<String>,
    confidence: Option<Confidence>,
}

impl Tally {
    fn record_confident(&mut self, alias: String, uri: &str, confidence: Confidence) {
        self.aliases.insert(alias);
        self.confident_posts.insert(uri.to_string());
        self.incidental_posts.remove(uri);
        self.confidence = Some(self.confidence.map_or(confidence, |c| c.max(confidence)));
    }

    fn record_incidental(&mut self, alias: String, uri: &str, confidence: Confidence) {
        if self.confident_posts.contains(uri) {
            return;
        }
        self.aliases.insert(alias);
        self.incidental_posts.insert(uri.to_string());
        self.confidence = Some(self.confidence.map_or(confidence, |c| c.max(confidence)));
    }
}

/// Discover the thread's dictionary.
///
/// Consumes the non-root posts' search text, the validation lookup, and any
/// pre-resolved embed titles. The root's own text suppresses boilerplate:
/// quoted copies of it contribute nothing, and lookup patterns occurring in
/// it are never incidental evidence.
pub fn discover_dictionary(
    thread: &Thread,
    lookup: &ValidationLookup,
    embeds: &EmbedTitleMap,
    extractor: &CandidateExtractor,
    config: &DiscoveryConfig,
) -> ThreadDictionary {
    let root_text = thread.root_text();
    let root_lower = normalize_lower(root_text);

    // ── Step 1: evidence collection ─────────────────────────────────────
    let mut tallies: BTreeMap<String, Tally> = BTreeMap::new();
    let mut searches: Vec<(String, String)> = Vec::new();

    for post in thread.replies() {
        if let Some(embed) = embeds.get(&post.uri) {
            tallies
                .entry(embed.canonical.clone())
                .or_default()
                .record_confident(
                    normalize_lower(&embed.canonical),
                    &post.uri,
                    Confidence::High,
                );
        }

        let Some(content) = thread.text(&post.uri) else {
            continue;
        };
        let search = content.search_text(root_text);
        if search.trim().is_empty() {
            continue;
        }
        let haystack = normalize_lower(&search);

        collect_forward(&haystack, &search, &post.uri, lookup, extractor, &mut tallies);
        collect_incidental(&haystack, &root_lower, &post.uri, lookup, config, &mut tallies);

        searches.push((post.uri.clone(), haystack));
    }

    // ── Step 2: filters ─────────────────────────────────────────────────
    let mut entries: BTreeMap<String, DictionaryEntry> = BTreeMap::new();
    for (canonical, tally) in tallies {
        if let Some(entry) = accept_tally(&canonical, tally, config) {
            entries.insert(canonical, entry);
        }
    }

    // ── Step 3: fragment dedup ──────────────────────────────────────────
    drop_contained_fragments(&mut entries);

    // ── Step 4: prefix-fragment filter ──────────────────────────────────
    drop_prefix_fragments(&mut entries, &searches, config);

    // ── Step 5: canonical merge ─────────────────────────────────────────
    let redirects = merge::merge_canonicals(&mut entries, config);
    let patched_lookup = (!redirects.is_empty()).then(|| {
        let mut patched = lookup.clone();
        patched.repoint(&redirects);
        patched
    });

    debug!(
        entries = entries.len(),
        redirects = redirects.len(),
        "dictionary discovery complete"
    );
    ThreadDictionary {
        entries,
        redirects,
        patched_lookup,
    }
}

/// Forward pass: structured candidates, longest-match-wins over the search
/// text, validated through the lookup.
fn collect_forward(
    haystack: &str,
    search: &str,
    uri: &str,
    lookup: &ValidationLookup,
    extractor: &CandidateExtractor,
    tallies: &mut BTreeMap<String, Tally>,
) {
    let mut candidates = extractor.extract(search);
    candidates.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));

    // Only validated candidates claim spans; an unvalidated longer phrase
    // must not shadow a validated title inside it.
    let mut spans = SpanSet::new();
    for candidate in &candidates {
        let needle = normalize_lower(candidate);
        if needle.is_empty() {
            continue;
        }
        let Some(entry) = lookup.get(&needle) else {
            continue;
        };
        let occurrences = find_all(haystack, &needle);
        // A candidate whose surface form was rewritten during extraction
        // (all-caps conversion, emoji stripping) may not occur literally;
        // it is accepted without claiming a span.
        if !occurrences.is_empty() && spans.claim_first(&occurrences).is_none() {
            continue;
        }
        trace!(candidate = %candidate, canonical = %entry.canonical, "confident mention");
        tallies
            .entry(entry.canonical.clone())
            .or_default()
            .record_confident(needle, uri, entry.confidence);
    }
}

/// Reverse pass: scan the raw lowercase search text for every lookup
/// pattern as a plain substring.
fn collect_incidental(
    haystack: &str,
    root_lower: &str,
    uri: &str,
    lookup: &ValidationLookup,
    config: &DiscoveryConfig,
    tallies: &mut BTreeMap<String, Tally>,
) {
    for (pattern, entry) in lookup.iter() {
        if entry.confidence == Confidence::Low {
            continue;
        }
        if pattern.chars().count() < config.incidental_min_chars
            && word_count(pattern) < config.incidental_min_words
        {
            continue;
        }
        if root_lower.contains(pattern.as_str()) {
            continue;
        }
        if haystack.contains(pattern.as_str()) {
            trace!(pattern = %pattern, canonical = %entry.canonical, "incidental mention");
            tallies
                .entry(entry.canonical.clone())
                .or_default()
                .record_incidental(pattern.clone(), uri, entry.confidence);
        }
    }
}

/// Apply the per-canonical filters. Any failure discards the canonical.
fn accept_tally(
    canonical: &str,
    tally: Tally,
    config: &DiscoveryConfig,
) -> Option<DictionaryEntry> {
    let confidence = tally.confidence.unwrap_or(Confidence::Low);
    let confident_count = tally.confident_posts.len() as u32;

    if confident_count == 0 {
        debug!(canonical, "dropped: no confident mention");
        return None;
    }
    if confidence == Confidence::Low
        && !tally.aliases.iter().any(|a| word_count(a) >= 3)
    {
        debug!(canonical, "dropped: low confidence without a 3-word alias");
        return None;
    }
    let sig_canonical = significant_words(canonical);
    if sig_canonical.len() <= config.short_canonical_words
        && confident_count < config.min_confident_for_short
    {
        debug!(
            canonical,
            confident_count, "dropped: short canonical below confident floor"
        );
        return None;
    }
    let aligned = tally.aliases.iter().any(|alias| {
        let sig_alias = significant_words(alias);
        let shared = sig_canonical.intersection(&sig_alias).count();
        shared as f64 / sig_canonical.len() as f64 >= config.alias_alignment_ratio
    });
    if !aligned {
        debug!(canonical, "dropped: no alias aligns with canonical words");
        return None;
    }

    let mut entry = DictionaryEntry::new(canonical, confidence);
    entry.confident_count = confident_count;
    entry.incidental_count = tally.incidental_posts.len() as u32;
    entry.post_uris = &tally.confident_posts | &tally.incidental_posts;
    entry.aliases = tally.aliases;
    Some(entry)
}

/// Delete a short canonical whose text is contained in a longer one when
/// every post mentioning the short one also mentions the long one — the
/// short form has zero independent evidence.
fn drop_contained_fragments(entries: &mut BTreeMap<String, DictionaryEntry>) {
    let keys: Vec<String> = entries.keys().cloned().collect();
    let mut doomed: BTreeSet<String> = BTreeSet::new();

    for short in &keys {
        for long in &keys {
            if short == long {
                continue;
            }
            if !normalize_lower(long).contains(&normalize_lower(short)) {
                continue;
            }
            let short_posts = &entries[short].post_uris;
            let long_posts = &entries[long].post_uris;
            if short_posts.is_subset(long_posts) {
                debug!(fragment = %short, of = %long, "dropped: contained fragment");
                doomed.insert(short.clone());
            }
        }
    }
    for key in doomed {
        entries.remove(&key);
    }
}

/// Delete a short canonical that is, in most of its occurrences, preceded
/// by one specific word — it is a truncated piece of a longer phrase the
/// lookup never validated ("October Sky" hiding behind "Sky").
fn drop_prefix_fragments(
    entries: &mut BTreeMap<String, DictionaryEntry>,
    searches: &[(String, String)],
    config: &DiscoveryConfig,
) {
    let keys: Vec<String> = entries.keys().cloned().collect();
    for canonical in keys {
        if word_count(&canonical) > config.prefix_fragment_max_words {
            continue;
        }
        let needle = normalize_lower(&canonical);
        let mut posts_with = 0usize;
        let mut total_occurrences = 0usize;
        let mut prefix_counts: BTreeMap<String, usize> = BTreeMap::new();

        for (_uri, haystack) in searches {
            let occurrences = find_all(haystack, &needle);
            if occurrences.is_empty() {
                continue;
            }
            posts_with += 1;
            for &(start, _) in &occurrences {
                total_occurrences += 1;
                if let Some(word) = preceding_word(haystack, start) {
                    if !PREFIX_NEUTRAL_WORDS.contains(&word.as_str()) {
                        *prefix_counts.entry(word).or_insert(0) += 1;
                    }
                }
            }
        }

        if posts_with < config.prefix_fragment_min_posts || total_occurrences == 0 {
            continue;
        }
        if let Some((word, count)) = prefix_counts.iter().max_by_key(|(_, c)| **c) {
            if *count as f64 / total_occurrences as f64 > config.prefix_fragment_ratio {
                debug!(canonical = %canonical, prefix = %word, "dropped: prefix fragment");
                entries.remove(&canonical);
            }
        }
    }
}
