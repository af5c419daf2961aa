//! The thread dictionary: the small controlled vocabulary discovered from
//! one thread, and the per-topic evidence that justified each entry.
//!
//! Discovery builds the dictionary ([`discover`]), merging collapses
//! near-duplicate canonicals ([`merge`]). Once labeling starts, the
//! dictionary is immutable.

pub mod discover;
pub mod merge;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::lookup::{Confidence, ValidationLookup};

/// One trusted topic and the evidence behind it.
///
/// Invariant after discovery: `confident_count >= 1`, and at least one
/// alias aligns with the canonical's significant words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    /// The validated, normalized topic name.
    pub canonical: String,
    /// Observed lowercase surface forms.
    pub aliases: BTreeSet<String>,
    /// Posts that named the topic through structured extraction.
    pub confident_count: u32,
    /// Posts that only matched by raw substring scan.
    pub incidental_count: u32,
    /// Every post that mentioned the topic either way.
    pub post_uris: BTreeSet<String>,
    /// Best confidence seen across all mentions.
    pub confidence: Confidence,
}

impl DictionaryEntry {
    pub(crate) fn new(canonical: impl Into<String>, confidence: Confidence) -> Self {
        Self {
            canonical: canonical.into(),
            aliases: BTreeSet::new(),
            confident_count: 0,
            incidental_count: 0,
            post_uris: BTreeSet::new(),
            confidence,
        }
    }

    /// Total independent mentions.
    pub fn mention_count(&self) -> u32 {
        self.confident_count + self.incidental_count
    }
}

/// The artifact a discovery pass produces: entries keyed by canonical,
/// merge redirects, and a lookup patched so candidates of merged-away
/// canonicals resolve to the survivor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadDictionary {
    pub entries: BTreeMap<String, DictionaryEntry>,
    /// Merged-away canonical → surviving canonical.
    pub redirects: BTreeMap<String, String>,
    /// Present when any merge happened.
    pub patched_lookup: Option<ValidationLookup>,
}

impl ThreadDictionary {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, canonical: &str) -> Option<&DictionaryEntry> {
        self.entries.get(canonical)
    }

    pub fn contains(&self, canonical: &str) -> bool {
        self.entries.contains_key(canonical)
    }

    /// Resolve a canonical through merge redirects to a surviving entry.
    pub fn resolve<'a>(&'a self, canonical: &'a str) -> Option<&'a str> {
        if self.entries.contains_key(canonical) {
            return Some(canonical);
        }
        let target = self.redirects.get(canonical)?;
        self.entries.contains_key(target).then_some(target.as_str())
    }

    /// The lookup labeling should use: the patched one if a merge produced
    /// it, otherwise the caller's base lookup.
    pub fn effective_lookup<'a>(&'a self, base: &'a ValidationLookup) -> &'a ValidationLookup {
        self.patched_lookup.as_ref().unwrap_or(base)
    }

    pub fn canonicals(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }
}
