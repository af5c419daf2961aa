//! Validation lookup: the oracle interface that turns a raw candidate
//! phrase into a canonical topic name with a confidence grade.
//!
//! The lookup itself is a plain map keyed by the normalized lowercase
//! candidate; many candidates may resolve to one canonical. It can be
//! populated three ways:
//!
//! 1. [`ValidationLookup::from_entries`] — results of an external title
//!    database oracle, resolved upstream (the oracle's network side is an
//!    excluded collaborator).
//! 2. [`ValidationLookup::from_answer_list`] — a user-supplied canonical
//!    answer list, fuzzy-matched against the thread's candidates via
//!    normalized containment.
//! 3. [`ValidationLookup::self_validating`] — a structural fallback that
//!    clusters candidates by normalized surface form, suppressing answers
//!    that merely echo the root prompt's category words.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::text::{merge_key, normalize_lower, significant_words};

/// Shortest normalized string allowed to participate in containment
/// matching against an answer list.
const MIN_CONTAINMENT_CHARS: usize = 3;

/// Confidence grade of a validation entry. Ordered: `High > Medium > Low`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// A validated candidate: its canonical form and how sure the oracle was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationEntry {
    pub canonical: String,
    pub confidence: Confidence,
}

/// Map from normalized lowercase candidate to its validation entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationLookup {
    entries: BTreeMap<String, ValidationEntry>,
}

impl ValidationLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pre-resolved oracle results.
    pub fn from_entries<K, C>(entries: impl IntoIterator<Item = (K, C, Confidence)>) -> Self
    where
        K: AsRef<str>,
        C: Into<String>,
    {
        let mut lookup = Self::new();
        for (candidate, canonical, confidence) in entries {
            lookup.insert(candidate.as_ref(), canonical, confidence);
        }
        lookup
    }

    /// Insert one entry. The candidate key is normalized; an existing entry
    /// is only replaced by one of strictly higher confidence.
    pub fn insert(
        &mut self,
        candidate: &str,
        canonical: impl Into<String>,
        confidence: Confidence,
    ) {
        let key = normalize_lower(candidate);
        if key.is_empty() {
            return;
        }
        let entry = ValidationEntry {
            canonical: canonical.into(),
            confidence,
        };
        match self.entries.get(&key) {
            Some(existing) if existing.confidence >= confidence => {}
            _ => {
                self.entries.insert(key, entry);
            }
        }
    }

    /// Look up a candidate. A miss means "unknown", never an error.
    pub fn get(&self, candidate: &str) -> Option<&ValidationEntry> {
        self.entries.get(&normalize_lower(candidate))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ValidationEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-point entries whose canonical was merged away. `redirects` must
    /// already be transitively resolved (loser → final winner).
    pub(crate) fn repoint(&mut self, redirects: &BTreeMap<String, String>) {
        for entry in self.entries.values_mut() {
            if let Some(winner) = redirects.get(&entry.canonical) {
                entry.canonical = winner.clone();
            }
        }
    }

    // ── Mode 2: user-supplied answer list ───────────────────────────────

    /// Fuzzy-match the thread's candidate universe against a user-supplied
    /// list of canonical answers. An exact normalized match validates with
    /// high confidence; containment either way with medium.
    pub fn from_answer_list<'a>(
        answers: impl IntoIterator<Item = &'a str>,
        candidates: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let answers: Vec<(String, String)> = answers
            .into_iter()
            .map(|a| (a.trim().to_string(), normalize_lower(a.trim())))
            .filter(|(_, norm)| !norm.is_empty())
            .collect();
        let mut lookup = Self::new();
        for candidate in candidates {
            let norm = normalize_lower(candidate.trim());
            if norm.chars().count() < MIN_CONTAINMENT_CHARS {
                continue;
            }
            for (canonical, answer_norm) in &answers {
                if norm == *answer_norm {
                    lookup.insert(candidate, canonical.clone(), Confidence::High);
                    break;
                }
                let shorter = norm.chars().count().min(answer_norm.chars().count());
                if shorter >= MIN_CONTAINMENT_CHARS
                    && (norm.contains(answer_norm.as_str()) || answer_norm.contains(&norm))
                {
                    lookup.insert(candidate, canonical.clone(), Confidence::Medium);
                    break;
                }
            }
        }
        lookup
    }

    // ── Mode 3: structural self-validation ──────────────────────────────

    /// Oracle-free fallback: cluster the per-post candidate sets by
    /// normalized surface form. A phrasing independently produced by
    /// several posts is treated as a real topic; candidates whose
    /// significant words all echo the root prompt's category words
    /// ("river" under "name a river") are suppressed.
    pub fn self_validating(
        candidates_by_post: &BTreeMap<String, Vec<String>>,
        root_text: &str,
    ) -> Self {
        #[derive(Default)]
        struct Cluster {
            surfaces: BTreeMap<String, u32>,
            posts: BTreeSet<String>,
        }

        let category_words = significant_words(root_text);
        let mut clusters: BTreeMap<String, Cluster> = BTreeMap::new();

        for (uri, candidates) in candidates_by_post {
            for candidate in candidates {
                let key = merge_key(candidate);
                if key.is_empty() {
                    continue;
                }
                let words = significant_words(candidate);
                if words.iter().all(|w| category_words.contains(w)) {
                    continue;
                }
                let cluster = clusters.entry(key).or_default();
                *cluster.surfaces.entry(candidate.clone()).or_insert(0) += 1;
                cluster.posts.insert(uri.clone());
            }
        }

        let mut lookup = Self::new();
        for cluster in clusters.values() {
            if cluster.posts.len() < 2 {
                continue;
            }
            let canonical = cluster
                .surfaces
                .iter()
                .max_by_key(|(surface, count)| (**count, surface.chars().count()))
                .map(|(surface, _)| surface.clone())
                .unwrap_or_default();
            let confidence = if cluster.posts.len() >= 3 {
                Confidence::Medium
            } else {
                Confidence::Low
            };
            for surface in cluster.surfaces.keys() {
                lookup.insert(surface, canonical.clone(), confidence);
            }
        }
        lookup
    }
}

/// A pre-resolved outbound-link title for one post, consumed as a confident
/// match in both discovery and labeling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedTitle {
    pub canonical: String,
    /// Whether the resolved link was a song rather than another media kind.
    #[serde(default)]
    pub song: bool,
}

/// `post URI → pre-resolved embed title`.
pub type EmbedTitleMap = BTreeMap<String, EmbedTitle>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_ordering_puts_high_first() {
        assert!(Confidence::High > Confidence::Medium);
        assert!(Confidence::Medium > Confidence::Low);
    }

    #[test]
    fn get_normalizes_the_key() {
        let mut lookup = ValidationLookup::new();
        lookup.insert("Die Hard", "Die Hard", Confidence::High);
        assert!(lookup.get("die hard").is_some());
        assert!(lookup.get("DIE HARD").is_some());
        assert!(lookup.get("It\u{2019}s a wonderful life").is_none());
    }

    #[test]
    fn insert_keeps_higher_confidence_entry() {
        let mut lookup = ValidationLookup::new();
        lookup.insert("die hard", "Die Hard", Confidence::High);
        lookup.insert("die hard", "Die Hard 2", Confidence::Low);
        assert_eq!(lookup.get("die hard").unwrap().canonical, "Die Hard");

        lookup.insert("die hard", "Die Hard With a Vengeance", Confidence::High);
        assert_eq!(
            lookup.get("die hard").unwrap().canonical,
            "Die Hard",
            "equal confidence keeps the first entry"
        );
    }

    #[test]
    fn answer_list_exact_match_is_high_confidence() {
        let lookup =
            ValidationLookup::from_answer_list(["Die Hard"], ["die hard", "Die Hard"]);
        let entry = lookup.get("Die Hard").unwrap();
        assert_eq!(entry.canonical, "Die Hard");
        assert_eq!(entry.confidence, Confidence::High);
    }

    #[test]
    fn answer_list_containment_is_medium_confidence() {
        let lookup = ValidationLookup::from_answer_list(
            ["The Hunt for Red October"],
            ["Hunt for Red October"],
        );
        let entry = lookup.get("Hunt for Red October").unwrap();
        assert_eq!(entry.canonical, "The Hunt for Red October");
        assert_eq!(entry.confidence, Confidence::Medium);
    }

    #[test]
    fn answer_list_ignores_tiny_candidates() {
        let lookup = ValidationLookup::from_answer_list(["Up"], ["up", "it"]);
        assert!(lookup.is_empty(), "two-char candidates cannot match by containment");
    }

    #[test]
    fn self_validation_clusters_repeated_phrasings() {
        let candidates: BTreeMap<String, Vec<String>> = [
            ("p1".to_string(), vec!["Die Hard".to_string()]),
            ("p2".to_string(), vec!["Die Hard".to_string()]),
            ("p3".to_string(), vec!["die hards".to_string()]),
        ]
        .into();
        let lookup = ValidationLookup::self_validating(&candidates, "best action movie?");
        let entry = lookup.get("Die Hard").unwrap();
        assert_eq!(entry.canonical, "Die Hard");
        assert_eq!(entry.confidence, Confidence::Medium, "three posts agree");
    }

    #[test]
    fn self_validation_needs_two_posts() {
        let candidates: BTreeMap<String, Vec<String>> = [(
            "p1".to_string(),
            vec!["Die Hard".to_string(), "Die Hard".to_string()],
        )]
        .into();
        let lookup = ValidationLookup::self_validating(&candidates, "best action movie?");
        assert!(
            lookup.get("Die Hard").is_none(),
            "one post repeating itself is not independent evidence"
        );
    }

    #[test]
    fn self_validation_suppresses_category_echo() {
        let candidates: BTreeMap<String, Vec<String>> = [
            ("p1".to_string(), vec!["River".to_string()]),
            ("p2".to_string(), vec!["River".to_string()]),
            ("p3".to_string(), vec!["Mississippi River".to_string()]),
            ("p4".to_string(), vec!["Mississippi River".to_string()]),
        ]
        .into();
        let lookup = ValidationLookup::self_validating(&candidates, "name a river");
        assert!(lookup.get("River").is_none(), "category echo must be suppressed");
        assert!(lookup.get("Mississippi River").is_some());
    }

    #[test]
    fn repoint_rewrites_merged_canonicals() {
        let mut lookup = ValidationLookup::new();
        lookup.insert("red october", "Red October", Confidence::Medium);
        let redirects: BTreeMap<String, String> = [(
            "Red October".to_string(),
            "The Hunt for Red October".to_string(),
        )]
        .into();
        lookup.repoint(&redirects);
        assert_eq!(
            lookup.get("red october").unwrap().canonical,
            "The Hunt for Red October"
        );
    }
}
