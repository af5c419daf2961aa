//! Post labeling: map each reply to the dictionary topics it discusses.
//!
//! Runs after discovery in two passes. Pass 1 finds direct evidence in a
//! post's own search text, forward (structured candidates through the
//! lookup) then reverse (known aliases as substrings); both strategies
//! union into one per-post topic set. Pass 2 lets pure agreement replies
//! inherit the nearest ancestor's direct topic set, so "yes this one"
//! under a "Die Hard" post counts toward Die Hard.
//!
//! Within a post, longer matches beat shorter ones via span claiming,
//! mirroring discovery.

pub mod inherit;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::LabelConfig;
use crate::dictionary::ThreadDictionary;
use crate::extract::CandidateExtractor;
use crate::lookup::{EmbedTitleMap, ValidationLookup};
use crate::post::Thread;
use crate::text::{find_all, normalize_lower, SpanSet};

use inherit::AgreementGrammar;

/// How a post earned its topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelSource {
    /// The post's own text names the topics.
    Direct,
    /// The post agrees with an ancestor that names them.
    Inherited,
}

/// One post's resolved topic set. Always non-empty; unlabeled posts are
/// absent from the map entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelAssignment {
    pub topics: BTreeSet<String>,
    pub source: LabelSource,
}

impl LabelAssignment {
    /// Whether the assignment names exactly this one topic.
    pub fn is_only(&self, canonical: &str) -> bool {
        self.topics.len() == 1 && self.topics.contains(canonical)
    }
}

/// Post URI to its topic set. Posts with no topics are absent.
pub type LabelMap = BTreeMap<String, LabelAssignment>;

/// Label every reply in the thread against an already-discovered
/// dictionary. The root is never labeled.
pub fn label_posts(
    thread: &Thread,
    dictionary: &ThreadDictionary,
    lookup: &ValidationLookup,
    embeds: &EmbedTitleMap,
    extractor: &CandidateExtractor,
    config: &LabelConfig,
) -> LabelMap {
    let lookup = dictionary.effective_lookup(lookup);
    let root_text = thread.root_text();
    let root_lower = normalize_lower(root_text);
    let patterns = alias_patterns(dictionary, &root_lower);

    // ── Pass 1: direct topics ───────────────────────────────────────────
    let mut labels = LabelMap::new();
    for post in thread.replies() {
        let mut topics: BTreeSet<String> = BTreeSet::new();

        if let Some(embed) = embeds.get(&post.uri) {
            if let Some(canonical) = dictionary.resolve(&embed.canonical) {
                topics.insert(canonical.to_string());
            }
        }
        if let Some(content) = thread.text(&post.uri) {
            let search = content.search_text(root_text);
            direct_topics(&search, dictionary, lookup, extractor, &patterns, &mut topics);
        }
        if !topics.is_empty() {
            trace!(uri = %post.uri, topics = topics.len(), "direct label");
            labels.insert(
                post.uri.clone(),
                LabelAssignment {
                    topics,
                    source: LabelSource::Direct,
                },
            );
        }
    }

    // ── Pass 2: inheritance through agreement chains ────────────────────
    let grammar = AgreementGrammar::new(config);
    let mut inherited: LabelMap = LabelMap::new();
    for post in thread.replies() {
        if labels.contains_key(&post.uri) {
            continue;
        }
        let Some(content) = thread.text(&post.uri) else {
            continue;
        };
        if !grammar.matches(&content.own_text) {
            continue;
        }
        for (hops, ancestor) in thread.ancestors(&post.uri).enumerate() {
            if hops >= config.inherit_max_hops {
                break;
            }
            if let Some(source) = labels.get(&ancestor.uri) {
                trace!(uri = %post.uri, from = %ancestor.uri, "inherited label");
                inherited.insert(
                    post.uri.clone(),
                    LabelAssignment {
                        topics: source.topics.clone(),
                        source: LabelSource::Inherited,
                    },
                );
                break;
            }
            // An unlabeled ancestor only passes the chain through when it
            // is itself pure agreement.
            let passes = thread
                .text(&ancestor.uri)
                .is_some_and(|t| grammar.matches(&t.own_text));
            if !passes {
                break;
            }
        }
    }
    labels.extend(inherited);

    debug!(labeled = labels.len(), posts = thread.replies().len(), "labeling complete");
    labels
}

/// Every substring pattern the reverse strategy may match, with the entry
/// it resolves to. Patterns occurring in the root prompt are excluded, and
/// the list is ordered longest-first for span claiming.
fn alias_patterns<'a>(
    dictionary: &'a ThreadDictionary,
    root_lower: &str,
) -> Vec<(String, &'a str)> {
    let mut patterns: Vec<(String, &str)> = Vec::new();
    for (canonical, entry) in &dictionary.entries {
        let mut forms: Vec<String> = entry.aliases.iter().cloned().collect();
        forms.push(normalize_lower(canonical));
        forms.sort();
        forms.dedup();
        for form in forms {
            if !form.is_empty() && !root_lower.contains(form.as_str()) {
                patterns.push((form, canonical.as_str()));
            }
        }
    }
    patterns.sort_by(|a, b| {
        b.0.chars()
            .count()
            .cmp(&a.0.chars().count())
            .then(a.0.cmp(&b.0))
    });
    patterns
}

/// Pass-1 matching for one post's search text. Both strategies union into
/// `topics`.
fn direct_topics(
    search: &str,
    dictionary: &ThreadDictionary,
    lookup: &ValidationLookup,
    extractor: &CandidateExtractor,
    patterns: &[(String, &str)],
    topics: &mut BTreeSet<String>,
) {
    if search.trim().is_empty() {
        return;
    }
    let haystack = normalize_lower(search);

    // Strategy A: structured candidates validated through the lookup.
    // Only validated candidates claim spans, mirroring discovery.
    let mut candidates = extractor.extract(search);
    candidates.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    let mut spans = SpanSet::new();
    for candidate in &candidates {
        let needle = normalize_lower(candidate);
        if needle.is_empty() {
            continue;
        }
        let Some(entry) = lookup.get(&needle) else {
            continue;
        };
        let occurrences = find_all(&haystack, &needle);
        if !occurrences.is_empty() && spans.claim_first(&occurrences).is_none() {
            continue;
        }
        if let Some(canonical) = dictionary.resolve(&entry.canonical) {
            topics.insert(canonical.to_string());
        }
    }

    // Strategy B: known aliases as raw substrings, longest first, claiming
    // character spans so a short alias cannot re-use a longer one's text.
    let mut spans = SpanSet::new();
    for (pattern, canonical) in patterns {
        let occurrences = find_all(&haystack, pattern);
        if occurrences.is_empty() {
            continue;
        }
        if spans.claim_first(&occurrences).is_some() {
            topics.insert(canonical.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::DictionaryEntry;
    use crate::lookup::Confidence;
    use crate::post::{Post, TextContent};

    fn thread(root_text: &str, replies: &[(&str, &str, &str)]) -> Thread {
        let mut posts = vec![Post::root("root")];
        let mut texts = BTreeMap::from([("root".to_string(), TextContent::own(root_text))]);
        for (uri, parent, text) in replies {
            posts.push(Post::reply(*uri, *parent));
            texts.insert(uri.to_string(), TextContent::own(*text));
        }
        Thread::new(posts, texts).unwrap()
    }

    fn dictionary(canonicals: &[&str]) -> ThreadDictionary {
        let mut dict = ThreadDictionary::default();
        for canonical in canonicals {
            let mut entry = DictionaryEntry::new(*canonical, Confidence::High);
            entry.confident_count = 2;
            entry.aliases.insert(normalize_lower(canonical));
            dict.entries.insert(canonical.to_string(), entry);
        }
        dict
    }

    fn label(thread: &Thread, dict: &ThreadDictionary, lookup: &ValidationLookup) -> LabelMap {
        label_posts(
            thread,
            dict,
            lookup,
            &EmbedTitleMap::new(),
            &CandidateExtractor::default(),
            &LabelConfig::default(),
        )
    }

    #[test]
    fn forward_candidate_earns_a_direct_label() {
        let thread = thread(
            "best action movie?",
            &[("p1", "root", "Die Hard"), ("p2", "root", "hmm let me think")],
        );
        let dict = dictionary(&["Die Hard"]);
        let lookup =
            ValidationLookup::from_entries([("die hard", "Die Hard", Confidence::High)]);
        let labels = label(&thread, &dict, &lookup);

        let p1 = labels.get("p1").expect("p1 must be labeled");
        assert!(p1.is_only("Die Hard"));
        assert_eq!(p1.source, LabelSource::Direct);
        assert!(!labels.contains_key("p2"));
    }

    #[test]
    fn reverse_alias_scan_labels_prose_mentions() {
        // No extraction strategy validates lowercase prose; the alias scan
        // still finds the title.
        let thread = thread(
            "best action movie?",
            &[("p1", "root", "i rewatch die hard every single december honestly")],
        );
        let dict = dictionary(&["Die Hard"]);
        let labels = label(&thread, &dict, &ValidationLookup::new());
        assert!(labels["p1"].is_only("Die Hard"));
    }

    #[test]
    fn post_naming_two_topics_gets_both() {
        let thread = thread(
            "best action movie?",
            &[("p1", "root", "tough call between \"Die Hard\" and \"Predator\"")],
        );
        let dict = dictionary(&["Die Hard", "Predator"]);
        let lookup = ValidationLookup::from_entries([
            ("die hard", "Die Hard", Confidence::High),
            ("predator", "Predator", Confidence::High),
        ]);
        let labels = label(&thread, &dict, &lookup);
        let topics = &labels["p1"].topics;
        assert!(topics.contains("Die Hard"));
        assert!(topics.contains("Predator"));
    }

    #[test]
    fn aliases_in_the_root_prompt_never_label() {
        let thread = thread(
            "is die hard a christmas movie?",
            &[("p1", "root", "die hard, obviously")],
        );
        let dict = dictionary(&["Die Hard"]);
        let labels = label(&thread, &dict, &ValidationLookup::new());
        assert!(
            labels.is_empty(),
            "a pattern from the prompt is boilerplate, not evidence"
        );
    }

    #[test]
    fn shorter_alias_cannot_reclaim_a_longer_ones_span() {
        let thread = thread(
            "best submarine movie?",
            &[("p1", "root", "the hunt for red october, no contest")],
        );
        let dict = dictionary(&["The Hunt for Red October", "Red October"]);
        let labels = label(&thread, &dict, &ValidationLookup::new());
        assert!(labels["p1"].is_only("The Hunt for Red October"));
    }

    #[test]
    fn agreement_reply_inherits_parent_topics() {
        let thread = thread(
            "best action movie?",
            &[("p1", "root", "Die Hard"), ("p2", "p1", "yes this one")],
        );
        let dict = dictionary(&["Die Hard"]);
        let lookup =
            ValidationLookup::from_entries([("die hard", "Die Hard", Confidence::High)]);
        let labels = label(&thread, &dict, &lookup);

        let p2 = labels.get("p2").expect("agreement reply inherits");
        assert!(p2.is_only("Die Hard"));
        assert_eq!(p2.source, LabelSource::Inherited);
    }

    #[test]
    fn inherited_set_is_copied_verbatim() {
        let thread = thread(
            "best action movie?",
            &[
                ("p1", "root", "tough call between \"Die Hard\" and \"Predator\""),
                ("p2", "p1", "agreed"),
            ],
        );
        let dict = dictionary(&["Die Hard", "Predator"]);
        let lookup = ValidationLookup::from_entries([
            ("die hard", "Die Hard", Confidence::High),
            ("predator", "Predator", Confidence::High),
        ]);
        let labels = label(&thread, &dict, &lookup);
        assert_eq!(labels["p2"].topics, labels["p1"].topics);
        assert_eq!(labels["p2"].source, LabelSource::Inherited);
    }

    #[test]
    fn inheritance_passes_through_an_agreeing_middle_post() {
        let thread = thread(
            "best action movie?",
            &[
                ("p1", "root", "Die Hard"),
                ("p2", "p1", "this"),
                ("p3", "p2", "💯"),
            ],
        );
        let dict = dictionary(&["Die Hard"]);
        let lookup =
            ValidationLookup::from_entries([("die hard", "Die Hard", Confidence::High)]);
        let labels = label(&thread, &dict, &lookup);
        assert_eq!(labels["p2"].source, LabelSource::Inherited);
        assert!(labels["p3"].is_only("Die Hard"));
    }

    #[test]
    fn inheritance_stops_past_the_hop_cap() {
        let thread = thread(
            "best action movie?",
            &[
                ("p1", "root", "Die Hard"),
                ("p2", "p1", "this"),
                ("p3", "p2", "yes"),
                ("p4", "p3", "agreed"),
            ],
        );
        let dict = dictionary(&["Die Hard"]);
        let lookup =
            ValidationLookup::from_entries([("die hard", "Die Hard", Confidence::High)]);
        let labels = label(&thread, &dict, &lookup);
        assert!(labels.contains_key("p2"));
        assert!(labels.contains_key("p3"));
        assert!(
            !labels.contains_key("p4"),
            "three hops back to the direct label is past the cap"
        );
    }

    #[test]
    fn agreement_under_an_unlabeled_parent_stays_unlabeled() {
        let thread = thread(
            "best action movie?",
            &[
                ("p1", "root", "i can never pick just one"),
                ("p2", "p1", "same"),
            ],
        );
        let dict = dictionary(&["Die Hard"]);
        let labels = label(&thread, &dict, &ValidationLookup::new());
        assert!(labels.is_empty());
    }

    #[test]
    fn inheritance_never_walks_past_a_substantive_ancestor() {
        // p3 agrees, but its parent p2 neither agrees nor has topics; the
        // chain must stop there instead of reaching p1.
        let thread = thread(
            "best action movie?",
            &[
                ("p1", "root", "Die Hard"),
                ("p2", "p1", "hmm not sure about that ranking"),
                ("p3", "p2", "yes exactly"),
            ],
        );
        let dict = dictionary(&["Die Hard"]);
        let lookup =
            ValidationLookup::from_entries([("die hard", "Die Hard", Confidence::High)]);
        let labels = label(&thread, &dict, &lookup);
        assert!(!labels.contains_key("p3"));
    }

    #[test]
    fn embed_title_labels_without_any_text_match() {
        let thread = thread(
            "favorite karaoke song?",
            &[("p1", "root", "this one, every time")],
        );
        let dict = dictionary(&["Total Eclipse of the Heart"]);
        let embeds: EmbedTitleMap = [(
            "p1".to_string(),
            crate::lookup::EmbedTitle {
                canonical: "Total Eclipse of the Heart".into(),
                song: true,
            },
        )]
        .into();
        let labels = label_posts(
            &thread,
            &dict,
            &ValidationLookup::new(),
            &embeds,
            &CandidateExtractor::default(),
            &LabelConfig::default(),
        );
        assert!(labels["p1"].is_only("Total Eclipse of the Heart"));
        assert_eq!(labels["p1"].source, LabelSource::Direct);
    }

    #[test]
    fn merged_canonicals_label_under_the_survivor() {
        let mut dict = dictionary(&["Die Hard"]);
        dict.redirects
            .insert("Die Hard 1".to_string(), "Die Hard".to_string());
        let thread = thread("best action movie?", &[("p1", "root", "Die Hard 1")]);
        let lookup =
            ValidationLookup::from_entries([("die hard 1", "Die Hard 1", Confidence::High)]);
        let labels = label(&thread, &dict, &lookup);
        assert!(labels["p1"].is_only("Die Hard"));
    }
}
