//! End-to-end engine: candidate extraction, dictionary discovery, and
//! post labeling behind one configured entry point.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::dictionary::{discover, ThreadDictionary};
use crate::extract::CandidateExtractor;
use crate::label::{self, LabelMap};
use crate::lookup::{EmbedTitleMap, ValidationLookup};
use crate::post::Thread;

/// Everything one analysis run produces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadAnalysis {
    pub dictionary: ThreadDictionary,
    pub labels: LabelMap,
}

/// The engine owns a configuration and the extractor built from it; both
/// are immutable after construction, so one engine can serve any number
/// of threads and the same thread always produces the same output.
#[derive(Debug, Clone, Default)]
pub struct ThreadEngine {
    config: EngineConfig,
    extractor: CandidateExtractor,
}

impl ThreadEngine {
    pub fn new(config: EngineConfig) -> Self {
        let extractor = CandidateExtractor::new(config.extractor.clone());
        Self { config, extractor }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Raw candidate phrases for one text, in sorted order.
    pub fn candidates(&self, text: &str) -> Vec<String> {
        self.extractor.extract(text)
    }

    /// Build a validation lookup from the thread's own candidates, for
    /// categories with no external oracle. Phrases repeated across posts
    /// validate each other.
    pub fn self_validating_lookup(&self, thread: &Thread) -> ValidationLookup {
        let mut by_post: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for post in thread.replies() {
            let Some(content) = thread.text(&post.uri) else {
                continue;
            };
            let search = content.search_text(thread.root_text());
            let candidates = self.extractor.extract(&search);
            if !candidates.is_empty() {
                by_post.insert(post.uri.clone(), candidates);
            }
        }
        ValidationLookup::self_validating(&by_post, thread.root_text())
    }

    /// Discover the thread's dictionary against a validation lookup.
    pub fn discover(
        &self,
        thread: &Thread,
        lookup: &ValidationLookup,
        embeds: &EmbedTitleMap,
    ) -> ThreadDictionary {
        discover::discover_dictionary(
            thread,
            lookup,
            embeds,
            &self.extractor,
            &self.config.discovery,
        )
    }

    /// Label every reply against an already-discovered dictionary.
    pub fn label(
        &self,
        thread: &Thread,
        dictionary: &ThreadDictionary,
        lookup: &ValidationLookup,
        embeds: &EmbedTitleMap,
    ) -> LabelMap {
        label::label_posts(
            thread,
            dictionary,
            lookup,
            embeds,
            &self.extractor,
            &self.config.label,
        )
    }

    /// Full pipeline: discovery then labeling.
    pub fn analyze(
        &self,
        thread: &Thread,
        lookup: &ValidationLookup,
        embeds: &EmbedTitleMap,
    ) -> ThreadAnalysis {
        debug!(posts = thread.len(), "analyzing thread");
        let dictionary = self.discover(thread, lookup, embeds);
        let labels = self.label(thread, &dictionary, lookup, embeds);
        ThreadAnalysis { dictionary, labels }
    }
}
