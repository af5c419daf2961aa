//! Engine configuration.
//!
//! Every empirically tuned constant in the pipeline — alias-alignment and
//! merge-overlap ratios, the prefix-fragment threshold, evidence floors,
//! the inheritance hop bound — is a field here rather than a buried magic
//! number, so deployments can re-validate the tuning against their own
//! gold-labeled threads. The static heuristic tables are likewise copied
//! into the config at construction, so tests can substitute smaller ones.
//!
//! `Default` reproduces the production tuning. Configs can also be loaded
//! from TOML; omitted fields keep their defaults.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::extract::tables;
use crate::label::inherit::{AFFIRMATION_PHRASES, AFFIRMATION_WORDS, ENDORSEMENT_EMOJI, PRAISE_PHRASES};

fn owned_set(table: &[&str]) -> BTreeSet<String> {
    table.iter().map(|s| s.to_string()).collect()
}

// ── Extractor ───────────────────────────────────────────────────────────

/// Tables and limits for candidate extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Lowercase phrases that are conversational noise, never topics.
    pub noise_phrases: BTreeSet<String>,
    /// Lowercase words that disqualify a quoted span when they lead it.
    pub leading_stopwords: BTreeSet<String>,
    /// Lowercase joiners allowed inside a title-case run.
    pub title_connectors: BTreeSet<String>,
    /// Uppercase acronyms excluded from all-caps extraction.
    pub known_acronyms: BTreeSet<String>,
    /// Lowercase one/two-word prefixes marking a line as a sentence.
    pub sentence_starters: BTreeSet<String>,
    /// Lowercase whole-line reaction vocabulary (the broad reaction test).
    pub reaction_stopwords: BTreeSet<String>,
    /// Character cap on quoted spans.
    pub max_quoted_chars: usize,
    /// Word cap on quoted spans.
    pub max_quoted_words: usize,
    /// Character cap on short answer lines.
    pub max_line_chars: usize,
    /// Word cap on short answer lines.
    pub max_line_words: usize,
    /// Character cap on bracketed alt-text markers.
    pub max_alt_chars: usize,
    /// Word cap on bracketed alt-text markers.
    pub max_alt_words: usize,
    /// Character cap on the whole-short-post fallback line.
    pub max_fallback_chars: usize,
    /// Inclusive word range for the whole-short-post fallback.
    pub fallback_min_words: usize,
    pub fallback_max_words: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            noise_phrases: owned_set(tables::NOISE_PHRASES),
            leading_stopwords: owned_set(tables::LEADING_STOPWORDS),
            title_connectors: owned_set(tables::TITLE_CONNECTORS),
            known_acronyms: owned_set(tables::KNOWN_ACRONYMS),
            sentence_starters: owned_set(tables::SENTENCE_STARTERS),
            reaction_stopwords: owned_set(tables::REACTION_STOPWORDS),
            max_quoted_chars: 60,
            max_quoted_words: 10,
            max_line_chars: 60,
            max_line_words: 5,
            max_alt_chars: 60,
            max_alt_words: 8,
            max_fallback_chars: 80,
            fallback_min_words: 2,
            fallback_max_words: 8,
        }
    }
}

// ── Discovery ───────────────────────────────────────────────────────────

/// Thresholds for dictionary discovery: evidence floors, filters, merging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Confident mentions required for a canonical with few significant
    /// words. Relax to 1 when validating against a user-supplied list.
    pub min_confident_for_short: u32,
    /// Significant-word count at or below which the floor above applies.
    pub short_canonical_words: usize,
    /// Reverse-scan patterns shorter than this (in chars) need the word
    /// floor below instead.
    pub incidental_min_chars: usize,
    /// Reverse-scan word floor for short patterns.
    pub incidental_min_words: usize,
    /// Fraction of a canonical's significant words an alias must share.
    pub alias_alignment_ratio: f64,
    /// Fraction of occurrences one preceding word must reach for a short
    /// canonical to be discarded as a truncated fragment.
    pub prefix_fragment_ratio: f64,
    /// Distinct posts a canonical must appear in before the prefix-fragment
    /// filter considers it.
    pub prefix_fragment_min_posts: usize,
    /// Word count at or below which the prefix-fragment filter applies.
    pub prefix_fragment_max_words: usize,
    /// Bidirectional significant-word overlap at which two canonicals merge.
    pub merge_overlap_ratio: f64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            min_confident_for_short: 2,
            short_canonical_words: 2,
            incidental_min_chars: 12,
            incidental_min_words: 3,
            alias_alignment_ratio: 0.60,
            prefix_fragment_ratio: 0.70,
            prefix_fragment_min_posts: 3,
            prefix_fragment_max_words: 3,
            merge_overlap_ratio: 0.85,
        }
    }
}

impl DiscoveryConfig {
    /// Tuning for list-validated mode: the caller supplied the answer list,
    /// so a single confident mention of a short canonical is trusted.
    pub fn list_validated() -> Self {
        Self {
            min_confident_for_short: 1,
            ..Self::default()
        }
    }
}

// ── Labeling ────────────────────────────────────────────────────────────

/// Tables and bounds for labeling and context inheritance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Maximum reply-hops an agreement post may inherit across.
    pub inherit_max_hops: usize,
    /// Word cap on a post for the strict agreement test.
    pub agreement_max_words: usize,
    /// Single words which, alone or repeated, signal agreement.
    pub affirmation_words: BTreeSet<String>,
    /// Whole-text affirmation phrases.
    pub affirmation_phrases: BTreeSet<String>,
    /// Whole-text praise/endorsement phrases.
    pub praise_phrases: BTreeSet<String>,
    /// Emoji that endorse the parent (amusement/surprise emoji excluded).
    pub endorsement_emoji: BTreeSet<String>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            inherit_max_hops: 2,
            agreement_max_words: 6,
            affirmation_words: owned_set(AFFIRMATION_WORDS),
            affirmation_phrases: owned_set(AFFIRMATION_PHRASES),
            praise_phrases: owned_set(PRAISE_PHRASES),
            endorsement_emoji: owned_set(ENDORSEMENT_EMOJI),
        }
    }
}

// ── Engine ──────────────────────────────────────────────────────────────

/// Full engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub extractor: ExtractorConfig,
    pub discovery: DiscoveryConfig,
    pub label: LabelConfig,
}

impl EngineConfig {
    /// Parse a configuration from TOML. Omitted fields keep their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Check threshold sanity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratios = [
            ("alias_alignment_ratio", self.discovery.alias_alignment_ratio),
            ("prefix_fragment_ratio", self.discovery.prefix_fragment_ratio),
            ("merge_overlap_ratio", self.discovery.merge_overlap_ratio),
        ];
        for (field, value) in ratios {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::RatioOutOfRange { field, value });
            }
        }
        let bounds = [
            (
                "min_confident_for_short",
                self.discovery.min_confident_for_short as usize,
            ),
            ("incidental_min_words", self.discovery.incidental_min_words),
            (
                "prefix_fragment_min_posts",
                self.discovery.prefix_fragment_min_posts,
            ),
            ("inherit_max_hops", self.label.inherit_max_hops),
            ("agreement_max_words", self.label.agreement_max_words),
        ];
        for (field, value) in bounds {
            if value == 0 {
                return Err(ConfigError::ZeroBound { field });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn list_validated_mode_relaxes_short_canonical_floor() {
        assert_eq!(DiscoveryConfig::default().min_confident_for_short, 2);
        assert_eq!(DiscoveryConfig::list_validated().min_confident_for_short, 1);
    }

    #[test]
    fn toml_overrides_single_threshold() {
        let config = EngineConfig::from_toml_str(
            r#"
            [discovery]
            merge_overlap_ratio = 0.9
            "#,
        )
        .unwrap();
        assert_eq!(config.discovery.merge_overlap_ratio, 0.9);
        // Untouched fields keep defaults.
        assert_eq!(config.discovery.alias_alignment_ratio, 0.60);
        assert_eq!(config.label.inherit_max_hops, 2);
    }

    #[test]
    fn out_of_range_ratio_is_rejected() {
        let result = EngineConfig::from_toml_str(
            r#"
            [discovery]
            prefix_fragment_ratio = 1.5
            "#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::RatioOutOfRange {
                field: "prefix_fragment_ratio",
                ..
            })
        ));
    }

    #[test]
    fn zero_hop_bound_is_rejected() {
        let result = EngineConfig::from_toml_str(
            r#"
            [label]
            inherit_max_hops = 0
            "#,
        );
        assert!(matches!(result, Err(ConfigError::ZeroBound { .. })));
    }

    #[test]
    fn malformed_toml_reports_parse_error() {
        assert!(matches!(
            EngineConfig::from_toml_str("[discovery"),
            Err(ConfigError::Toml { .. })
        ));
    }

    #[test]
    fn tables_can_be_substituted() {
        let mut config = ExtractorConfig::default();
        config.noise_phrases = ["tiny".to_string()].into_iter().collect();
        assert_eq!(config.noise_phrases.len(), 1);
    }
}
