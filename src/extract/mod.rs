//! Candidate-phrase extraction.
//!
//! A pure function from one post's text to the set of phrases that might
//! name a topic. Six independent strategies run over the text and their
//! results are unioned (case-sensitive dedup):
//!
//! 1. **Quoted spans** — text inside straight or curly double quotes
//! 2. **Title-case runs** — capitalized-word runs joined by connectors,
//!    computed per line, never across newlines
//! 3. **All-caps runs** — 2+ consecutive shouted words, minus acronyms
//! 4. **Short answer lines** — a whole line that reads like a bare answer
//! 5. **Alt-text markers** — bracketed image descriptions
//! 6. **Whole-short-post fallback** — a short first line, stripped of
//!    emoji/URLs/mentions/hashtags, taken as one more candidate
//!
//! Extraction is deterministic: identical input yields the identical
//! candidate set, returned sorted.

pub mod tables;

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::ExtractorConfig;
use crate::text::{normalize_lower, title_case, trim_punct, word_count, strip_noise};

static RE_STRAIGHT_QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([^"\n]{2,60})""#).unwrap()
});

static RE_CURLY_QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("\u{201C}([^\u{201D}\n]{2,60})\u{201D}").unwrap()
});

static RE_ALT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]\n]{1,60})\]").unwrap()
});

/// Punctuation that ends a clause and therefore a token run.
const TERMINAL_PUNCT: &[char] = &['.', ',', '!', '?', ';', ':'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenClass {
    /// Leads with an uppercase letter.
    Capital,
    /// All digits ("2 Fast 2 Furious").
    Numeric,
    /// Allowed joiner inside a run.
    Connector,
    /// Breaks a run.
    Other,
}

/// Candidate extractor with injected heuristic tables.
#[derive(Debug, Clone)]
pub struct CandidateExtractor {
    config: ExtractorConfig,
}

impl CandidateExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Extract every candidate phrase from one post's text.
    ///
    /// The result is logically a set: sorted, case-sensitively deduplicated,
    /// and independent of strategy order.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let mut out = BTreeSet::new();
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.quoted_spans(text, &mut out);
        self.title_case_runs(text, &mut out);
        self.all_caps_runs(text, &mut out);
        self.short_answer_lines(text, &mut out);
        self.alt_text_markers(text, &mut out);
        self.whole_post_fallback(text, &mut out);
        out.into_iter().collect()
    }

    // ── Strategy 1: quoted spans ────────────────────────────────────────

    fn quoted_spans(&self, text: &str, out: &mut BTreeSet<String>) {
        for re in [&*RE_STRAIGHT_QUOTED, &*RE_CURLY_QUOTED] {
            for capture in re.captures_iter(text) {
                let span = capture[1].trim();
                if self.accept_quoted(span) {
                    out.insert(span.to_string());
                }
            }
        }
    }

    fn accept_quoted(&self, span: &str) -> bool {
        let chars = span.chars().count();
        if chars < 2 || chars > self.config.max_quoted_chars {
            return false;
        }
        if word_count(span) > self.config.max_quoted_words {
            return false;
        }
        let lower = normalize_lower(span);
        if self.config.noise_phrases.contains(&lower) {
            return false;
        }
        if let Some(first) = lower.split_whitespace().next() {
            if self.config.leading_stopwords.contains(trim_punct(first)) {
                return false;
            }
        }
        // A single quoted word is only a title if it is capitalized.
        if word_count(span) == 1 && !span.chars().next().is_some_and(char::is_uppercase) {
            return false;
        }
        true
    }

    // ── Strategy 2: title-case runs (per line) ──────────────────────────

    fn classify(&self, token: &str) -> TokenClass {
        let clean = trim_punct(token);
        if clean.is_empty() {
            // "&" trims to nothing but is a connector in raw form.
            return if self.config.title_connectors.contains(token) {
                TokenClass::Connector
            } else {
                TokenClass::Other
            };
        }
        if self.config.title_connectors.contains(&clean.to_lowercase()) {
            return TokenClass::Connector;
        }
        if clean.chars().all(|c| c.is_ascii_digit()) {
            return TokenClass::Numeric;
        }
        match clean.chars().find(|c| c.is_alphabetic()) {
            Some(c) if c.is_uppercase() => TokenClass::Capital,
            _ => TokenClass::Other,
        }
    }

    fn title_case_runs(&self, text: &str, out: &mut BTreeSet<String>) {
        for line in text.lines() {
            let mut run: Vec<&str> = Vec::new();
            for token in line.split_whitespace() {
                match self.classify(token) {
                    TokenClass::Capital | TokenClass::Numeric | TokenClass::Connector => {
                        run.push(token);
                        if token.ends_with(TERMINAL_PUNCT) {
                            self.flush_title_run(&mut run, out);
                        }
                    }
                    TokenClass::Other => self.flush_title_run(&mut run, out),
                }
            }
            self.flush_title_run(&mut run, out);
        }
    }

    fn flush_title_run(&self, run: &mut Vec<&str>, out: &mut BTreeSet<String>) {
        // A capitalized leading connector ("The Hunt for Red October") is part
        // of the title as written; a lowercase one is sentence context.
        while run.first().is_some_and(|t| {
            self.classify(t) == TokenClass::Connector
                && !trim_punct(t).chars().next().is_some_and(char::is_uppercase)
        }) {
            run.remove(0);
        }
        while run
            .last()
            .is_some_and(|t| self.classify(t) == TokenClass::Connector)
        {
            run.pop();
        }
        let capitals = run
            .iter()
            .filter(|t| self.classify(t) == TokenClass::Capital)
            .count();
        if capitals >= 2 {
            let phrase = trim_punct(&run.join(" ")).to_string();
            if phrase.chars().count() >= 2
                && !self.config.noise_phrases.contains(&normalize_lower(&phrase))
            {
                out.insert(phrase);
            }
        }
        run.clear();
    }

    // ── Strategy 3: all-caps runs ───────────────────────────────────────

    fn is_caps_token(clean: &str) -> bool {
        clean.chars().count() >= 2 && clean.chars().all(|c| c.is_alphabetic() && c.is_uppercase())
    }

    fn all_caps_runs(&self, text: &str, out: &mut BTreeSet<String>) {
        for line in text.lines() {
            let mut run: Vec<&str> = Vec::new();
            for token in line.split_whitespace() {
                let clean = trim_punct(token);
                if Self::is_caps_token(clean) {
                    run.push(clean);
                    if token.ends_with(TERMINAL_PUNCT) {
                        self.flush_caps_run(&mut run, out);
                    }
                } else {
                    self.flush_caps_run(&mut run, out);
                }
            }
            self.flush_caps_run(&mut run, out);
        }
    }

    fn flush_caps_run(&self, run: &mut Vec<&str>, out: &mut BTreeSet<String>) {
        if run.len() >= 2
            && !run
                .iter()
                .all(|t| self.config.known_acronyms.contains(*t))
        {
            let phrase = title_case(&run.join(" "));
            if !self.config.noise_phrases.contains(&normalize_lower(&phrase)) {
                out.insert(phrase);
            }
        }
        run.clear();
    }

    // ── Strategy 4: short answer lines ──────────────────────────────────

    fn short_answer_lines(&self, text: &str, out: &mut BTreeSet<String>) {
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.chars().count() > self.config.max_line_chars {
                continue;
            }
            let words = word_count(line);
            if words == 0 || words > self.config.max_line_words {
                continue;
            }
            let body = trim_punct(line);
            if !body.chars().next().is_some_and(char::is_uppercase) {
                continue;
            }
            let lower = normalize_lower(body);
            if self.config.reaction_stopwords.contains(&lower) {
                continue;
            }
            if self.starts_like_sentence(&lower) {
                continue;
            }
            // Emit the punctuation-trimmed body so a fully-quoted line
            // yields the bare title, not a quote-wrapped duplicate.
            if body.chars().count() >= 2 {
                out.insert(body.to_string());
            }
        }
    }

    fn starts_like_sentence(&self, lower: &str) -> bool {
        let mut words = lower.split_whitespace();
        let Some(first) = words.next().map(trim_punct) else {
            return false;
        };
        if self.config.sentence_starters.contains(first) {
            return true;
        }
        if let Some(second) = words.next().map(trim_punct) {
            let bigram = format!("{first} {second}");
            if self.config.sentence_starters.contains(&bigram) {
                return true;
            }
        }
        false
    }

    // ── Strategy 5: bracketed alt-text markers ──────────────────────────

    fn alt_text_markers(&self, text: &str, out: &mut BTreeSet<String>) {
        for capture in RE_ALT_MARKER.captures_iter(text) {
            let span = capture[1].trim();
            let chars = span.chars().count();
            if chars < 2 || chars > self.config.max_alt_chars {
                continue;
            }
            if word_count(span) > self.config.max_alt_words {
                continue;
            }
            if self.config.noise_phrases.contains(&normalize_lower(span)) {
                continue;
            }
            out.insert(span.to_string());
        }
    }

    // ── Strategy 6: whole-short-post fallback ───────────────────────────

    fn whole_post_fallback(&self, text: &str, out: &mut BTreeSet<String>) {
        let Some(first_line) = text.lines().next() else {
            return;
        };
        let first_line = first_line.trim();
        if first_line.chars().count() > self.config.max_fallback_chars {
            return;
        }
        let cleaned = strip_noise(first_line);
        let candidate = trim_punct(&cleaned);
        let words = word_count(candidate);
        if words < self.config.fallback_min_words || words > self.config.fallback_max_words {
            return;
        }
        if self.config.noise_phrases.contains(&normalize_lower(candidate)) {
            return;
        }
        if candidate.chars().count() >= 2 {
            out.insert(candidate.to_string());
        }
    }
}

impl Default for CandidateExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}
