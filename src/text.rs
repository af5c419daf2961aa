//! Shared text normalization and matching helpers.
//!
//! Everything in the pipeline compares text through these functions so that
//! the same folding rules (Unicode NFC, lowercasing, curly-quote folding)
//! apply uniformly to candidates, lookup keys, aliases, and search text.
//! Also provides the character-span bookkeeping used by longest-match-wins
//! matching, where a shorter pattern must not re-claim text already consumed
//! by a longer one.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Words that carry no identifying weight in a title: articles and common
/// prepositions. Excluded when computing significant-word sets.
pub const ARTICLES_AND_PREPOSITIONS: &[&str] = &[
    "a", "an", "the", "of", "in", "on", "at", "to", "for", "by", "with", "from",
];

/// Leading fragments stripped when computing a merge key, so that
/// "It's All Coming Back to Me Now" and "All Coming Back to Me Now"
/// normalize to the same key.
const LEADING_STRIP: &[&str] = &["it's", "its", "i'm", "that's", "the", "a", "an"];

static RE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s<>"')\]]+"#).unwrap()
});

static RE_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@[A-Za-z0-9_.-]+").unwrap()
});

static RE_HASHTAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#[A-Za-z0-9_]+").unwrap()
});

/// Fold curly quotation marks to their straight ASCII forms.
pub fn fold_quotes(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            _ => c,
        })
        .collect()
}

/// Canonical comparison form: NFC-normalized, quote-folded, lowercased.
///
/// Every substring match in the pipeline runs over text passed through this
/// function, so byte offsets from one match are valid against another.
pub fn normalize_lower(s: &str) -> String {
    fold_quotes(&s.nfc().collect::<String>()).to_lowercase()
}

/// Number of whitespace-separated words.
pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Trim leading/trailing punctuation (quotes, brackets, sentence marks).
pub fn trim_punct(s: &str) -> &str {
    s.trim_matches(|c: char| {
        c.is_ascii_punctuation() || matches!(c, '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}' | '\u{2026}')
    })
}

/// The set of lowercased words that identify a title, with articles and
/// prepositions removed. Falls back to all words when nothing survives
/// (e.g. the title "The The").
pub fn significant_words(s: &str) -> std::collections::BTreeSet<String> {
    let lower = normalize_lower(s);
    let all: Vec<String> = lower
        .split_whitespace()
        .map(trim_punct)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();
    let significant: std::collections::BTreeSet<String> = all
        .iter()
        .filter(|w| !ARTICLES_AND_PREPOSITIONS.contains(&w.as_str()))
        .cloned()
        .collect();
    if significant.is_empty() {
        all.into_iter().collect()
    } else {
        significant
    }
}

/// Normalized grouping key for canonical merging: lowercased, quote-folded,
/// leading contractions/articles stripped, trailing punctuation and plural
/// "s" stripped, whitespace collapsed.
pub fn merge_key(s: &str) -> String {
    let lower = normalize_lower(s);
    let mut words: Vec<&str> = lower.split_whitespace().collect();
    while words.len() > 1 {
        let head = trim_punct(words[0]);
        if LEADING_STRIP.contains(&head) {
            words.remove(0);
        } else {
            break;
        }
    }
    let mut key = words.join(" ");
    while key
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_punctuation())
    {
        key.pop();
    }
    if key.len() > 3 && key.ends_with('s') && !key.ends_with("ss") {
        key.pop();
    }
    key
}

/// Strip URLs, @mentions, #hashtags, and emoji; collapse whitespace.
///
/// Used by the whole-short-post fallback so that a post like
/// "Die Hard 🎄 https://example.com" reduces to its title words.
pub fn strip_noise(s: &str) -> String {
    let no_urls = RE_URL.replace_all(s, " ");
    let no_mentions = RE_MENTION.replace_all(&no_urls, " ");
    let no_tags = RE_HASHTAG.replace_all(&no_mentions, " ");
    let no_emoji: String = no_tags
        .chars()
        .filter(|&c| !is_emoji_char(c) && !is_emoji_modifier(c))
        .collect();
    no_emoji.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a character falls in the common emoji codepoint blocks.
pub fn is_emoji_char(c: char) -> bool {
    matches!(c as u32,
        0x1F1E6..=0x1F1FF   // regional indicators (flags)
        | 0x1F300..=0x1F5FF // misc symbols and pictographs
        | 0x1F600..=0x1F64F // emoticons
        | 0x1F680..=0x1F6FF // transport and map
        | 0x1F900..=0x1F9FF // supplemental symbols
        | 0x1FA00..=0x1FAFF // extended pictographs
        | 0x2600..=0x27BF   // misc symbols, dingbats
        | 0x2B00..=0x2BFF   // misc symbols and arrows
    )
}

/// Variation selectors, zero-width joiners, and skin-tone modifiers that
/// ride along with emoji and should be ignored when counting them.
pub fn is_emoji_modifier(c: char) -> bool {
    matches!(c as u32, 0xFE0E | 0xFE0F | 0x200D | 0x1F3FB..=0x1F3FF)
}

/// Convert a phrase to title case (first letter of each word uppercased,
/// remainder lowercased).
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// All byte-span occurrences of `needle` in `haystack`, including
/// overlapping alignments. Both arguments must already be normalized.
pub fn find_all(haystack: &str, needle: &str) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    if needle.is_empty() {
        return out;
    }
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(needle) {
        let start = from + pos;
        out.push((start, start + needle.len()));
        // Advance past the matched first char; one byte would land inside
        // it when the needle starts with a multibyte char.
        let step = haystack[start..].chars().next().map_or(1, char::len_utf8);
        from = start + step;
    }
    out
}

/// The lowercased word immediately preceding byte offset `start` in
/// `haystack`, if any. Punctuation is trimmed; `None` at line/text start.
pub fn preceding_word(haystack: &str, start: usize) -> Option<String> {
    let before = &haystack[..start];
    let line_start = before.rfind('\n').map_or(0, |p| p + 1);
    let word = before[line_start..].split_whitespace().next_back()?;
    let word = trim_punct(word);
    if word.is_empty() {
        None
    } else {
        Some(word.to_string())
    }
}

// ── Span bookkeeping ────────────────────────────────────────────────────

/// Claimed byte ranges within one search text.
///
/// Longest-match-wins: patterns are tried longest-first, each claiming the
/// first occurrence that does not overlap an already-claimed range, so a
/// shorter pattern cannot double-claim text consumed by a longer one.
#[derive(Debug, Clone, Default)]
pub struct SpanSet {
    spans: Vec<(usize, usize)>,
}

impl SpanSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `[start, end)` overlaps any claimed range.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.spans.iter().any(|&(s, e)| start < e && s < end)
    }

    /// Claim the first occurrence that overlaps nothing already claimed.
    pub fn claim_first(&mut self, occurrences: &[(usize, usize)]) -> Option<(usize, usize)> {
        let &(start, end) = occurrences
            .iter()
            .find(|&&(s, e)| !self.overlaps(s, e))?;
        self.spans.push((start, end));
        Some((start, end))
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_curly_quotes_and_case() {
        assert_eq!(normalize_lower("It\u{2019}s ALIVE"), "it's alive");
        assert_eq!(normalize_lower("\u{201C}Jaws\u{201D}"), "\"jaws\"");
    }

    #[test]
    fn significant_words_drop_articles_and_prepositions() {
        let words = significant_words("The Hunt for Red October");
        assert!(words.contains("hunt"));
        assert!(words.contains("red"));
        assert!(words.contains("october"));
        assert!(!words.contains("the"));
        assert!(!words.contains("for"));
    }

    #[test]
    fn significant_words_fall_back_when_all_words_are_stopwords() {
        let words = significant_words("The The");
        assert!(words.contains("the"), "must not return an empty set");
    }

    #[test]
    fn merge_key_strips_leading_contraction() {
        assert_eq!(
            merge_key("It\u{2019}s All Coming Back to Me Now"),
            merge_key("All Coming Back to Me Now"),
        );
    }

    #[test]
    fn merge_key_strips_trailing_plural_and_punctuation() {
        assert_eq!(merge_key("Gremlins!"), merge_key("Gremlin"));
        assert_eq!(merge_key("The Goonies"), merge_key("Goonie"));
    }

    #[test]
    fn merge_key_keeps_short_words_intact() {
        // "s"-stripping must not reduce very short words like "Up" or "Us".
        assert_eq!(merge_key("Us"), "us");
    }

    #[test]
    fn strip_noise_removes_urls_mentions_hashtags_emoji() {
        let cleaned = strip_noise("Die Hard \u{1F384} https://example.com @bob #xmas");
        assert_eq!(cleaned, "Die Hard");
    }

    #[test]
    fn find_all_reports_every_alignment() {
        let spans = find_all("abcabcabc", "abc");
        assert_eq!(spans, vec![(0, 3), (3, 6), (6, 9)]);
    }

    #[test]
    fn find_all_handles_multibyte_leading_needles() {
        // "é" is two bytes; the scan must step a whole char, not a byte.
        let spans = find_all("élite", "élite");
        assert_eq!(spans, vec![(0, 6)]);
        let spans = find_all("watch élite, élite is great", "élite");
        assert_eq!(spans, vec![(6, 12), (14, 20)]);
    }

    #[test]
    fn span_set_rejects_overlapping_claims() {
        let mut spans = SpanSet::new();
        assert_eq!(spans.claim_first(&[(0, 10)]), Some((0, 10)));
        assert_eq!(spans.claim_first(&[(5, 8)]), None);
        assert_eq!(spans.claim_first(&[(5, 8), (10, 13)]), Some((10, 13)));
    }

    #[test]
    fn preceding_word_stops_at_line_start() {
        let text = "first line\nsecond thing";
        let pos = text.find("thing").unwrap();
        assert_eq!(preceding_word(text, pos), Some("second".to_string()));
        let pos = text.find("second").unwrap();
        assert_eq!(preceding_word(text, pos), None);
    }

    #[test]
    fn title_case_converts_all_caps_runs() {
        assert_eq!(title_case("DIE HARD"), "Die Hard");
    }
}
