//! Canonical merging: collapse near-duplicate dictionary entries.
//!
//! Validation oracles are inconsistent about leading articles, plural
//! forms, and filler contractions, so the same topic can surface under
//! several canonical spellings. Two passes repair this:
//!
//! 1. entries sharing a normalized merge key are unconditionally merged,
//! 2. remaining pairs merge when their significant words overlap almost
//!    completely in both directions.
//!
//! Every losing canonical is recorded as a redirect so later lookups can
//! still resolve the old spelling.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::DiscoveryConfig;
use crate::text::{merge_key, significant_words};

use super::DictionaryEntry;

/// Merge duplicate canonicals in place, returning the redirect map from
/// each absorbed canonical to its surviving one. Redirect chains are
/// flattened so every value is itself a surviving key.
pub fn merge_canonicals(
    entries: &mut BTreeMap<String, DictionaryEntry>,
    config: &DiscoveryConfig,
) -> BTreeMap<String, String> {
    let mut redirects: BTreeMap<String, String> = BTreeMap::new();

    // ── Pass 1: exact merge-key collisions ──────────────────────────────
    let mut by_key: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for canonical in entries.keys() {
        by_key
            .entry(merge_key(canonical))
            .or_default()
            .push(canonical.clone());
    }
    for (_key, group) in by_key {
        if group.len() < 2 {
            continue;
        }
        let winner = pick_winner(&group, entries);
        for loser in group {
            if loser != winner {
                absorb(entries, &mut redirects, &winner, &loser);
            }
        }
    }

    // ── Pass 2: near-total significant-word overlap ─────────────────────
    // Overlap is a property of the canonical names, which this pass never
    // creates, so one worklist sweep sees every mergeable pair. When the
    // current entry loses a merge, the winner takes its slot and rescans
    // the remainder. Each merge removes one entry, so the sweep does at
    // most one quadratic scan plus one rescan per merge.
    let mut keys: Vec<String> = entries.keys().cloned().collect();
    let mut i = 0;
    while i < keys.len() {
        let mut j = i + 1;
        while j < keys.len() {
            if !overlapping(&keys[i], &keys[j], config.merge_overlap_ratio) {
                j += 1;
                continue;
            }
            let winner = pick_winner(&[keys[i].clone(), keys[j].clone()], entries);
            if winner == keys[i] {
                let loser = keys.remove(j);
                absorb(entries, &mut redirects, &winner, &loser);
            } else {
                let loser = keys.remove(i);
                absorb(entries, &mut redirects, &winner, &loser);
                keys.swap(i, j - 1);
                j = i + 1;
            }
        }
        i += 1;
    }

    // ── Flatten chains ──────────────────────────────────────────────────
    let targets: Vec<String> = redirects.keys().cloned().collect();
    for from in targets {
        let mut to = redirects[&from].clone();
        let mut hops = 0;
        while let Some(next) = redirects.get(&to) {
            to = next.clone();
            hops += 1;
            if hops > redirects.len() {
                break;
            }
        }
        redirects.insert(from, to);
    }
    redirects
}

/// Whether both canonicals share at least `ratio` of the other's
/// significant words, in both directions.
fn overlapping(a: &str, b: &str, ratio: f64) -> bool {
    let sig_a = significant_words(a);
    let sig_b = significant_words(b);
    if sig_a.is_empty() || sig_b.is_empty() {
        return false;
    }
    let shared = sig_a.intersection(&sig_b).count() as f64;
    shared / sig_a.len() as f64 >= ratio && shared / sig_b.len() as f64 >= ratio
}

/// The surviving canonical of a merge group: most confident posts, then
/// longest name, then lexicographically first.
fn pick_winner(group: &[String], entries: &BTreeMap<String, DictionaryEntry>) -> String {
    group
        .iter()
        .max_by(|a, b| {
            let ca = entries[*a].confident_count;
            let cb = entries[*b].confident_count;
            ca.cmp(&cb)
                .then(a.chars().count().cmp(&b.chars().count()))
                .then(b.cmp(a))
        })
        .cloned()
        .unwrap_or_default()
}

/// Fold `loser` into `winner`: sum counts, union aliases and posts, keep
/// the higher confidence, and record the redirect.
fn absorb(
    entries: &mut BTreeMap<String, DictionaryEntry>,
    redirects: &mut BTreeMap<String, String>,
    winner: &str,
    loser: &str,
) {
    let Some(absorbed) = entries.remove(loser) else {
        return;
    };
    let Some(entry) = entries.get_mut(winner) else {
        entries.insert(loser.to_string(), absorbed);
        return;
    };
    debug!(winner, loser, "merged canonical");
    entry.confident_count += absorbed.confident_count;
    entry.incidental_count += absorbed.incidental_count;
    entry.aliases.extend(absorbed.aliases);
    entry.aliases.insert(crate::text::normalize_lower(loser));
    entry.post_uris.extend(absorbed.post_uris);
    entry.confidence = entry.confidence.max(absorbed.confidence);
    redirects.insert(loser.to_string(), winner.to_string());
}
