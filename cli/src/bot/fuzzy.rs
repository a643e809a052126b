//! # Fuzzy Matching
//!
//! File: cli/src/bot/fuzzy.rs
//! Author: Christi Mahu
//!
//! Typo tolerance for keyword lookup. The similarity score only compares
//! characters at the same position, so it forgives substitutions but not
//! insertions, deletions or transpositions.
//!
use super::knowledge::Entry;

/// Score given when one string contains the other.
pub const CONTAINMENT_SCORE: f64 = 90.0;

/// Default minimum score for a fuzzy match.
pub const DEFAULT_THRESHOLD: f64 = 60.0;

/// Percentage (0-100) of positions holding the same character, relative to
/// the longer of the two strings. Case-insensitive.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 0.0;
    }
    let matches = a.iter().zip(&b).filter(|(x, y)| x == y).count();
    matches as f64 / max_len as f64 * 100.0
}

/// Best-scoring entry for a (lowercased) input.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch<'a> {
    pub entry: &'a Entry,
    pub score: f64,
}

/// Picks the entry with the highest score at or above `threshold`.
///
/// Containment in either direction scores [`CONTAINMENT_SCORE`]; anything
/// else falls back to [`similarity`]. Ties keep the earlier entry.
pub fn fuzzy_match<'a>(
    input: &str,
    entries: impl IntoIterator<Item = &'a Entry>,
    threshold: f64,
) -> Option<FuzzyMatch<'a>> {
    let mut best: Option<FuzzyMatch<'a>> = None;
    for entry in entries {
        let keyword = entry.keyword.as_str();
        let score = if input.contains(keyword) || keyword.contains(input) {
            CONTAINMENT_SCORE
        } else {
            similarity(input, keyword)
        };
        let best_score = best.as_ref().map_or(0.0, |m| m.score);
        if score > best_score && score >= threshold {
            best = Some(FuzzyMatch { entry, score });
        }
    }
    best
}
