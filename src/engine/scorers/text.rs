//! Text similarity signal
//!
//! Compares the candidate page's visible text against the baseline text
//! fingerprint. Token-frequency overlap (Sorensen-Dice over multisets)
//! carries most of the weight; a normalized edit distance over the leading
//! text window catches near-verbatim copies with shuffled markup.

use std::collections::HashMap;

use strsim::normalized_levenshtein;

/// Blend: token overlap dominates, edit distance refines.
const OVERLAP_WEIGHT: f64 = 0.7;
const EDIT_WEIGHT: f64 = 0.3;

/// Window for the edit-distance pass; keeps the O(n*m) DP bounded.
const EDIT_WINDOW_CHARS: usize = 1000;

/// Score candidate text against the baseline fingerprint, 0-100.
///
/// Inputs are expected pre-normalized (lowercase, collapsed whitespace).
/// Either side empty scores 0.
pub fn score(baseline_text: &str, page_text: &str) -> u8 {
    if baseline_text.is_empty() || page_text.is_empty() {
        return 0;
    }

    let overlap = token_dice(baseline_text, page_text);
    let edit = normalized_levenshtein(
        leading_window(baseline_text),
        leading_window(page_text),
    );

    let blended = OVERLAP_WEIGHT * overlap + EDIT_WEIGHT * edit;
    (blended * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Sorensen-Dice coefficient over token multisets.
fn token_dice(a: &str, b: &str) -> f64 {
    let counts_a = token_counts(a);
    let counts_b = token_counts(b);

    let total_a: usize = counts_a.values().sum();
    let total_b: usize = counts_b.values().sum();
    if total_a == 0 || total_b == 0 {
        return 0.0;
    }

    let common: usize = counts_a
        .iter()
        .filter_map(|(token, count_a)| counts_b.get(token).map(|count_b| count_a.min(count_b)))
        .sum();

    (2.0 * common as f64) / (total_a + total_b) as f64
}

fn token_counts(text: &str) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for token in text.split_whitespace() {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

fn leading_window(text: &str) -> &str {
    match text.char_indices().nth(EDIT_WINDOW_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
