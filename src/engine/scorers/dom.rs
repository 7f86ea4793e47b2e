//! DOM structure similarity signal
//!
//! Compares tag-name skeletons (document-order sequences of element names)
//! with a longest-common-subsequence ratio. Cloned pages keep the original
//! markup shape even when the text is reworded, which makes the skeleton a
//! strong signal on its own.

/// Score the candidate skeleton against the baseline skeleton, 0-100.
///
/// `2 * LCS / (len_a + len_b)`, scaled to 0-100. Either skeleton empty
/// scores 0.
pub fn score(baseline_tags: &[String], page_tags: &[String]) -> u8 {
    if baseline_tags.is_empty() || page_tags.is_empty() {
        return 0;
    }

    let lcs = lcs_length(baseline_tags, page_tags);
    let ratio = (2.0 * lcs as f64) / (baseline_tags.len() + page_tags.len()) as f64;
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Classic two-row LCS DP. Skeletons are capped upstream, so the quadratic
/// cost stays bounded.
fn lcs_length(a: &[String], b: &[String]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];

    for item_a in a {
        for (j, item_b) in b.iter().enumerate() {
            current[j + 1] = if item_a == item_b {
                prev[j] + 1
            } else {
                prev[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut prev, &mut current);
    }

    prev[b.len()]
}
