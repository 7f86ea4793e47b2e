//! Candidate Generator
//!
//! Synthesizes look-alike domains an attacker is likely to register for the
//! protected brand. Pure and deterministic: the same inputs always produce
//! the same candidates in the same order.

use std::collections::HashSet;

// ============================================================================
// LEXICONS
// ============================================================================

/// Keywords phishers splice next to a brand name.
pub const PHISHING_KEYWORDS: &[&str] = &[
    "secure", "login", "verify", "account", "support", "banking", "auth",
    "update", "confirm", "service", "portal", "access", "client", "user",
    "help", "protect", "safety",
];

/// TLDs ordered by observed abuse frequency; generation uses the first few.
pub const CANDIDATE_TLDS: &[&str] = &[
    ".com", ".net", ".org", ".co", ".io", ".online", ".site", ".info",
];

/// How many TLDs from the front of `CANDIDATE_TLDS` to expand.
const TLDS_PER_KEYWORD: usize = 4;

/// Default cap on the candidate preview.
pub const DEFAULT_MAX_CANDIDATES: usize = 20;

// ============================================================================
// GENERATION
// ============================================================================

/// Generate look-alike candidates for `brand`.
///
/// `past_domains` is a free-text list of previously observed phishing
/// domains, one per line; it gates generation (no history, no candidates)
/// so the preview only appears once the operator has supplied samples.
/// Output is deduplicated, preserves generation order and is capped at
/// `max` entries.
pub fn generate(brand: &str, past_domains: &str, max: usize) -> Vec<String> {
    let brand = brand.trim().to_lowercase();

    let history_lines = past_domains
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .count();

    if brand.is_empty() || history_lines == 0 || max == 0 {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    'generation: for keyword in PHISHING_KEYWORDS {
        for tld in &CANDIDATE_TLDS[..TLDS_PER_KEYWORD.min(CANDIDATE_TLDS.len())] {
            let variations = [
                format!("{}-{}{}", brand, keyword, tld),
                format!("{}{}{}", brand, keyword, tld),
                format!("{}-{}{}", keyword, brand, tld),
            ];

            for candidate in variations {
                if seen.insert(candidate.clone()) {
                    candidates.push(candidate);
                    if candidates.len() >= max {
                        break 'generation;
                    }
                }
            }
        }
    }

    candidates
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const HISTORY: &str = "combank-login.net\nfake-combank.com\n";

    #[test]
    fn test_generation_is_deterministic() {
        let first = generate("combank", HISTORY, DEFAULT_MAX_CANDIDATES);
        let second = generate("combank", HISTORY, DEFAULT_MAX_CANDIDATES);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_respects_cap() {
        let candidates = generate("combank", HISTORY, DEFAULT_MAX_CANDIDATES);
        assert_eq!(candidates.len(), DEFAULT_MAX_CANDIDATES);

        let small = generate("combank", HISTORY, 5);
        assert_eq!(small.len(), 5);
        assert_eq!(&candidates[..5], &small[..]);
    }

    #[test]
    fn test_expected_shapes() {
        let candidates = generate("combank", HISTORY, 3);
        assert_eq!(
            candidates,
            vec![
                "combank-secure.com".to_string(),
                "combanksecure.com".to_string(),
                "secure-combank.com".to_string(),
            ]
        );
    }

    #[test]
    fn test_all_candidates_unique() {
        let candidates = generate("combank", HISTORY, 200);
        let unique: HashSet<_> = candidates.iter().collect();
        assert_eq!(unique.len(), candidates.len());
    }

    #[test]
    fn test_only_leading_tlds_used() {
        let candidates = generate("combank", HISTORY, 500);
        let allowed = &CANDIDATE_TLDS[..TLDS_PER_KEYWORD];
        for candidate in &candidates {
            assert!(
                allowed.iter().any(|tld| candidate.ends_with(tld)),
                "unexpected TLD in {}",
                candidate
            );
        }
    }

    #[test]
    fn test_empty_history_yields_empty_set() {
        assert!(generate("combank", "", DEFAULT_MAX_CANDIDATES).is_empty());
        assert!(generate("combank", "   \n\n  \n", DEFAULT_MAX_CANDIDATES).is_empty());
    }

    #[test]
    fn test_empty_brand_yields_empty_set() {
        assert!(generate("", HISTORY, DEFAULT_MAX_CANDIDATES).is_empty());
        assert!(generate("   ", HISTORY, DEFAULT_MAX_CANDIDATES).is_empty());
    }

    #[test]
    fn test_brand_is_normalized() {
        let upper = generate("  ComBank ", HISTORY, 3);
        let lower = generate("combank", HISTORY, 3);
        assert_eq!(upper, lower);
    }
}
