//! Keyword similarity signal
//!
//! Measures how much of the baseline keyword set (brand token plus the
//! prominent terms captured from the legitimate site) shows up in the
//! candidate page, and whether the brand token is embedded in the candidate
//! domain name itself.

/// Contribution of keyword-set coverage.
const COVERAGE_MAX: f64 = 80.0;

/// Flat boost when the brand token appears inside the candidate domain.
const BRAND_IN_DOMAIN_BOOST: f64 = 20.0;

/// Score keyword presence, 0-100. Empty keyword set scores 0.
///
/// `page_text` and `attr_text` are expected pre-normalized; attribute
/// values are included because phishing kits often keep the original
/// form actions, class names and alt texts.
pub fn score(
    keyword_set: &[String],
    brand_token: &str,
    domain: &str,
    page_text: &str,
    attr_text: &str,
) -> u8 {
    if keyword_set.is_empty() {
        return 0;
    }

    let hits = keyword_set
        .iter()
        .filter(|keyword| page_text.contains(keyword.as_str()) || attr_text.contains(keyword.as_str()))
        .count();

    let coverage = hits as f64 / keyword_set.len() as f64;
    let mut result = COVERAGE_MAX * coverage;

    if !brand_token.is_empty() && domain.contains(brand_token) {
        result += BRAND_IN_DOMAIN_BOOST;
    }

    result.round().clamp(0.0, 100.0) as u8
}
