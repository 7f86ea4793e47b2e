//! Baseline fingerprint
//!
//! The reference the scorers compare every candidate page against: one
//! fingerprint of the legitimate site, captured live and persisted to disk.
//! Refresh replaces the whole snapshot atomically; scans that are already
//! running keep the `Arc` they cloned at scan start.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::error::AppError;

use super::candidates::PHISHING_KEYWORDS;
use super::fetcher::Fetcher;
use super::page::{self, PageAnalysis};
use super::persist;
use super::scorers::visual;

/// Keyword-set cap; brand token always comes first.
const MAX_KEYWORDS: usize = 12;

/// Minimum length for title tokens admitted into the keyword set.
const MIN_TITLE_TOKEN_LEN: usize = 4;

// ============================================================================
// BASELINE
// ============================================================================

/// Fingerprint of the legitimate site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Baseline {
    /// The protected domain this fingerprint was captured from.
    pub domain: String,
    /// Brand token, also used by the keyword scorer.
    pub brand_token: String,
    /// Normalized visible text of the legitimate page.
    pub text_fingerprint: String,
    /// Tag-name skeleton of the legitimate page.
    pub dom_skeleton: Vec<String>,
    /// Brand token + lexicon keywords present on the page + title tokens.
    pub keyword_set: Vec<String>,
    /// dHash of the legitimate page screenshot, when one was captured.
    pub screenshot_hash: Option<u64>,
    /// SHA-256 of the raw HTML, for change detection in logs.
    pub content_hash: String,
    pub captured_at: DateTime<Utc>,
}

impl Baseline {
    /// Build a fingerprint from a fetched legitimate page.
    pub fn from_page(
        domain: &str,
        brand_token: &str,
        html: &str,
        screenshot_hash: Option<u64>,
    ) -> Self {
        let analysis = page::analyze(html);
        let keyword_set = derive_keywords(brand_token, &analysis);

        Self {
            domain: domain.to_string(),
            // The keyword scorer substring-matches this against lowercased
            // domain names, so the stored token must be lowercase too.
            brand_token: brand_token.trim().to_lowercase(),
            text_fingerprint: analysis.text,
            dom_skeleton: analysis.tags,
            keyword_set,
            screenshot_hash,
            content_hash: format!("{:x}", Sha256::digest(html.as_bytes())),
            captured_at: Utc::now(),
        }
    }
}

/// Brand token first, then lexicon keywords the legitimate page actually
/// uses, then prominent title tokens. Deterministic for a given page.
fn derive_keywords(brand_token: &str, analysis: &PageAnalysis) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    let brand = brand_token.trim().to_lowercase();
    if !brand.is_empty() {
        keywords.push(brand);
    }

    for keyword in PHISHING_KEYWORDS {
        if keywords.len() >= MAX_KEYWORDS {
            return keywords;
        }
        if analysis.text.contains(keyword) && !keywords.iter().any(|k| k == keyword) {
            keywords.push(keyword.to_string());
        }
    }

    for token in analysis.title.split_whitespace() {
        if keywords.len() >= MAX_KEYWORDS {
            break;
        }
        let token: String = token.chars().filter(|c| c.is_alphanumeric()).collect();
        if token.len() >= MIN_TITLE_TOKEN_LEN && !keywords.iter().any(|k| *k == token) {
            keywords.push(token);
        }
    }

    keywords
}

/// Fetch the legitimate site and fingerprint it.
pub async fn capture(config: &Config, fetcher: &Fetcher) -> Result<Baseline, AppError> {
    let page = fetcher
        .fetch(&config.legitimate_domain)
        .await
        .map_err(AppError::FetchError)?;

    let screenshot_hash = page
        .screenshot
        .as_deref()
        .and_then(visual::hash_file);

    let baseline = Baseline::from_page(
        &config.legitimate_domain,
        &config.brand_token,
        &page.html,
        screenshot_hash,
    );

    tracing::info!(
        domain = %baseline.domain,
        content_hash = %baseline.content_hash,
        keywords = baseline.keyword_set.len(),
        has_screenshot = baseline.screenshot_hash.is_some(),
        "Baseline captured"
    );

    Ok(baseline)
}

// ============================================================================
// STORE
// ============================================================================

/// Holds the current baseline snapshot behind a lock and mirrors it to disk.
pub struct BaselineStore {
    current: RwLock<Option<Arc<Baseline>>>,
    path: PathBuf,
}

impl BaselineStore {
    /// Open the store, loading a persisted baseline when one exists.
    /// A baseline file that fails to parse is corruption and aborts startup.
    pub fn open(path: PathBuf) -> Result<Self, AppError> {
        let loaded: Option<Baseline> = persist::load_json(&path)?;
        if let Some(baseline) = &loaded {
            tracing::info!(
                domain = %baseline.domain,
                captured_at = %baseline.captured_at,
                "Loaded persisted baseline"
            );
        }

        Ok(Self {
            current: RwLock::new(loaded.map(Arc::new)),
            path,
        })
    }

    /// Current snapshot. Scans clone this once at scan start so a refresh
    /// mid-scan cannot mix fingerprints.
    pub fn snapshot(&self) -> Option<Arc<Baseline>> {
        self.current.read().clone()
    }

    /// Persist and atomically swap in a new baseline. On a persist failure
    /// the previous snapshot stays live.
    pub fn replace(&self, baseline: Baseline) -> Result<(), AppError> {
        persist::write_json_atomic(&self.path, &baseline)?;
        *self.current.write() = Some(Arc::new(baseline));
        Ok(())
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.current.read().as_ref().map(|b| b.captured_at)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LEGIT_HTML: &str = r#"
        <html>
          <head><title>ComBank Digital Banking</title></head>
          <body>
            <h1>Secure login to your account</h1>
            <form action="/login"><input name="username"></form>
          </body>
        </html>
    "#;

    #[test]
    fn test_from_page_builds_fingerprint() {
        let baseline = Baseline::from_page("combankdigital.com", "combank", LEGIT_HTML, None);

        assert_eq!(baseline.domain, "combankdigital.com");
        assert!(baseline.text_fingerprint.contains("secure login"));
        assert!(baseline.dom_skeleton.contains(&"form".to_string()));
        assert_eq!(baseline.content_hash.len(), 64);
        assert!(baseline.screenshot_hash.is_none());
    }

    #[test]
    fn test_keyword_set_brand_first_then_page_terms() {
        let baseline = Baseline::from_page("combankdigital.com", "combank", LEGIT_HTML, None);

        assert_eq!(baseline.keyword_set[0], "combank");
        // Lexicon words actually present on the page
        assert!(baseline.keyword_set.contains(&"secure".to_string()));
        assert!(baseline.keyword_set.contains(&"login".to_string()));
        assert!(baseline.keyword_set.contains(&"account".to_string()));
        // Title tokens
        assert!(baseline.keyword_set.contains(&"digital".to_string()));
        assert!(baseline.keyword_set.len() <= MAX_KEYWORDS);
    }

    #[test]
    fn test_brand_token_stored_lowercase() {
        let baseline = Baseline::from_page("combankdigital.com", "  ComBank ", LEGIT_HTML, None);
        assert_eq!(baseline.brand_token, "combank");
        assert_eq!(baseline.keyword_set[0], "combank");
        // The brand-in-domain boost depends on the lowercase form matching
        // normalized candidate domains.
        assert!("combank-secure.net".contains(&baseline.brand_token));
    }

    #[test]
    fn test_keyword_set_deterministic() {
        let a = Baseline::from_page("combankdigital.com", "combank", LEGIT_HTML, None);
        let b = Baseline::from_page("combankdigital.com", "combank", LEGIT_HTML, None);
        assert_eq!(a.keyword_set, b.keyword_set);
    }

    #[test]
    fn test_store_starts_empty_without_file() {
        let dir = TempDir::new().unwrap();
        let store = BaselineStore::open(dir.path().join("baseline.json")).unwrap();
        assert!(store.snapshot().is_none());
        assert!(store.last_update().is_none());
    }

    #[test]
    fn test_replace_persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("baseline.json");

        let store = BaselineStore::open(path.clone()).unwrap();
        let baseline = Baseline::from_page("combankdigital.com", "combank", LEGIT_HTML, Some(42));
        store.replace(baseline).unwrap();
        assert!(store.snapshot().is_some());

        // Restart
        let reopened = BaselineStore::open(path).unwrap();
        let snapshot = reopened.snapshot().unwrap();
        assert_eq!(snapshot.domain, "combankdigital.com");
        assert_eq!(snapshot.screenshot_hash, Some(42));
        assert!(reopened.last_update().is_some());
    }

    #[test]
    fn test_corrupt_baseline_file_fails_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("baseline.json");
        std::fs::write(&path, b"{ nope").unwrap();
        assert!(BaselineStore::open(path).is_err());
    }

    #[test]
    fn test_snapshot_isolation_across_replace() {
        let dir = TempDir::new().unwrap();
        let store = BaselineStore::open(dir.path().join("baseline.json")).unwrap();

        store
            .replace(Baseline::from_page("combankdigital.com", "combank", LEGIT_HTML, None))
            .unwrap();
        let held = store.snapshot().unwrap();
        let first_hash = held.content_hash.clone();

        store
            .replace(Baseline::from_page(
                "combankdigital.com",
                "combank",
                "<html><body>changed</body></html>",
                None,
            ))
            .unwrap();

        // The held snapshot still sees the old fingerprint
        assert_eq!(held.content_hash, first_hash);
        assert_ne!(store.snapshot().unwrap().content_hash, first_hash);
    }
}
