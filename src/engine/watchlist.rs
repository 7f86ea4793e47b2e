//! Watchlist Store
//!
//! The durable set of monitored domains plus each domain's latest scan
//! result. Mutations are serialized by a store-level lock and every
//! mutation persists the full snapshot before returning, so a restart
//! never loses an add, a remove or a recorded scan.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, FetchFailure};

use super::fusion::ThreatBand;
use super::persist;
use super::scorers::SignalScores;

/// RFC 1035 hostname shape: dot-separated labels of letters, digits and
/// inner hyphens. Normalization lowercases first, so the class is a-z.
static HOSTNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?(\.[a-z0-9]([a-z0-9-]*[a-z0-9])?)+$").unwrap()
});

const MAX_DOMAIN_LEN: usize = 253;

// ============================================================================
// WIRE TYPES
// ============================================================================

/// Per-signal breakdown as the dashboard displays it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanDetails {
    pub visual_similarity: u8,
    pub text_similarity: u8,
    pub dom_similarity: u8,
    pub keyword_similarity: u8,
    /// Failure reason code when the page could not be fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<SignalScores> for ScanDetails {
    fn from(scores: SignalScores) -> Self {
        Self {
            visual_similarity: scores.visual,
            text_similarity: scores.text,
            dom_similarity: scores.dom,
            keyword_similarity: scores.keyword,
            reason: None,
        }
    }
}

/// One monitored domain with its latest scan result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub domain: String,
    pub similarity: u8,
    pub last_checked: Option<DateTime<Utc>>,
    pub details: ScanDetails,
    /// Screenshot filename under the screenshots directory, when captured.
    pub screenshot: Option<String>,
}

impl WatchlistEntry {
    fn new(domain: String) -> Self {
        Self {
            domain,
            similarity: 0,
            last_checked: None,
            details: ScanDetails::default(),
            screenshot: None,
        }
    }
}

/// Result of one completed scan, ready to be recorded.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub similarity: u8,
    pub band: ThreatBand,
    pub details: ScanDetails,
    pub screenshot: Option<String>,
}

impl ScanOutcome {
    /// A fetch failure is a zero-score result with the reason recorded.
    pub fn from_failure(failure: &FetchFailure) -> Self {
        Self {
            similarity: 0,
            band: ThreatBand::Pending,
            details: ScanDetails {
                reason: Some(failure.reason_code()),
                ..ScanDetails::default()
            },
            screenshot: None,
        }
    }
}

// ============================================================================
// NORMALIZATION / VALIDATION
// ============================================================================

/// Normalize operator input to a bare hostname: trim, lowercase, strip
/// scheme, path, port and a leading `www.`.
pub fn normalize_domain(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim().to_lowercase();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError("Domain must not be empty".to_string()));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.clone()
    } else {
        format!("http://{}", trimmed)
    };

    let host = Url::parse(&with_scheme)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .ok_or_else(|| {
            AppError::ValidationError(format!("Not a valid domain: {}", raw.trim()))
        })?;

    Ok(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

/// Validate a normalized hostname.
pub fn validate_domain(domain: &str) -> Result<(), AppError> {
    if domain.len() > MAX_DOMAIN_LEN {
        return Err(AppError::ValidationError("Domain name too long".to_string()));
    }
    if !HOSTNAME_RE.is_match(domain) {
        return Err(AppError::ValidationError(format!("Not a valid domain: {}", domain)));
    }
    Ok(())
}

// ============================================================================
// STORE
// ============================================================================

pub struct WatchlistStore {
    entries: RwLock<Vec<WatchlistEntry>>,
    path: PathBuf,
}

impl WatchlistStore {
    /// Open the store. Missing file starts empty; a file that exists but
    /// does not parse is corruption and aborts startup.
    pub fn open(path: PathBuf) -> Result<Self, AppError> {
        let entries: Vec<WatchlistEntry> = persist::load_json(&path)?.unwrap_or_default();
        if !entries.is_empty() {
            tracing::info!(count = entries.len(), "Loaded persisted watchlist");
        }

        Ok(Self {
            entries: RwLock::new(entries),
            path,
        })
    }

    /// All entries in insertion order.
    pub fn list(&self) -> Vec<WatchlistEntry> {
        self.entries.read().clone()
    }

    /// Just the domain names, insertion order. Used for sweep snapshots.
    pub fn domains(&self) -> Vec<String> {
        self.entries.read().iter().map(|e| e.domain.clone()).collect()
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.entries.read().iter().any(|e| e.domain == domain)
    }

    /// Normalize, validate and add a domain. New entries start unscored
    /// (similarity 0, never checked).
    pub fn add(&self, raw: &str) -> Result<WatchlistEntry, AppError> {
        let domain = normalize_domain(raw)?;
        validate_domain(&domain)?;

        let mut entries = self.entries.write();
        if entries.iter().any(|e| e.domain == domain) {
            return Err(AppError::DuplicateDomain(domain));
        }

        let entry = WatchlistEntry::new(domain);
        entries.push(entry.clone());
        persist::write_json_atomic(&self.path, &*entries)?;

        tracing::info!(domain = %entry.domain, "Domain added to watchlist");
        Ok(entry)
    }

    /// Remove a domain.
    pub fn remove(&self, raw: &str) -> Result<(), AppError> {
        let domain = normalize_domain(raw)?;

        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| e.domain != domain);
        if entries.len() == before {
            return Err(AppError::NotFound(format!("Domain not on watchlist: {}", domain)));
        }
        persist::write_json_atomic(&self.path, &*entries)?;

        tracing::info!(domain = %domain, "Domain removed from watchlist");
        Ok(())
    }

    /// Record a completed scan against its entry. Fails with `NotFound`
    /// when the domain was removed between scan start and completion.
    pub fn record_scan(
        &self,
        domain: &str,
        outcome: &ScanOutcome,
    ) -> Result<WatchlistEntry, AppError> {
        let mut entries = self.entries.write();
        let entry = entries
            .iter_mut()
            .find(|e| e.domain == domain)
            .ok_or_else(|| {
                AppError::NotFound(format!("Domain not on watchlist: {}", domain))
            })?;

        entry.similarity = outcome.similarity;
        entry.last_checked = Some(Utc::now());
        entry.details = outcome.details.clone();
        entry.screenshot = outcome.screenshot.clone();
        let updated = entry.clone();

        persist::write_json_atomic(&self.path, &*entries)?;
        Ok(updated)
    }
}

// ============================================================================
// TESTS
// ============================================================================
