//! Configuration module

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::candidates::DEFAULT_MAX_CANDIDATES;
use crate::engine::fusion::DEFAULT_ALERT_THRESHOLD;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// JWT secret key
    pub jwt_secret: String,

    /// JWT expiration in hours
    pub jwt_expiration_hours: u64,

    /// Dashboard operator account
    pub admin_username: String,
    pub admin_password: String,

    /// The protected (legitimate) domain the baseline is built from
    pub legitimate_domain: String,

    /// Brand token used for candidate generation and keyword scoring
    pub brand_token: String,

    /// Directory holding watchlist, baseline, history and screenshots
    pub data_dir: PathBuf,

    /// Minutes between scheduled watchlist sweeps
    pub scan_interval_minutes: u64,

    /// Overall similarity at or above this emits an alert
    pub alert_threshold: u8,

    /// Per-request fetch timeout in seconds
    pub fetch_timeout_secs: u64,

    /// Concurrent domain scans per sweep
    pub scan_concurrency: usize,

    /// Cap on generated look-alike candidates
    pub max_candidates: usize,

    /// Capture screenshots with headless Chrome when available
    pub screenshots_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),

            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "phishguard-secret-key-change-in-production".to_string()),

            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(24),

            admin_username: env::var("ADMIN_USERNAME")
                .unwrap_or_else(|_| "admin".to_string()),

            admin_password: env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| "phishdish".to_string()),

            legitimate_domain: env::var("LEGITIMATE_DOMAIN")
                .unwrap_or_else(|_| "combankdigital.com".to_string()),

            brand_token: env::var("BRAND_TOKEN")
                .unwrap_or_else(|_| "combank".to_string()),

            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./phishing-data")),

            scan_interval_minutes: env::var("SCAN_INTERVAL_MINUTES")
                .ok()
                .and_then(|m| m.parse().ok())
                .unwrap_or(60),

            alert_threshold: env::var("ALERT_THRESHOLD")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(DEFAULT_ALERT_THRESHOLD),

            fetch_timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),

            scan_concurrency: env::var("SCAN_CONCURRENCY")
                .ok()
                .and_then(|c| c.parse().ok())
                .unwrap_or(4),

            max_candidates: env::var("MAX_CANDIDATES")
                .ok()
                .and_then(|m| m.parse().ok())
                .unwrap_or(DEFAULT_MAX_CANDIDATES),

            screenshots_enabled: env::var("SCREENSHOTS_ENABLED")
                .map(|s| s.to_lowercase() != "false" && s != "0")
                .unwrap_or(true),
        }
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_minutes * 60)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn watchlist_path(&self) -> PathBuf {
        self.data_dir.join("watchlist.json")
    }

    pub fn baseline_path(&self) -> PathBuf {
        self.data_dir.join("baseline.json")
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join("history.jsonl")
    }

    pub fn screenshots_dir(&self) -> PathBuf {
        self.data_dir.join("screenshots")
    }
}
