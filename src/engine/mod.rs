//! Detection engine
//!
//! Everything below the HTTP layer: candidate generation, page fetching,
//! the baseline fingerprint, the four signal scorers, score fusion, the
//! watchlist and history stores, alerting and the monitoring scheduler.

pub mod alerts;
pub mod baseline;
pub mod candidates;
pub mod fetcher;
pub mod fusion;
pub mod history;
pub mod page;
pub mod persist;
pub mod scan;
pub mod scheduler;
pub mod scorers;
pub mod watchlist;

use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;

use alerts::AlertSink;
use baseline::BaselineStore;
use fetcher::Fetcher;
use history::HistoryLog;
use scheduler::Monitor;
use watchlist::WatchlistStore;

/// Shared engine state: the configuration plus every store and service
/// the HTTP handlers and the scheduler operate on.
pub struct EngineState {
    pub config: Config,
    pub watchlist: WatchlistStore,
    pub baseline: BaselineStore,
    pub fetcher: Fetcher,
    pub history: HistoryLog,
    pub alerts: AlertSink,
    pub monitor: Monitor,
}

impl EngineState {
    /// Create the data directory and open every store. Corrupt store files
    /// abort startup; missing ones start empty.
    pub fn init(config: Config) -> Result<Arc<Self>, AppError> {
        std::fs::create_dir_all(&config.data_dir)?;

        let watchlist = WatchlistStore::open(config.watchlist_path())?;
        let baseline = BaselineStore::open(config.baseline_path())?;
        let fetcher = Fetcher::new(&config)?;
        let history = HistoryLog::open(config.history_path())?;

        Ok(Arc::new(Self {
            config,
            watchlist,
            baseline,
            fetcher,
            history,
            alerts: AlertSink::new(),
            monitor: Monitor::new(),
        }))
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::path::Path;
    use std::sync::Arc;

    use super::EngineState;
    use crate::config::Config;

    /// Deterministic configuration pointed at a scratch directory.
    pub fn test_config(dir: &Path) -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            jwt_secret: "test-secret".to_string(),
            jwt_expiration_hours: 24,
            admin_username: "admin".to_string(),
            admin_password: "phishdish".to_string(),
            legitimate_domain: "combankdigital.com".to_string(),
            brand_token: "combank".to_string(),
            data_dir: dir.to_path_buf(),
            scan_interval_minutes: 60,
            alert_threshold: 75,
            fetch_timeout_secs: 2,
            scan_concurrency: 4,
            max_candidates: 20,
            screenshots_enabled: false,
        }
    }

    pub fn engine_in(dir: &Path) -> Arc<EngineState> {
        EngineState::init(test_config(dir)).unwrap()
    }
}
