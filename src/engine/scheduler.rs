//! Monitoring scheduler
//!
//! A single background loop that sweeps the watchlist at the configured
//! interval. Start and stop are idempotent; stop is observed between
//! ticks, so an in-flight sweep always finishes and records its results.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::sync::{watch, Semaphore};
use tokio::task::{JoinHandle, JoinSet};

use super::history::ScanTrigger;
use super::{fusion, scan, EngineState};

#[derive(Default)]
struct MonitorInner {
    task: Option<JoinHandle<()>>,
    stop_tx: Option<watch::Sender<bool>>,
}

/// Handle to the background sweep loop.
pub struct Monitor {
    inner: Mutex<MonitorInner>,
    last_tick: RwLock<Option<DateTime<Utc>>>,
}

impl Monitor {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MonitorInner::default()),
            last_tick: RwLock::new(None),
        }
    }

    /// Start the loop. Returns false when it is already running. The first
    /// sweep begins immediately, not one interval from now.
    pub fn start(&self, state: Arc<EngineState>) -> bool {
        let mut inner = self.inner.lock();
        if Self::running(&inner) {
            return false;
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let interval_minutes = state.config.scan_interval_minutes;

        // A stopped loop may still be finishing its final sweep; the new
        // loop joins it first so two sweeps never run at once.
        let predecessor = inner.task.take();
        inner.task = Some(tokio::spawn(run_loop(state, stop_rx, predecessor)));
        inner.stop_tx = Some(stop_tx);

        tracing::info!(interval_minutes, "Monitoring started");
        true
    }

    /// Signal the loop to stop. Returns false when it was not running.
    /// Does not interrupt a sweep already in progress; the task handle is
    /// kept so a restart can join it.
    pub fn stop(&self) -> bool {
        let mut inner = self.inner.lock();
        let was_running = Self::running(&inner);

        if let Some(stop_tx) = inner.stop_tx.take() {
            let _ = stop_tx.send(true);
        }

        if was_running {
            tracing::info!("Monitoring stopped");
        }
        was_running
    }

    pub fn is_running(&self) -> bool {
        Self::running(&self.inner.lock())
    }

    /// Running means stop has not been signalled and the task is alive.
    fn running(inner: &MonitorInner) -> bool {
        inner.stop_tx.is_some()
            && inner.task.as_ref().map_or(false, |task| !task.is_finished())
    }

    /// When the last sweep completed, if any has.
    pub fn last_tick(&self) -> Option<DateTime<Utc>> {
        *self.last_tick.read()
    }

    fn set_last_tick(&self, at: DateTime<Utc>) {
        *self.last_tick.write() = Some(at);
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Sweep, then wait out the interval or a stop signal, whichever first.
async fn run_loop(
    state: Arc<EngineState>,
    mut stop_rx: watch::Receiver<bool>,
    predecessor: Option<JoinHandle<()>>,
) {
    if let Some(previous) = predecessor {
        if let Err(err) = previous.await {
            if err.is_panic() {
                tracing::error!("Previous monitoring loop panicked: {}", err);
            }
        }
    }

    let interval = state.config.scan_interval();
    loop {
        run_tick(&state).await;

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    tracing::debug!("Monitoring loop exiting");
                    break;
                }
            }
        }
    }
}

/// One sweep over the current watchlist, bounded by the configured
/// concurrency. Per-domain failures are logged and counted, never fatal
/// to the sweep.
async fn run_tick(state: &Arc<EngineState>) {
    let domains = state.watchlist.domains();
    if domains.is_empty() {
        tracing::debug!("Sweep skipped: watchlist is empty");
        state.monitor.set_last_tick(Utc::now());
        return;
    }

    let started = Instant::now();
    let total = domains.len();
    let semaphore = Arc::new(Semaphore::new(state.config.scan_concurrency.max(1)));
    let mut tasks: JoinSet<Option<u8>> = JoinSet::new();

    for domain in domains {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        let state = Arc::clone(state);
        tasks.spawn(async move {
            let result = scan::scan_domain(&state, &domain, ScanTrigger::Scheduled).await;
            drop(permit);
            match result {
                Ok(entry) => Some(entry.similarity),
                Err(err) => {
                    tracing::warn!(domain = %domain, "Scheduled scan failed: {}", err);
                    None
                }
            }
        });
    }

    let mut scanned = 0usize;
    let mut failed = 0usize;
    let mut alerts = 0usize;
    let mut highest = 0u8;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Some(similarity)) => {
                scanned += 1;
                highest = highest.max(similarity);
                if fusion::should_alert(similarity, state.config.alert_threshold) {
                    alerts += 1;
                }
            }
            Ok(None) => failed += 1,
            Err(err) => {
                failed += 1;
                tracing::error!("Scan task failed to join: {}", err);
            }
        }
    }

    state.monitor.set_last_tick(Utc::now());
    tracing::info!(
        total,
        scanned,
        failed,
        alerts,
        highest,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Watchlist sweep complete"
    );
}
