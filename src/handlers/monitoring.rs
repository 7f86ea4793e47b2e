//! Monitoring control handlers

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::middleware::auth::OperatorContext;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartMonitoringResponse {
    pub monitoring: bool,
    pub interval_minutes: u64,
}

#[derive(Debug, Serialize)]
pub struct StopMonitoringResponse {
    pub monitoring: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringStatus {
    pub monitoring: bool,
    pub interval_minutes: u64,
    pub last_tick: Option<DateTime<Utc>>,
}

/// POST /api/start-monitoring
///
/// Idempotent: starting an already-running monitor changes nothing.
pub async fn start(
    State(state): State<AppState>,
    operator: OperatorContext,
) -> Json<StartMonitoringResponse> {
    let started = state.engine.monitor.start(Arc::clone(&state.engine));
    if started {
        tracing::debug!(operator = %operator.username, "Monitoring start requested");
    }

    Json(StartMonitoringResponse {
        monitoring: true,
        interval_minutes: state.engine.config.scan_interval_minutes,
    })
}

/// POST /api/stop-monitoring
///
/// Idempotent; a sweep already in progress still runs to completion.
pub async fn stop(
    State(state): State<AppState>,
    operator: OperatorContext,
) -> Json<StopMonitoringResponse> {
    let stopped = state.engine.monitor.stop();
    if stopped {
        tracing::debug!(operator = %operator.username, "Monitoring stop requested");
    }

    Json(StopMonitoringResponse { monitoring: false })
}

/// GET /api/monitoring-status
pub async fn status(State(state): State<AppState>) -> Json<MonitoringStatus> {
    Json(MonitoringStatus {
        monitoring: state.engine.monitor.is_running(),
        interval_minutes: state.engine.config.scan_interval_minutes,
        last_tick: state.engine.monitor.last_tick(),
    })
}
