//! Health check handler

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
}

/// Session probe for the dashboard; any 200 means the token is still good.
/// `degraded` means the engine is up but has no baseline to score against.
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.engine.baseline.snapshot().is_some() {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
