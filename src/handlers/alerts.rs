//! Alerts handler

use axum::extract::State;
use axum::Json;

use crate::engine::alerts::Alert;
use crate::AppState;

/// GET /api/alerts
pub async fn list(State(state): State<AppState>) -> Json<Vec<Alert>> {
    Json(state.engine.alerts.recent())
}
