//! Configuration and baseline handlers

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::baseline;
use crate::middleware::auth::OperatorContext;
use crate::{AppResult, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub legitimate_domain: String,
    /// Null until a baseline has been captured.
    pub baseline_last_update: Option<DateTime<Utc>>,
}

fn config_response(state: &AppState) -> ConfigResponse {
    ConfigResponse {
        legitimate_domain: state.engine.config.legitimate_domain.clone(),
        baseline_last_update: state.engine.baseline.last_update(),
    }
}

/// GET /api/config
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(config_response(&state))
}

/// POST /api/baseline/refresh
///
/// Full re-capture of the legitimate page. On any failure the previous
/// baseline stays live and an error is returned.
pub async fn refresh_baseline(
    State(state): State<AppState>,
    operator: OperatorContext,
) -> AppResult<Json<ConfigResponse>> {
    tracing::info!(operator = %operator.username, "Baseline refresh requested");

    let baseline = baseline::capture(&state.engine.config, &state.engine.fetcher).await?;
    state.engine.baseline.replace(baseline)?;

    Ok(Json(config_response(&state)))
}
