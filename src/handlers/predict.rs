//! Candidate prediction handler

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::engine::candidates;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    /// Newline-separated domains previously seen targeting the brand.
    /// Candidate generation only fires when at least one is given.
    #[serde(default)]
    pub past_domains: String,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub domains: Vec<String>,
}

/// POST /api/predict
pub async fn predict(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> Json<PredictResponse> {
    let domains = candidates::generate(
        &state.engine.config.brand_token,
        &req.past_domains,
        state.engine.config.max_candidates,
    );
    Json(PredictResponse { domains })
}
