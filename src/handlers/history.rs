//! Scan history handler

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::engine::history::ScanEvent;
use crate::{AppResult, AppState};

const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

/// GET /api/historical?limit=N
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<Vec<ScanEvent>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let events = state.engine.history.recent(limit)?;
    Ok(Json(events))
}
