//! On-demand scan handler

use axum::extract::{Path, State};
use axum::Json;

use crate::engine::history::ScanTrigger;
use crate::engine::scan::scan_domain;
use crate::engine::watchlist::WatchlistEntry;
use crate::{AppResult, AppState};

/// GET /api/check/{domain}
///
/// Runs the full scan pipeline synchronously and returns the updated
/// entry. The domain must already be on the watchlist.
pub async fn check(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> AppResult<Json<WatchlistEntry>> {
    let entry = scan_domain(&state.engine, &domain, ScanTrigger::Manual).await?;
    Ok(Json(entry))
}
