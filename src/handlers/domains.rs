//! Watchlist handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::engine::watchlist::WatchlistEntry;
use crate::middleware::auth::OperatorContext;
use crate::{AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct AddDomainRequest {
    pub domain: String,
}

#[derive(Debug, Serialize)]
pub struct DomainsResponse {
    pub domains: Vec<WatchlistEntry>,
}

/// GET /api/domains
pub async fn list(State(state): State<AppState>) -> Json<DomainsResponse> {
    Json(DomainsResponse {
        domains: state.engine.watchlist.list(),
    })
}

/// POST /api/domains
pub async fn add(
    State(state): State<AppState>,
    operator: OperatorContext,
    Json(req): Json<AddDomainRequest>,
) -> AppResult<(StatusCode, Json<WatchlistEntry>)> {
    let entry = state.engine.watchlist.add(&req.domain)?;
    tracing::debug!(operator = %operator.username, domain = %entry.domain, "Watchlist add");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// DELETE /api/domains/{domain}
pub async fn remove(
    State(state): State<AppState>,
    operator: OperatorContext,
    Path(domain): Path<String>,
) -> AppResult<StatusCode> {
    state.engine.watchlist.remove(&domain)?;
    tracing::debug!(operator = %operator.username, domain = %domain, "Watchlist remove");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testutil;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_list_wraps_entries_in_domains_envelope() {
        let dir = TempDir::new().unwrap();
        let engine = testutil::engine_in(dir.path());
        engine.watchlist.add("combank-login.net").unwrap();

        let state = AppState {
            engine,
            admin_password_hash: String::new(),
        };

        // The dashboard reads `data.domains`, so the entries must be
        // wrapped, not returned as a bare array.
        let Json(response) = list(State(state)).await;
        let json = serde_json::to_value(&response).unwrap();

        assert!(json.is_object());
        assert!(json["domains"].is_array());
        assert_eq!(json["domains"][0]["domain"], "combank-login.net");
        assert_eq!(json["domains"][0]["similarity"], 0);
    }
}
