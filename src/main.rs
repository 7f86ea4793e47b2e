//! PhishGuard Engine
//!
//! Backend for the PhishGuard phishing-domain defense dashboard: scores
//! look-alike domains against a fingerprint of the legitimate site and
//! keeps a watchlist under scheduled monitoring.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PHISHGUARD ENGINE                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌────────────┐  ┌────────────────────────┐ │
//! │  │  API      │  │  Scan      │  │  Monitoring            │ │
//! │  │  (Axum)   │  │  Pipeline  │  │  Scheduler             │ │
//! │  │  JWT auth │  │  4 signals │  │  (Background Sweeps)   │ │
//! │  └─────┬─────┘  └─────┬──────┘  └────────────┬───────────┘ │
//! │        └──────────────┼──────────────────────┘              │
//! │                       ▼                                     │
//! │            ┌─────────────────────┐                         │
//! │            │  DATA_DIR (JSON +   │                         │
//! │            │  JSONL + PNG)       │                         │
//! │            └─────────────────────┘                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod engine;
mod error;
mod handlers;
mod middleware;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, delete},
    middleware as axum_middleware,
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
    services::ServeDir,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

use engine::EngineState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "phishguard_engine=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("PhishGuard engine starting...");
    tracing::info!(
        legitimate_domain = %config.legitimate_domain,
        data_dir = %config.data_dir.display(),
        "Configuration loaded"
    );

    let host = config.host.clone();
    let port = config.port;

    // Build engine state (stores, fetcher, scheduler)
    let engine = EngineState::init(config)?;

    // Capture a baseline unless one was persisted. A capture failure
    // leaves the engine degraded (scans report baseline unavailable)
    // rather than aborting: the refresh endpoint must stay reachable.
    if engine.baseline.snapshot().is_none() {
        tracing::info!(
            domain = %engine.config.legitimate_domain,
            "No persisted baseline, capturing"
        );
        match engine::baseline::capture(&engine.config, &engine.fetcher).await {
            Ok(baseline) => engine.baseline.replace(baseline)?,
            Err(err) => {
                tracing::error!(
                    "Baseline capture failed: {}. Scans will fail until POST /api/baseline/refresh succeeds.",
                    err
                );
            }
        }
    }

    // Build application state
    let state = AppState {
        admin_password_hash: handlers::auth::hash_password(&engine.config.admin_password)?,
        engine,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", host, port);
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<EngineState>,
    pub admin_password_hash: String,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        // Screenshots are embedded by the dashboard as plain <img> tags,
        // which cannot carry an Authorization header
        .nest_service(
            "/screenshots",
            ServeDir::new(state.engine.config.screenshots_dir()),
        );

    // Dashboard routes (operator JWT auth)
    let dashboard_routes = Router::new()
        .route("/api/health", get(handlers::health::check))
        .route("/api/config", get(handlers::config::get_config))
        .route("/api/baseline/refresh", post(handlers::config::refresh_baseline))

        // Watchlist
        .route("/api/domains", get(handlers::domains::list))
        .route("/api/domains", post(handlers::domains::add))
        .route("/api/domains/:domain", delete(handlers::domains::remove))

        // Scanning
        .route("/api/check/:domain", get(handlers::scan::check))
        .route("/api/predict", post(handlers::predict::predict))

        // Monitoring
        .route("/api/start-monitoring", post(handlers::monitoring::start))
        .route("/api/stop-monitoring", post(handlers::monitoring::stop))
        .route("/api/monitoring-status", get(handlers::monitoring::status))

        // History & alerts
        .route("/api/historical", get(handlers::history::list))
        .route("/api/alerts", get(handlers::alerts::list))

        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth
        ));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .merge(dashboard_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
