//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Classified page-fetch failures.
///
/// A failed fetch is a scoring signal (the page scores 0), not an HTTP-level
/// error, so these carry a stable `reason_code` that ends up in scan details.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("request timed out")]
    Timeout,

    #[error("TLS negotiation failed")]
    Tls,

    #[error("host unreachable")]
    Unreachable,

    #[error("HTTP status {0}")]
    HttpStatus(u16),
}

impl FetchFailure {
    /// Stable machine-readable code recorded in scan details.
    pub fn reason_code(&self) -> String {
        match self {
            FetchFailure::Timeout => "timeout".to_string(),
            FetchFailure::Tls => "tls_error".to_string(),
            FetchFailure::Unreachable => "unreachable".to_string(),
            FetchFailure::HttpStatus(status) => format!("http_{}", status),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    // Auth errors
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("token has expired")]
    TokenExpired,
    #[error("invalid token")]
    TokenInvalid,
    #[error("authentication required")]
    Unauthorized,

    // Watchlist errors
    #[error("validation failed: {0}")]
    ValidationError(String),
    #[error("domain already on watchlist: {0}")]
    DuplicateDomain(String),
    #[error("not found: {0}")]
    NotFound(String),

    // Scan errors
    #[error("no baseline available")]
    BaselineUnavailable,
    #[error("fetch failed: {0}")]
    FetchError(FetchFailure),

    // Persistence errors
    #[error("storage error: {0}")]
    StorageError(String),

    // Generic errors
    #[error("internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid username or password".to_string())
            }
            AppError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token has expired".to_string()),
            AppError::TokenInvalid => (StatusCode::UNAUTHORIZED, "Invalid token".to_string()),
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Authentication required".to_string())
            }
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::DuplicateDomain(domain) => (
                StatusCode::CONFLICT,
                format!("Domain already on watchlist: {}", domain),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BaselineUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Baseline unavailable - refresh the baseline first".to_string(),
            ),
            AppError::FetchError(failure) => {
                (StatusCode::BAD_GATEWAY, format!("Fetch failed: {}", failure))
            }
            AppError::StorageError(msg) => {
                tracing::error!("Storage error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error occurred".to_string())
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::StorageError(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::TokenInvalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failure_reason_codes() {
        assert_eq!(FetchFailure::Timeout.reason_code(), "timeout");
        assert_eq!(FetchFailure::Tls.reason_code(), "tls_error");
        assert_eq!(FetchFailure::Unreachable.reason_code(), "unreachable");
        assert_eq!(FetchFailure::HttpStatus(503).reason_code(), "http_503");
    }

    #[test]
    fn test_expired_token_maps_to_expired_variant() {
        let err = jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::ExpiredSignature,
        );
        assert!(matches!(AppError::from(err), AppError::TokenExpired));
    }
}
