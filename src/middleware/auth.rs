//! Authentication middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    http::header::AUTHORIZATION,
};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::handlers::auth::Claims;
use crate::{AppError, AppState};

/// Operator context extracted from JWT
#[derive(Debug, Clone)]
pub struct OperatorContext {
    pub username: String,
}

/// Middleware: Require operator JWT authentication
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&req)?;

    // Decode JWT; an expired token maps to its own error so the dashboard
    // can distinguish "log in again" from "bad token"
    let token_data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(state.engine.config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;

    let operator = OperatorContext {
        username: token_data.claims.sub,
    };

    // Insert into request extensions
    req.extensions_mut().insert(operator);

    Ok(next.run(req).await)
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(req: &Request) -> Result<String, AppError> {
    let auth_header = req.headers()
        .get(AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?
        .to_str()
        .map_err(|_| AppError::Unauthorized)?;

    if !auth_header.starts_with("Bearer ") {
        return Err(AppError::Unauthorized);
    }

    Ok(auth_header[7..].to_string())
}

// Implement FromRequestParts for OperatorContext
#[axum::async_trait]
impl<S> FromRequestParts<S> for OperatorContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions
            .get::<OperatorContext>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_auth(value: &str) -> Request {
        axum::http::Request::builder()
            .header(AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_extract_bearer_token() {
        let req = request_with_auth("Bearer my-token-value");
        assert_eq!(extract_bearer_token(&req).unwrap(), "my-token-value");
    }

    #[test]
    fn test_missing_header_is_unauthorized() {
        let req = axum::http::Request::builder().body(Body::empty()).unwrap();
        assert!(matches!(
            extract_bearer_token(&req),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_non_bearer_scheme_is_unauthorized() {
        let req = request_with_auth("Basic dXNlcjpwYXNz");
        assert!(matches!(
            extract_bearer_token(&req),
            Err(AppError::Unauthorized)
        ));
    }
}
