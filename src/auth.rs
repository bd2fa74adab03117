use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::app::AppState;
use crate::error::AppError;

/// Token accepted when `API_TOKEN` is not set
pub const DEFAULT_API_TOKEN: &str = "test_token_123";

/// Extract the credentials of an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Compare the presented token against the configured one
pub fn verify_token(headers: &HeaderMap, expected: &str) -> Result<(), AppError> {
    match bearer_token(headers) {
        None => Err(AppError::Unauthorized(
            "Authentication token required".to_string(),
        )),
        Some(token) if token != expected => {
            Err(AppError::Unauthorized("Invalid authentication token".to_string()))
        }
        Some(_) => Ok(()),
    }
}

/// Middleware gating routes behind the static API token
pub async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Err(e) = verify_token(request.headers(), &state.api_token) {
        warn!("Rejected request to {}: {}", request.uri().path(), e);
        return Err(e);
    }
    Ok(next.run(request).await)
}
