use std::any::Any;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Custom error type for the application
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("Rate limit exceeded: at most {limit} requests per minute")]
    RateLimited { limit: u32, retry_after_secs: u64 },
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::RateLimited { .. } => "RATE_LIMIT_EXCEEDED",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::InternalServerError(msg) = &self {
            error!("Internal server error: {}", msg);
        }

        let status = self.status();
        let retry_after = match &self {
            AppError::RateLimited {
                retry_after_secs, ..
            } => Some(*retry_after_secs),
            _ => None,
        };

        let body = Json(ErrorResponse {
            error: self.error_type().to_string(),
            message: self.to_string(),
            timestamp: Utc::now(),
            retry_after,
        });

        let mut response = (status, body).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Best-effort text of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Turns a handler panic caught by `CatchPanicLayer` into a 500 response
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    AppError::InternalServerError(panic_message(payload.as_ref())).into_response()
}

/// Result type for application handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_is_bad_request() {
        let response = AppError::ValidationError("entity_name cannot be empty".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "entity_name cannot be empty");
        assert!(body.get("retry_after").is_none());
    }

    #[tokio::test]
    async fn test_rate_limited_sets_retry_after() {
        let response = AppError::RateLimited {
            limit: 20,
            retry_after_secs: 42,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");

        let body = body_json(response).await;
        assert_eq!(body["retry_after"], 42);
        assert_eq!(body["error"], "RATE_LIMIT_EXCEEDED");
    }

    #[tokio::test]
    async fn test_unauthorized_challenges_bearer() {
        let response = AppError::Unauthorized("Authentication token required".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[tokio::test]
    async fn test_panic_response_is_internal_error() {
        let response = panic_response(Box::new("index out of bounds"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "INTERNAL_SERVER_ERROR");
        assert_eq!(body["message"], "Internal server error: index out of bounds");
    }

    #[test]
    fn test_panic_message_formats() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42u8), "unknown panic");
    }
}
