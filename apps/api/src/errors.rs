use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::recipe_client::{ErrorClass, RecipeApiError};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Recipe provider error: {0}")]
    Provider(#[from] RecipeApiError),
}

/// Malformed bodies and query strings get the same 400 envelope as any other
/// validation failure instead of axum's plain-text rejection.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Provider(e) => {
                match e.class() {
                    ErrorClass::Upstream => tracing::warn!("Recipe provider failure: {e}"),
                    ErrorClass::Config => tracing::error!("Recipe provider misconfigured: {e}"),
                    ErrorClass::BadInput => {}
                }
                provider_error_parts(e)
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

fn provider_error_parts(e: &RecipeApiError) -> (StatusCode, &'static str, String) {
    match e {
        RecipeApiError::InvalidQuery(msg) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
        }
        RecipeApiError::Config(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "CONFIG_ERROR",
            "The recipe provider is not configured".to_string(),
        ),
        RecipeApiError::RateLimitExceeded { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            "UPSTREAM_RATE_LIMITED",
            "The recipe provider is rate limiting requests, try again later".to_string(),
        ),
        RecipeApiError::Network { .. } => (
            StatusCode::BAD_GATEWAY,
            "UPSTREAM_UNAVAILABLE",
            "The recipe provider could not be reached".to_string(),
        ),
        RecipeApiError::Provider { message, .. } => {
            (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", message.clone())
        }
        RecipeApiError::Decode(_) => (
            StatusCode::BAD_GATEWAY,
            "UPSTREAM_ERROR",
            "The recipe provider returned an unexpected response".to_string(),
        ),
    }
}
