use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::profile::gateway::GatewayError;
use crate::validation::ValidationErrorMap;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Per-field failures, keyed the same way the wizard keys its inline errors.
    #[error("Validation failed for {} field(s)", .0.len())]
    InvalidFields(ValidationErrorMap),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] GatewayError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Session store error: {0}")]
    SessionStore(#[from] redis::RedisError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidFields(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_FIELDS",
                "One or more fields are invalid".to_string(),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password".to_string(),
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Persistence(e) => {
                tracing::warn!("Persistence gateway error: {e}");
                let code = match e {
                    GatewayError::SaveFailed(_) => "SAVE_FAILED",
                    GatewayError::UploadFailed(_) => "UPLOAD_FAILED",
                    GatewayError::Unavailable(_) => "GATEWAY_UNAVAILABLE",
                };
                (StatusCode::BAD_GATEWAY, code, e.to_string())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::SessionStore(e) => {
                tracing::error!("Session store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SESSION_STORE_ERROR",
                    "A session storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let AppError::InvalidFields(fields) = &self {
            error["fields"] = json!(fields);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
