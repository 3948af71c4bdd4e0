//! Error handling for the logistics backend
//!
//! Client errors render as `{"error": "..."}`; server errors as
//! `{"error": "Internal Server Error", "message": "..."}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Invalid or expired token")]
    InvalidResetToken,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Insufficient inventory: {0}")]
    InsufficientInventory(String),

    // External service errors
    #[error("Mail service error: {0}")]
    MailError(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<shared::ValidationError> for AppError {
    fn from(err: shared::ValidationError) -> Self {
        AppError::Validation(err.0)
    }
}

impl AppError {
    /// Map a unique-violation to `Conflict(message)`, anything else stays a database error
    pub fn on_unique_violation(err: sqlx::Error, message: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(message.to_string())
            }
            _ => AppError::DatabaseError(err),
        }
    }

    /// Map a CHECK violation (a quantity going below zero) to `InsufficientInventory`
    pub fn on_check_violation(err: sqlx::Error, message: impl FnOnce() -> String) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_check_violation() => {
                AppError::InsufficientInventory(message())
            }
            _ => AppError::DatabaseError(err),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidResetToken
            | AppError::Validation(_)
            | AppError::Conflict(_)
            | AppError::InsufficientInventory(_) => StatusCode::BAD_REQUEST,
            AppError::MailError(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn client(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            error: "Internal Server Error".to_string(),
            message: Some(detail.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::InvalidCredentials => ErrorResponse::client("Invalid credentials"),
            AppError::Unauthorized(msg) => ErrorResponse::client(msg.clone()),
            AppError::Forbidden => {
                ErrorResponse::client("You do not have permission to perform this action")
            }
            AppError::InvalidResetToken => ErrorResponse::client("Invalid or expired token"),
            AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::InsufficientInventory(msg) => ErrorResponse::client(msg.clone()),
            AppError::NotFound(resource) => {
                ErrorResponse::client(format!("{} not found", resource))
            }
            AppError::MailError(msg) => ErrorResponse::client(format!("Mail service error: {}", msg)),
            AppError::DatabaseError(e) => ErrorResponse::internal(e.to_string()),
            AppError::Internal(msg) => ErrorResponse::internal(msg.clone()),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Error: {:?}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "Request rejected: {}", self);
        }

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_uses_canonical_message() {
        let response = AppError::NotFound("Order".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn client_errors_map_to_expected_statuses() {
        assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Conflict("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_body_carries_detail() {
        let body = serde_json::to_value(ErrorResponse::internal("connection reset")).unwrap();
        assert_eq!(body["error"], "Internal Server Error");
        assert_eq!(body["message"], "connection reset");

        let body = serde_json::to_value(ErrorResponse::client("Stock not found")).unwrap();
        assert_eq!(body, serde_json::json!({"error": "Stock not found"}));
    }
}
