//! Error types and handling
//!
//! All errors are converted to a consistent JSON response format. Authorization
//! and ownership failures surface as generic 403/404 messages so callers cannot
//! probe which check rejected them.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unauthorized - authentication required (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden - insufficient permissions (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Conflict - resource already exists or state conflict (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unprocessable entity - validation failed (422)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Too many requests - throttled action (429)
    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Payment gateway communication error (502)
    #[error("Payment gateway error: {0}")]
    PaymentGateway(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Service unavailable (503)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn too_many_requests(msg: impl Into<String>) -> Self {
        Self::TooManyRequests(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn payment_gateway(msg: impl Into<String>) -> Self {
        Self::PaymentGateway(msg.into())
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::ServiceUnavailable(msg.into())
    }
}

/// Error response body
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Error code for programmatic handling (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            code: None,
        }
    }

    /// Add details to the error response
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, should_log) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", false),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", false),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized", false),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden", true),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict", false),
            AppError::ValidationError(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", false)
            }
            AppError::TooManyRequests(_) => {
                (StatusCode::TOO_MANY_REQUESTS, "too_many_requests", false)
            }
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", true),
            AppError::PaymentGateway(_) => (StatusCode::BAD_GATEWAY, "payment_gateway_error", true),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error", true),
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error", true),
            AppError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", true)
            }
        };

        // Log server errors
        if should_log {
            error!(error = %self, error_type = error_type, "Request error");
        }

        let body = ErrorResponse::new(error_type, self.to_string());

        (status, Json(body)).into_response()
    }
}

// Implement From for common error types

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Check for unique constraint violations
                if db_err.message().contains("UNIQUE constraint failed") {
                    AppError::Conflict("Resource already exists".to_string())
                } else {
                    AppError::Database(db_err.to_string())
                }
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::PaymentGateway("Upstream request timed out".to_string())
        } else if err.is_connect() {
            AppError::PaymentGateway("Failed to connect to upstream service".to_string())
        } else {
            AppError::PaymentGateway(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(format!("JSON parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
