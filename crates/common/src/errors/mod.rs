//! Error types for ScholarNet services
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for different failure modes
//! - HTTP status code mapping
//! - Structured error responses
//! - Error codes for client handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    ValidationError,
    MissingField,

    // Resource errors
    AuthorNotFound,

    // Rate limiting
    RateLimited,

    // External service errors
    UpstreamError,
    UpstreamTimeout,

    // Internal errors
    ConfigurationError,
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Required field missing: {field}")]
    MissingField { field: String },

    // Resource errors
    #[error("Author not found: {id}")]
    AuthorNotFound { id: String },

    // Rate limiting
    #[error("Rate limit exceeded: {limit} requests per second")]
    RateLimited { limit: u32 },

    // Upstream (bibliographic provider) errors
    #[error("Upstream error: {message}")]
    Upstream { message: String },

    #[error("Upstream returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Upstream timeout after {timeout_ms}ms")]
    UpstreamTimeout { timeout_ms: u64 },

    // Internal errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::MissingField { .. } => ErrorCode::MissingField,
            AppError::AuthorNotFound { .. } => ErrorCode::AuthorNotFound,
            AppError::RateLimited { .. } => ErrorCode::RateLimited,
            AppError::Upstream { .. } => ErrorCode::UpstreamError,
            AppError::UpstreamStatus { .. } => ErrorCode::UpstreamError,
            AppError::UpstreamTimeout { .. } => ErrorCode::UpstreamTimeout,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. } | AppError::MissingField { .. } => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::AuthorNotFound { .. } => StatusCode::NOT_FOUND,

            // 429 Too Many Requests
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::Upstream { .. } | AppError::UpstreamStatus { .. } => StatusCode::BAD_GATEWAY,

            // 504 Gateway Timeout
            AppError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// True when the bibliographic provider failed or answered badly.
    /// A missing record is not an upstream failure.
    pub fn is_upstream_unavailable(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::UpstreamError | ErrorCode::UpstreamTimeout
        )
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let field = match &self {
            AppError::Validation { field, .. } => field.clone(),
            AppError::MissingField { field } => Some(field.clone()),
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message,
                field,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::AuthorNotFound { id: "A1".into() };
        assert_eq!(err.code(), ErrorCode::AuthorNotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(!err.is_upstream_unavailable());
    }

    #[test]
    fn test_validation_error() {
        let err = AppError::Validation {
            message: "depth out of range".into(),
            field: Some("depth".into()),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(!err.is_server_error());
        assert!(err.is_client_error());
    }

    #[test]
    fn test_upstream_errors_are_distinguishable() {
        let status = AppError::UpstreamStatus {
            status: 503,
            body: "maintenance".into(),
        };
        let timeout = AppError::UpstreamTimeout { timeout_ms: 20_000 };

        assert!(status.is_upstream_unavailable());
        assert!(timeout.is_upstream_unavailable());
        assert_eq!(status.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_ne!(status.code(), timeout.code());
    }

    #[test]
    fn test_server_error() {
        let err = AppError::Configuration {
            message: "rate_limit.burst must be positive".into(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), ErrorCode::ConfigurationError);
        assert!(err.is_server_error());
        assert!(!err.is_upstream_unavailable());
    }

    #[test]
    fn test_error_body_shape() {
        let body = ErrorResponse {
            error: ErrorDetails {
                code: ErrorCode::MissingField,
                message: "Required field missing: author_id".into(),
                field: Some("author_id".into()),
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["error"]["code"], "MISSING_FIELD");
        assert_eq!(value["error"]["field"], "author_id");
    }
}
