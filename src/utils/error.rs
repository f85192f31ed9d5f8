//! Error handling module
//!
//! Defines error types and the JSON error envelope returned to callers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication error
    #[error("Unauthorized: {0}")]
    Authentication(String),

    /// Request validation failed
    #[error("{0}")]
    Validation(String),

    /// Request body is not valid JSON
    #[error("{message}")]
    MalformedRequest {
        /// Parser message, always mentions "Invalid JSON"
        message: String,
        /// Byte offset of the parse failure
        position: usize,
        /// Short excerpt of the body around the failure position
        excerpt: String,
    },

    /// Upstream LLM vendor error
    #[error("{provider} API error: {status} - {message}")]
    Vendor {
        /// Vendor name ("openai" or "anthropic")
        provider: &'static str,
        /// HTTP status returned by the vendor
        status: u16,
        /// Vendor error message or raw response body
        message: String,
    },

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// JSON error envelope: `{error, details?, errorPosition?}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error message
    pub error: String,
    /// Diagnostic details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Byte offset of a JSON parse failure (optional)
    #[serde(rename = "errorPosition", skip_serializing_if = "Option::is_none")]
    pub error_position: Option<usize>,
}

impl AppError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) | AppError::MalformedRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Vendor { .. } | AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::Serialization(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether detailed error information should be logged
    pub fn should_log_details(&self) -> bool {
        !matches!(self, AppError::Authentication(_))
    }

    /// Build the JSON envelope for this error
    pub fn to_body(&self) -> ErrorBody {
        match self {
            AppError::Authentication(details) => ErrorBody {
                error: "Unauthorized".to_string(),
                details: Some(details.clone()),
                error_position: None,
            },
            AppError::MalformedRequest {
                message,
                position,
                excerpt,
            } => ErrorBody {
                error: message.clone(),
                details: Some(format!("near: {:?}", excerpt)),
                error_position: Some(*position),
            },
            other => ErrorBody {
                error: other.to_string(),
                details: None,
                error_position: None,
            },
        }
    }
}

/// Implement IntoResponse trait to allow errors to be returned directly as HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.should_log_details() {
            tracing::error!("Request failed: {} - Status code: {}", self, status);
        } else {
            tracing::warn!("Authentication failure - Status code: {}", status);
        }

        (status, Json(self.to_body())).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Error handling helper functions
pub mod helpers {
    use super::*;

    /// Create authentication error
    pub fn auth_error(message: impl Into<String>) -> AppError {
        AppError::Authentication(message.into())
    }

    /// Create validation error
    pub fn validation_error(message: impl Into<String>) -> AppError {
        AppError::Validation(message.into())
    }

    /// Create vendor error
    pub fn vendor_error(
        provider: &'static str,
        status: u16,
        message: impl Into<String>,
    ) -> AppError {
        AppError::Vendor {
            provider,
            status,
            message: message.into(),
        }
    }

    /// Create internal error
    pub fn internal_error(message: impl Into<String>) -> AppError {
        AppError::Internal(message.into())
    }
}
