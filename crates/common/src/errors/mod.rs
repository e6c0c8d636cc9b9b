//! Error types for Folio services
//!
//! Provides a single error taxonomy with:
//! - Distinct error types for validation, lookup and upstream failures
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
    // Validation errors (1xxx)
    ValidationError,
    MissingField,
    InvalidFormat,

    // Resource errors (4xxx)
    DocumentNotFound,
    MetaNotFound,

    // Database errors (7xxx)
    DatabaseError,
    ConnectionError,
    MigrationError,
    InvalidSelection,

    // External service errors (8xxx)
    UpstreamError,
    MetaGenerationError,
    MetaGenerationTimeout,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 1001,
            ErrorCode::MissingField => 1002,
            ErrorCode::InvalidFormat => 1003,

            ErrorCode::DocumentNotFound => 4002,
            ErrorCode::MetaNotFound => 4003,

            ErrorCode::DatabaseError => 7001,
            ErrorCode::ConnectionError => 7002,
            ErrorCode::MigrationError => 7003,
            ErrorCode::InvalidSelection => 7004,

            ErrorCode::UpstreamError => 8001,
            ErrorCode::MetaGenerationError => 8002,
            ErrorCode::MetaGenerationTimeout => 8003,

            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Required field missing: {field}")]
    MissingField { field: String },

    #[error("Invalid {field}: {message}")]
    InvalidFormat { field: String, message: String },

    // Resource errors
    #[error("Document with documentUUID {id} was not found")]
    DocumentNotFound { id: String },

    #[error("Metadata for documentUUID {id} was not found")]
    MetaNotFound { id: String },

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid selection: {message}")]
    InvalidSelection { message: String },

    // External service errors
    #[error("Metadata generation failed: {message}")]
    MetaGeneration { message: String },

    #[error("Metadata generation timed out after {timeout_secs}s")]
    MetaGenerationTimeout { timeout_secs: u64 },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Internal errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Shorthand for a malformed identifier or parameter
    pub fn invalid(field: impl Into<String>, message: impl ToString) -> Self {
        AppError::InvalidFormat {
            field: field.into(),
            message: message.to_string(),
        }
    }

    /// Shorthand for an absent required parameter
    pub fn missing(field: impl Into<String>) -> Self {
        AppError::MissingField { field: field.into() }
    }

    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::MissingField { .. } => ErrorCode::MissingField,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::DocumentNotFound { .. } => ErrorCode::DocumentNotFound,
            AppError::MetaNotFound { .. } => ErrorCode::MetaNotFound,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::DatabaseConnection { .. } => ErrorCode::ConnectionError,
            AppError::Migration(_) => ErrorCode::MigrationError,
            AppError::InvalidSelection { .. } => ErrorCode::InvalidSelection,
            AppError::MetaGeneration { .. } => ErrorCode::MetaGenerationError,
            AppError::MetaGenerationTimeout { .. } => ErrorCode::MetaGenerationTimeout,
            AppError::HttpClient(_) => ErrorCode::UpstreamError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. }
            | AppError::MissingField { .. }
            | AppError::InvalidFormat { .. } => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::DocumentNotFound { .. } | AppError::MetaNotFound { .. } => {
                StatusCode::NOT_FOUND
            }

            // 500 Internal Server Error, upstream failures included
            AppError::Database(_)
            | AppError::DatabaseConnection { .. }
            | AppError::Migration(_)
            | AppError::InvalidSelection { .. }
            | AppError::MetaGeneration { .. }
            | AppError::MetaGenerationTimeout { .. }
            | AppError::HttpClient(_)
            | AppError::Internal { .. }
            | AppError::Configuration { .. }
            | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
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
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        if self.is_server_error() {
            metrics::counter!("folio_errors_total", "code" => format!("{:?}", code)).increment(1);
            if matches!(self, AppError::Database(_) | AppError::DatabaseConnection { .. }) {
                crate::metrics::record_db_error();
            }
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let body = ErrorResponse {
            error: ErrorDetails { code, message },
        };

        (status, Json(body)).into_response()
    }
}
