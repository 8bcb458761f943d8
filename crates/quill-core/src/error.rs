//! Unified error types for all layers of the feed service.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for Quill.
///
/// Cache-layer variants (`CacheBackend`, `CacheDecode`) are absorbed by the
/// cache coordinator and never reach a client. A cache miss is not an error
/// at all: backends report it as `Ok(None)`.
#[derive(Error, Debug)]
pub enum QuillError {
    // ============ Domain Errors ============
    /// Resource not found
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    // ============ Authentication Errors ============
    /// Missing or rejected credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // ============ Infrastructure Errors ============
    /// Primary store error
    #[error("Database error: {0}")]
    Database(String),

    /// Cache transport or connectivity failure
    #[error("Cache backend error: {0}")]
    CacheBackend(String),

    /// Cached payload could not be decoded
    #[error("Cache decode error: {0}")]
    CacheDecode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl QuillError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Database(_)
            | Self::CacheBackend(_)
            | Self::CacheDecode(_)
            | Self::Configuration(_)
            | Self::Internal(_)
            | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::CacheBackend(_) => "CACHE_BACKEND_ERROR",
            Self::CacheDecode(_) => "CACHE_DECODE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an unauthorized error.
    #[must_use]
    pub fn unauthorized<T: Into<String>>(message: T) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Creates a cache backend error.
    #[must_use]
    pub fn cache_backend<T: Into<String>>(message: T) -> Self {
        Self::CacheBackend(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true for errors raised by the cache layer.
    #[must_use]
    pub const fn is_cache_error(&self) -> bool {
        matches!(self, Self::CacheBackend(_) | Self::CacheDecode(_))
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for QuillError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound {
                resource_type: "database_row",
                id: "unknown".to_string(),
            },
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for QuillError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

/// Serializable error body returned by the REST layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Machine-readable error code
    pub code: String,
}

impl ErrorResponse {
    /// Creates a new error response from a `QuillError`.
    #[must_use]
    pub fn from_error(error: &QuillError) -> Self {
        Self {
            error: error.to_string(),
            code: error.error_code().to_string(),
        }
    }
}

impl From<&QuillError> for ErrorResponse {
    fn from(error: &QuillError) -> Self {
        Self::from_error(error)
    }
}
