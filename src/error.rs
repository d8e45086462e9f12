//! Error types for the storefront auth service.

use thiserror::Error;

/// Common error type for bootstrap and infrastructure failures.
///
/// Request-level failures use [`crate::auth::AuthError`] instead; this type
/// covers everything that happens before or around request handling.
#[derive(Error, Debug)]
pub enum StorefrontError {
    /// Database error.
    ///
    /// Database errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for configuration or input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for StorefrontError {
    fn from(e: sqlx::Error) -> Self {
        StorefrontError::Database(e.to_string())
    }
}

/// Result type alias for storefront operations.
pub type Result<T> = std::result::Result<T, StorefrontError>;
