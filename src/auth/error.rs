//! Auth service error taxonomy.
//!
//! Every lower-layer failure is folded into exactly one [`AuthError`] variant
//! before it leaves the service.

use std::collections::HashMap;

use thiserror::Error;

use super::password::PasswordError;
use super::token::TokenError;
use super::validation::{field_details, ValidationError};
use crate::db::StoreError;

/// Errors returned by [`AuthService`](super::AuthService) operations.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Input failed validation; details are keyed by field name.
    #[error("validation failed")]
    Validation(HashMap<String, Vec<String>>),

    /// Email or phone is already registered.
    #[error("{0}")]
    Conflict(String),

    /// The account or the session cookie does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Credentials or token were rejected.
    #[error("{0}")]
    Unauthorized(String),

    /// Anything the caller cannot fix. The message is for logs only.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Build a validation error from collected field errors.
    pub fn from_validation(errors: &[ValidationError]) -> Self {
        AuthError::Validation(field_details(errors))
    }
}

impl From<PasswordError> for AuthError {
    fn from(e: PasswordError) -> Self {
        match e {
            PasswordError::TooShort => {
                AuthError::from_validation(&[ValidationError::PasswordTooShort])
            }
            PasswordError::TooLong => AuthError::from_validation(&[ValidationError::PasswordTooLong]),
            PasswordError::InvalidParams(msg) | PasswordError::HashError(msg) => {
                AuthError::Internal(format!("password hashing: {msg}"))
            }
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Malformed
            | TokenError::BadSignature
            | TokenError::Expired
            | TokenError::WrongType => AuthError::Unauthorized("Invalid or expired token".to_string()),
            TokenError::Signing(msg) | TokenError::InvalidConfig(msg) => {
                AuthError::Internal(format!("token signing: {msg}"))
            }
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(field) => AuthError::Conflict(format!("{field} is already registered")),
            StoreError::Backend(msg) => AuthError::Internal(msg),
        }
    }
}
