//! Authentication module.
//!
//! This module provides password hashing, session token issuance and
//! validation, and the [`AuthService`] that drives registration, login and
//! token refresh.

mod error;
mod password;
mod service;
mod token;
pub mod validation;

pub use error::AuthError;
pub use password::{
    validate_password, PasswordCheck, PasswordError, PasswordHasher, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
pub use service::{
    normalize_email, AuthService, AuthenticatedSession, LoginRequest, RefreshedAccess,
    RegisterRequest, INVALID_CREDENTIALS,
};
pub use token::{
    AccessClaims, IssuedToken, RefreshClaims, TokenError, TokenIssuer, TokenPair, TokenType,
};
pub use validation::ValidationError;
