//! Input validation for account registration.
//!
//! The web layer validates request bodies with `validator` before they reach
//! the service, but the service re-checks everything here so other callers
//! get the same guarantees.

use std::collections::HashMap;

use thiserror::Error;

use super::password::{validate_password, PasswordError, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

/// Minimum full name length in characters.
pub const MIN_FULL_NAME_LENGTH: usize = 6;

/// Maximum full name length in characters.
pub const MAX_FULL_NAME_LENGTH: usize = 100;

/// Maximum email length.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Field-level validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Full name is too short.
    #[error("full name must be at least {MIN_FULL_NAME_LENGTH} characters")]
    FullNameTooShort,

    /// Full name is too long.
    #[error("full name must be at most {MAX_FULL_NAME_LENGTH} characters")]
    FullNameTooLong,

    /// Full name contains control characters.
    #[error("full name contains invalid characters")]
    FullNameInvalidChars,

    /// Email is missing.
    #[error("email is required")]
    EmailEmpty,

    /// Email is too long.
    #[error("email must be at most {MAX_EMAIL_LENGTH} characters")]
    EmailTooLong,

    /// Email format is invalid.
    #[error("invalid email format")]
    EmailInvalidFormat,

    /// Phone is empty after trimming.
    #[error("phone is required")]
    PhoneEmpty,

    /// Password is too short.
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,

    /// Password is too long.
    #[error("password must be at most {MAX_PASSWORD_LENGTH} characters")]
    PasswordTooLong,
}

impl ValidationError {
    /// Wire name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::FullNameTooShort
            | ValidationError::FullNameTooLong
            | ValidationError::FullNameInvalidChars => "fullName",
            ValidationError::EmailEmpty
            | ValidationError::EmailTooLong
            | ValidationError::EmailInvalidFormat => "email",
            ValidationError::PhoneEmpty => "phone",
            ValidationError::PasswordTooShort | ValidationError::PasswordTooLong => "password",
        }
    }
}

/// Validate a full name (6-100 characters, no control characters).
pub fn validate_full_name(full_name: &str) -> Result<(), ValidationError> {
    let len = full_name.chars().count();
    if len < MIN_FULL_NAME_LENGTH {
        return Err(ValidationError::FullNameTooShort);
    }
    if len > MAX_FULL_NAME_LENGTH {
        return Err(ValidationError::FullNameTooLong);
    }
    if full_name.chars().any(|c| c.is_control()) {
        return Err(ValidationError::FullNameInvalidChars);
    }
    Ok(())
}

/// Validate an email address.
///
/// This is a shape check only: one `@`, a non-empty local part, and a dotted
/// domain without empty labels or whitespace.
///
/// # Examples
///
/// ```
/// use storefront_auth::auth::validation::validate_email;
///
/// assert!(validate_email("user@example.com").is_ok());
/// assert!(validate_email("").is_err());
/// assert!(validate_email("invalid").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmailEmpty);
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::EmailTooLong);
    }
    if email.chars().any(|c| c.is_whitespace()) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return Err(ValidationError::EmailInvalidFormat),
    };
    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(ValidationError::EmailInvalidFormat);
    }
    if domain.split('.').any(|label| label.is_empty()) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    Ok(())
}

/// Validate a phone number: anything non-empty once trimmed.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.trim().is_empty() {
        return Err(ValidationError::PhoneEmpty);
    }
    Ok(())
}

/// Validate every registration field and collect all failures.
///
/// The email is checked after trimming, since it is normalized before it is
/// stored.
pub fn validate_registration(
    full_name: &str,
    email: &str,
    phone: &str,
    password: &str,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = validate_full_name(full_name) {
        errors.push(e);
    }
    if let Err(e) = validate_email(email.trim()) {
        errors.push(e);
    }
    if let Err(e) = validate_phone(phone) {
        errors.push(e);
    }
    match validate_password(password) {
        Ok(()) => {}
        Err(PasswordError::TooLong) => errors.push(ValidationError::PasswordTooLong),
        Err(_) => errors.push(ValidationError::PasswordTooShort),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Group validation errors by field, in the shape the API error body uses.
pub fn field_details(errors: &[ValidationError]) -> HashMap<String, Vec<String>> {
    let mut details: HashMap<String, Vec<String>> = HashMap::new();
    for error in errors {
        details
            .entry(error.field().to_string())
            .or_default()
            .push(error.to_string());
    }
    details
}
