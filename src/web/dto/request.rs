//! Request DTOs for Web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::{no_control_chars, not_empty_trimmed};
use crate::auth::{LoginRequest as LoginInput, RegisterRequest};
use crate::db::Role;

/// Signup request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// Full name (6-100 characters).
    #[validate(
        length(min = 6, max = 100, message = "Full name must be 6-100 characters"),
        custom(function = "no_control_chars")
    )]
    pub full_name: String,
    /// Email address.
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    /// Phone number.
    #[validate(custom(function = "not_empty_trimmed"))]
    pub phone: String,
    /// Password (6-100 characters).
    #[validate(length(min = 6, max = 100, message = "Password must be 6-100 characters"))]
    pub password: String,
    /// `SHOPPER` or `BUSINESS`.
    pub role: Role,
}

impl From<SignupRequest> for RegisterRequest {
    fn from(req: SignupRequest) -> Self {
        RegisterRequest {
            full_name: req.full_name,
            email: req.email,
            phone: req.phone,
            password: req.password,
            role: req.role,
        }
    }
}

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl From<LoginRequest> for LoginInput {
    fn from(req: LoginRequest) -> Self {
        LoginInput {
            email: req.email,
            password: req.password,
        }
    }
}
