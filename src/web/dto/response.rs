//! Response DTOs for Web API.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{Account, Role};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Signup response.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    /// Identifier of the new account.
    pub id: String,
}

/// Refresh response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// Expiry of the new access token.
    pub expires_at: DateTime<Utc>,
}

/// Logout response.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    /// Confirmation message.
    pub message: &'static str,
}

/// Public account profile. Carries everything but the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    /// Account ID.
    pub id: String,
    /// Full name.
    pub full_name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// Role.
    pub role: Role,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for AccountProfile {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            full_name: account.full_name.clone(),
            email: account.email.clone(),
            phone: account.phone.clone(),
            role: account.role,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}
