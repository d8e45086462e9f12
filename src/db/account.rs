//! Account model.
//!
//! One `Account` type serves both shoppers and business accounts; the
//! [`Role`] decides which kind it is.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular storefront customer.
    #[default]
    Shopper,
    /// Merchant account.
    Business,
}

impl Role {
    /// Convert role to its stored and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Shopper => "SHOPPER",
            Role::Business => "BUSINESS",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SHOPPER" => Ok(Role::Shopper),
            "BUSINESS" => Ok(Role::Business),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// Persisted account.
///
/// Deliberately not `Serialize`: the password hash must never reach a
/// response body. Use `AccountProfile` in the web layer instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Opaque identifier, assigned once at registration.
    pub id: String,
    /// Full display name.
    pub full_name: String,
    /// Email address (unique, stored lowercase).
    pub email: String,
    /// Phone number (unique).
    pub phone: String,
    /// Argon2 PHC hash string.
    pub password: String,
    /// Account role.
    pub role: Role,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last successful login or creation.
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for Account {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let role: String = row.try_get("role")?;
        let role = role.parse().map_err(|e: String| sqlx::Error::ColumnDecode {
            index: "role".to_string(),
            source: e.into(),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            full_name: row.try_get("full_name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            password: row.try_get("password")?,
            role,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
