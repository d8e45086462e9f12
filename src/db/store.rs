//! Account store contract.
//!
//! The auth service only ever talks to this trait, so tests and alternative
//! backends can supply their own implementation. The SQL implementation is
//! [`AccountRepository`](super::AccountRepository).

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::account::Account;

/// Field guarded by a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    /// Account email.
    Email,
    /// Account phone number.
    Phone,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Email => f.write_str("email"),
            UniqueField::Phone => f.write_str("phone"),
        }
    }
}

/// Store failures.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store rejected an insert because of a uniqueness constraint.
    #[error("{0} is already registered")]
    Duplicate(UniqueField),

    /// Any other backend failure.
    #[error("store error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Operations the auth service needs from the account collection.
///
/// Implementations must be safe to share across concurrent requests. No
/// atomicity is assumed across calls; uniqueness has to be enforced by
/// `insert` itself.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Count accounts with the given email.
    async fn count_by_email(&self, email: &str) -> Result<u64, StoreError>;

    /// Count accounts with the given phone number.
    async fn count_by_phone(&self, phone: &str) -> Result<u64, StoreError>;

    /// Find an account by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Find an account by identifier.
    async fn find_by_id(&self, id: &str) -> Result<Option<Account>, StoreError>;

    /// Insert a new account and return its identifier.
    ///
    /// Returns [`StoreError::Duplicate`] when email or phone is taken.
    async fn insert(&self, account: &Account) -> Result<String, StoreError>;

    /// Set the last-update timestamp. Returns false if no such account exists.
    async fn touch_updated_at(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StoreError>;
}
