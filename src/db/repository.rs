//! SQLite-backed account repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::account::Account;
use super::store::{AccountStore, StoreError, UniqueField};

const ACCOUNT_COLUMNS: &str =
    "id, full_name, email, phone, password, role, created_at, updated_at";

/// Repository for account operations.
///
/// Holds a clone of the pool, which is itself a shared handle, so the
/// repository can live behind an `Arc<dyn AccountStore>`.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    /// Create a new repository over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn count_where(&self, column: &str, value: &str) -> Result<u64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM accounts WHERE {column} = ?");
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(value)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn find_where(&self, column: &str, value: &str) -> Result<Option<Account>, StoreError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {column} = ?");
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }
}

/// Translate an insert failure, recognising unique-constraint violations.
fn map_insert_error(e: sqlx::Error) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            if message.contains("accounts.email") {
                return StoreError::Duplicate(UniqueField::Email);
            }
            if message.contains("accounts.phone") {
                return StoreError::Duplicate(UniqueField::Phone);
            }
        }
    }
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl AccountStore for AccountRepository {
    async fn count_by_email(&self, email: &str) -> Result<u64, StoreError> {
        self.count_where("email", email).await
    }

    async fn count_by_phone(&self, phone: &str) -> Result<u64, StoreError> {
        self.count_where("phone", phone).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        self.find_where("email", email).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Account>, StoreError> {
        self.find_where("id", id).await
    }

    async fn insert(&self, account: &Account) -> Result<String, StoreError> {
        sqlx::query(
            "INSERT INTO accounts (id, full_name, email, phone, password, role, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&account.id)
        .bind(&account.full_name)
        .bind(&account.email)
        .bind(&account.phone)
        .bind(&account.password)
        .bind(account.role.as_str())
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(account.id.clone())
    }

    async fn touch_updated_at(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE accounts SET updated_at = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
