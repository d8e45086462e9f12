//! Authentication and session lifecycle.
//!
//! [`AuthService`] ties the store, the password hasher and the token issuer
//! together. It keeps no per-session state: everything it knows about a
//! session comes from the token it is handed.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::error::AuthError;
use super::password::{PasswordCheck, PasswordHasher};
use super::token::{AccessClaims, IssuedToken, TokenIssuer, TokenPair};
use super::validation::validate_registration;
use crate::config::Config;
use crate::db::{Account, AccountStore, Role, StoreError};
use crate::error::StorefrontError;

/// Message returned for any failed login, whichever check failed.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Registration input.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    /// Full name (6-100 characters).
    pub full_name: String,
    /// Email address; stored trimmed and lowercased.
    pub email: String,
    /// Phone number; stored trimmed.
    pub phone: String,
    /// Plaintext password (6-100 characters).
    pub password: String,
    /// Account role.
    pub role: Role,
}

/// Login input.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// A signed-in account and the tokens for its new session.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    /// The account, including its password hash. Never serialize this.
    pub account: Account,
    /// Access and refresh tokens for the cookies.
    pub tokens: TokenPair,
}

/// Result of exchanging a refresh token.
#[derive(Debug, Clone)]
pub struct RefreshedAccess {
    /// Account the new token belongs to.
    pub account_id: String,
    /// The new access token.
    pub access: IssuedToken,
}

/// Normalize an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Orchestrates registration, login and token exchange.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn AccountStore>,
    hasher: Arc<PasswordHasher>,
    tokens: Arc<TokenIssuer>,
    store_timeout: Duration,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("tokens", &self.tokens)
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}

impl AuthService {
    /// Create a service from its parts.
    pub fn new(
        store: Arc<dyn AccountStore>,
        hasher: PasswordHasher,
        tokens: TokenIssuer,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            hasher: Arc::new(hasher),
            tokens: Arc::new(tokens),
            store_timeout,
        }
    }

    /// Create a service from configuration.
    pub fn from_config(
        store: Arc<dyn AccountStore>,
        config: &Config,
    ) -> Result<Self, StorefrontError> {
        let hasher = PasswordHasher::new(&config.password)
            .map_err(|e| StorefrontError::Config(e.to_string()))?;
        let tokens = TokenIssuer::new(
            &config.auth.jwt_secret,
            config.auth.access_ttl(),
            config.auth.refresh_ttl(),
        )
        .map_err(|e| StorefrontError::Config(e.to_string()))?;

        Ok(Self::new(store, hasher, tokens, config.auth.store_timeout()))
    }

    /// The token issuer used by this service.
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Register a new account and open a session for it.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthenticatedSession, AuthError> {
        if let Err(errors) = validate_registration(
            &request.full_name,
            &request.email,
            &request.phone,
            &request.password,
        ) {
            debug!(count = errors.len(), "Registration rejected by validation");
            return Err(AuthError::from_validation(&errors));
        }

        let email = normalize_email(&request.email);
        let phone = request.phone.trim().to_string();

        let by_email = self
            .store_call("count_by_email", self.store.count_by_email(&email))
            .await?;
        if by_email > 0 {
            debug!("Registration rejected: email already registered");
            return Err(AuthError::Conflict("Email is already registered".to_string()));
        }

        let by_phone = self
            .store_call("count_by_phone", self.store.count_by_phone(&phone))
            .await?;
        if by_phone > 0 {
            debug!("Registration rejected: phone already registered");
            return Err(AuthError::Conflict("Phone is already registered".to_string()));
        }

        let password_hash = self.hash_password(request.password).await?;

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4().to_string(),
            full_name: request.full_name,
            email,
            phone,
            password: password_hash,
            role: request.role,
            created_at: now,
            updated_at: now,
        };

        let tokens = self.tokens.issue_pair(&account).map_err(|e| {
            error!(error = %e, "Failed to sign tokens for new account");
            AuthError::from(e)
        })?;

        // The store's unique constraints catch registrations that raced
        // past the count checks above.
        self.store_call("insert", self.store.insert(&account)).await?;

        info!(account_id = %account.id, role = %account.role, "Account registered");
        Ok(AuthenticatedSession { account, tokens })
    }

    /// Verify credentials and open a fresh session.
    ///
    /// An unknown email is `NotFound` and a wrong password is `Unauthorized`;
    /// the HTTP layer reports both the same way.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthenticatedSession, AuthError> {
        let email = normalize_email(&request.email);

        let mut account = self
            .store_call("find_by_email", self.store.find_by_email(&email))
            .await?
            .ok_or_else(|| {
                debug!("Login failed: unknown email");
                AuthError::NotFound(INVALID_CREDENTIALS.to_string())
            })?;

        match self
            .verify_password(account.password.clone(), request.password)
            .await?
        {
            PasswordCheck::Match => {}
            PasswordCheck::Mismatch => {
                debug!(account_id = %account.id, "Login failed: wrong password");
                return Err(AuthError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
            PasswordCheck::MalformedHash => {
                error!(account_id = %account.id, "Stored password hash is malformed");
                return Err(AuthError::Internal("malformed password hash".to_string()));
            }
        }

        let now = Utc::now();
        let touched = self
            .store_call("touch_updated_at", self.store.touch_updated_at(&account.id, now))
            .await?;
        if !touched {
            warn!(account_id = %account.id, "Account vanished during login");
            return Err(AuthError::NotFound(INVALID_CREDENTIALS.to_string()));
        }
        account.updated_at = now;

        let tokens = self.tokens.issue_pair(&account).map_err(|e| {
            error!(error = %e, "Failed to sign tokens at login");
            AuthError::from(e)
        })?;

        info!(account_id = %account.id, role = %account.role, "Account logged in");
        Ok(AuthenticatedSession { account, tokens })
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The refresh token itself is not reissued.
    pub async fn refresh_access(&self, refresh_token: Option<&str>) -> Result<RefreshedAccess, AuthError> {
        let token =
            refresh_token.ok_or_else(|| AuthError::NotFound("Refresh token not found".to_string()))?;

        let claims = self.tokens.validate_refresh(token).map_err(|e| {
            warn!(reason = %e, "Rejected refresh token");
            AuthError::from(e)
        })?;

        let account = self
            .store_call("find_by_id", self.store.find_by_id(&claims.sub))
            .await?
            .ok_or_else(|| {
                warn!(account_id = %claims.sub, "Refresh token for missing account");
                AuthError::Unauthorized("Invalid or expired token".to_string())
            })?;

        let access = self.tokens.issue_access_token(&account).map_err(|e| {
            error!(error = %e, "Failed to sign refreshed access token");
            AuthError::from(e)
        })?;

        debug!(account_id = %account.id, "Access token refreshed");
        Ok(RefreshedAccess {
            account_id: account.id,
            access,
        })
    }

    /// Validate an access token without touching the store.
    pub fn validate_session(&self, access_token: Option<&str>) -> Result<AccessClaims, AuthError> {
        let token =
            access_token.ok_or_else(|| AuthError::NotFound("Session not found".to_string()))?;

        self.tokens.validate_access(token).map_err(|e| {
            warn!(reason = %e, "Rejected access token");
            AuthError::from(e)
        })
    }

    /// Validate an access token and load the account it names.
    pub async fn current_account(&self, access_token: Option<&str>) -> Result<Account, AuthError> {
        let claims = self.validate_session(access_token)?;

        self.store_call("find_by_id", self.store.find_by_id(&claims.sub))
            .await?
            .ok_or_else(|| AuthError::NotFound("Account not found".to_string()))
    }

    /// End a session.
    ///
    /// Nothing is revoked server-side, so this only records the event; the
    /// caller clears the cookies. Succeeds with or without a valid token.
    pub fn logout(&self, access_token: Option<&str>) {
        match access_token.map(|t| self.tokens.validate_access(t)) {
            Some(Ok(claims)) => info!(account_id = %claims.sub, "Account logged out"),
            _ => debug!("Logout without a valid session"),
        }
    }

    async fn store_call<T, F>(&self, op: &'static str, call: F) -> Result<T, AuthError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(StoreError::Duplicate(field))) => {
                debug!(%field, "Store rejected duplicate");
                Err(StoreError::Duplicate(field).into())
            }
            Ok(Err(e)) => {
                error!(op, error = %e, "Store call failed");
                Err(e.into())
            }
            Err(_) => {
                error!(op, timeout = ?self.store_timeout, "Store call timed out");
                Err(AuthError::Internal(format!("store call {op} timed out")))
            }
        }
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))?
            .map_err(|e| {
                error!(error = %e, "Password hashing failed");
                AuthError::from(e)
            })
    }

    async fn verify_password(&self, hash: String, password: String) -> Result<PasswordCheck, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.verify(&hash, &password))
            .await
            .map_err(|e| AuthError::Internal(format!("verification task failed: {e}")))
    }
}
