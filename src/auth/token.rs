//! Session token issuance and validation.
//!
//! Tokens are HS256 JWTs signed with one shared secret. Nothing is stored
//! server-side: a token is valid exactly when its signature checks out, its
//! `typ` matches and it has not expired.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::db::{Account, Role};

/// Token failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token could not be parsed.
    #[error("malformed token")]
    Malformed,

    /// The signature does not match the configured secret.
    #[error("invalid token signature")]
    BadSignature,

    /// The token is well formed and signed but past its expiry.
    #[error("token has expired")]
    Expired,

    /// An access token was presented where a refresh token was expected, or vice versa.
    #[error("unexpected token type")]
    WrongType,

    /// Signing a new token failed.
    #[error("token signing failed: {0}")]
    Signing(String),

    /// The issuer was constructed with unusable settings.
    #[error("invalid token configuration: {0}")]
    InvalidConfig(String),
}

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived token carrying the account profile.
    Access,
    /// Long-lived token that can only mint new access tokens.
    Refresh,
}

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessClaims {
    /// Subject (account ID).
    pub sub: String,
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// Account role.
    pub role: Role,
    /// Issuer; always the subject.
    pub iss: String,
    /// Issued at (seconds since epoch).
    pub iat: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
    /// Unique token ID.
    pub jti: String,
    /// Token type.
    pub typ: TokenType,
}

/// Claims carried by a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshClaims {
    /// Subject (account ID).
    pub sub: String,
    /// Issuer; always the subject.
    pub iss: String,
    /// Issued at (seconds since epoch).
    pub iat: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
    /// Unique token ID.
    pub jti: String,
    /// Token type.
    pub typ: TokenType,
}

/// A freshly signed token and its validity window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Encoded JWT.
    pub token: String,
    /// Issuance instant.
    pub issued_at: DateTime<Utc>,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Lifetime in whole seconds, used as the cookie max-age.
    pub fn max_age_secs(&self) -> i64 {
        (self.expires_at - self.issued_at).num_seconds()
    }
}

/// An access token and refresh token minted together.
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Access token.
    pub access: IssuedToken,
    /// Refresh token.
    pub refresh: IssuedToken,
}

/// Signs and validates session tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: chrono::Duration,
    refresh_ttl: chrono::Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl TokenIssuer {
    /// Create an issuer.
    ///
    /// Rejects an empty secret and any TTL pair where the access token would
    /// not expire strictly before the refresh token.
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::InvalidConfig("secret must not be empty".to_string()));
        }
        if access_ttl.is_zero() || access_ttl >= refresh_ttl {
            return Err(TokenError::InvalidConfig(format!(
                "access ttl ({}s) must be positive and shorter than refresh ttl ({}s)",
                access_ttl.as_secs(),
                refresh_ttl.as_secs()
            )));
        }

        let to_chrono = |d: Duration| {
            chrono::Duration::from_std(d).map_err(|e| TokenError::InvalidConfig(e.to_string()))
        };

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl: to_chrono(access_ttl)?,
            refresh_ttl: to_chrono(refresh_ttl)?,
        })
    }

    /// Access token lifetime.
    pub fn access_ttl(&self) -> chrono::Duration {
        self.access_ttl
    }

    /// Refresh token lifetime.
    pub fn refresh_ttl(&self) -> chrono::Duration {
        self.refresh_ttl
    }

    /// Issue an access token carrying the account profile.
    pub fn issue_access_token(&self, account: &Account) -> Result<IssuedToken, TokenError> {
        self.issue_access_token_at(account, Utc::now())
    }

    /// Issue a refresh token for the account.
    pub fn issue_refresh_token(&self, account: &Account) -> Result<IssuedToken, TokenError> {
        self.issue_refresh_token_at(account, Utc::now())
    }

    /// Issue both tokens from the same instant.
    pub fn issue_pair(&self, account: &Account) -> Result<TokenPair, TokenError> {
        let now = Utc::now();
        Ok(TokenPair {
            access: self.issue_access_token_at(account, now)?,
            refresh: self.issue_refresh_token_at(account, now)?,
        })
    }

    pub(crate) fn issue_access_token_at(
        &self,
        account: &Account,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = now + self.access_ttl;
        let claims = AccessClaims {
            sub: account.id.clone(),
            name: account.full_name.clone(),
            email: account.email.clone(),
            phone: account.phone.clone(),
            role: account.role,
            iss: account.id.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            typ: TokenType::Access,
        };

        Ok(IssuedToken {
            token: self.sign(&claims)?,
            issued_at: now,
            expires_at,
        })
    }

    pub(crate) fn issue_refresh_token_at(
        &self,
        account: &Account,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = now + self.refresh_ttl;
        let claims = RefreshClaims {
            sub: account.id.clone(),
            iss: account.id.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            typ: TokenType::Refresh,
        };

        Ok(IssuedToken {
            token: self.sign(&claims)?,
            issued_at: now,
            expires_at,
        })
    }

    /// Validate an access token and return its claims.
    pub fn validate_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.validate(token, TokenType::Access)
    }

    /// Validate a refresh token and return its claims.
    pub fn validate_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        self.validate(token, TokenType::Refresh)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Signature and expiry are checked by `decode` before the payload is
    /// inspected, so a forged `typ` never gets this far.
    fn validate<T: DeserializeOwned>(&self, token: &str, expected: TokenType) -> Result<T, TokenError> {
        let data = decode::<serde_json::Value>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            })?;

        let typ = data
            .claims
            .get("typ")
            .cloned()
            .and_then(|v| serde_json::from_value::<TokenType>(v).ok())
            .ok_or(TokenError::Malformed)?;
        if typ != expected {
            return Err(TokenError::WrongType);
        }

        serde_json::from_value(data.claims).map_err(|_| TokenError::Malformed)
    }
}
