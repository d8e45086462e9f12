//! Configuration module for the storefront auth service.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::{Result, StorefrontError};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8901
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/storefront.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/storefront-auth.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Token and session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC secret used to sign every token (must be set).
    #[serde(default)]
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_secs: u64,
    /// Refresh token lifetime in seconds.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_secs: u64,
    /// Upper bound for a single account store call, in seconds.
    #[serde(default = "default_store_timeout")]
    pub store_timeout_secs: u64,
}

fn default_access_ttl() -> u64 {
    1800 // 30 minutes
}

fn default_refresh_ttl() -> u64 {
    168 * 3600 // 7 days
}

fn default_store_timeout() -> u64 {
    10
}

impl AuthConfig {
    /// Access token lifetime.
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_token_ttl_secs)
    }

    /// Refresh token lifetime.
    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_token_ttl_secs)
    }

    /// Per-call store timeout.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_ttl_secs: default_access_ttl(),
            refresh_token_ttl_secs: default_refresh_ttl(),
            store_timeout_secs: default_store_timeout(),
        }
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_cost")]
    pub memory_cost_kib: u32,
    /// Number of iterations.
    #[serde(default = "default_time_cost")]
    pub time_cost: u32,
    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_cost() -> u32 {
    65536 // 64 MB
}

fn default_time_cost() -> u32 {
    3
}

fn default_parallelism() -> u32 {
    4
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_cost_kib: default_memory_cost(),
            time_cost: default_time_cost(),
            parallelism: default_parallelism(),
        }
    }
}

/// Session cookie attributes.
#[derive(Debug, Clone, Deserialize)]
pub struct CookieConfig {
    /// Domain attribute for both session cookies. Empty omits the attribute.
    #[serde(default = "default_cookie_domain")]
    pub domain: String,
    /// Restrict cookies to HTTPS.
    #[serde(default = "default_true")]
    pub secure: bool,
    /// Hide cookies from client-side scripts.
    #[serde(default = "default_true")]
    pub http_only: bool,
}

fn default_cookie_domain() -> String {
    "localhost".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            domain: default_cookie_domain(),
            secure: true,
            http_only: true,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CorsConfig {
    /// Allowed origins. Empty means permissive mode without credentials.
    #[serde(default)]
    pub origins: Vec<String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Token configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Password hashing configuration.
    #[serde(default)]
    pub password: PasswordConfig,
    /// Cookie configuration.
    #[serde(default)]
    pub cookie: CookieConfig,
    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(StorefrontError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s)
            .map_err(|e| StorefrontError::Validation(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `STOREFRONT_JWT_SECRET`: Override the token signing secret
    /// - `STOREFRONT_COOKIE_DOMAIN`: Override the session cookie domain
    pub fn apply_env_overrides(&mut self) {
        if let Ok(jwt_secret) = std::env::var("STOREFRONT_JWT_SECRET") {
            if !jwt_secret.is_empty() {
                self.auth.jwt_secret = jwt_secret;
            }
        }
        if let Ok(domain) = std::env::var("STOREFRONT_COOKIE_DOMAIN") {
            if !domain.is_empty() {
                self.cookie.domain = domain;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the JWT secret is not set
    /// - the access token TTL is zero or not shorter than the refresh token TTL
    /// - the store timeout is zero
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(StorefrontError::Validation(
                "jwt_secret is not set. \
                 Set it in config.toml or via STOREFRONT_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }
        if self.auth.access_token_ttl_secs == 0 {
            return Err(StorefrontError::Validation(
                "access_token_ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.auth.access_token_ttl_secs >= self.auth.refresh_token_ttl_secs {
            return Err(StorefrontError::Validation(format!(
                "access_token_ttl_secs ({}) must be shorter than refresh_token_ttl_secs ({})",
                self.auth.access_token_ttl_secs, self.auth.refresh_token_ttl_secs
            )));
        }
        if self.auth.store_timeout_secs == 0 {
            return Err(StorefrontError::Validation(
                "store_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
