//! Storefront account authentication and session service.
//!
//! Registers accounts, verifies credentials, and issues signed access and
//! refresh tokens carried in session cookies.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod web;

pub use auth::{
    AccessClaims, AuthError, AuthService, AuthenticatedSession, IssuedToken, LoginRequest,
    PasswordCheck, PasswordHasher, RefreshClaims, RegisterRequest, TokenError, TokenIssuer,
    TokenPair,
};
pub use config::Config;
pub use db::{Account, AccountRepository, AccountStore, Database, Role, StoreError};
pub use error::{Result, StorefrontError};
pub use web::WebServer;
