//! Web API module.
//!
//! This module exposes the account and session endpoints under `/users`,
//! carrying session tokens in cookies.

pub mod cookies;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use cookies::{SessionCookies, AUTH_COOKIE, REFRESH_COOKIE};
pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_health_router, create_router};
pub use server::WebServer;
