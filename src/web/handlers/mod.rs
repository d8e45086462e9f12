//! API handlers.

pub mod users;

pub use users::*;
