//! Middleware for the VideoTube API
//!
//! Request tracing and authentication extraction.

pub mod auth;
mod tracing;

pub use auth::{AuthenticatedUser, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
pub use tracing::request_tracing;
