//! Authentication module for the VideoTube backend
//!
//! - Password hashing (bcrypt)
//! - Access/refresh JWT issuance and verification with distinct secrets
//! - Session management with single-slot refresh token rotation

mod hasher;
mod jwt;
mod service;

pub use hasher::{hash_password, verify_password, HashError};
pub use jwt::{
    generate_access_token, generate_refresh_token, verify_access_token, verify_refresh_token,
    AccessClaims, JwtError, RefreshClaims, TokenKind,
};
pub use service::{AuthError, AuthService};
