//! JWT token generation and validation
//!
//! Access and refresh tokens are signed with distinct secrets and distinct
//! expiry policies, so a leaked secret for one kind cannot mint the other.
//! Verification is pure: validity is decided by signature and expiry alone.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::User;

/// JWT-related errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    TokenInvalid(String),
}

/// Token kind, embedded as the `token_type` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// Claims carried by access tokens: enough profile to render the session
/// without a store read, though authorization-sensitive paths re-load the
/// user anyway.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    pub username: String,
    pub fullname: String,
    /// Per-issuance ID; keeps two tokens minted in the same second distinct
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    pub token_type: String,
}

/// Claims carried by refresh tokens. Deliberately minimal: the token is
/// re-validated against the stored slot on every use.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    pub sub: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub token_type: String,
}

impl AccessClaims {
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|e| JwtError::TokenInvalid(e.to_string()))
    }
}

impl RefreshClaims {
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|e| JwtError::TokenInvalid(e.to_string()))
    }
}

/// Generate an access token for a user
pub fn generate_access_token(
    user: &User,
    secret: &str,
    ttl_seconds: i64,
) -> Result<String, JwtError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(ttl_seconds);

    let claims = AccessClaims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        username: user.username.clone(),
        fullname: user.fullname.clone(),
        jti: Uuid::new_v4().to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
        token_type: TokenKind::Access.as_str().to_string(),
    };

    sign(&claims, secret)
}

/// Generate a refresh token for a user
pub fn generate_refresh_token(
    user: &User,
    secret: &str,
    ttl_days: i64,
) -> Result<String, JwtError> {
    let now = Utc::now();
    let exp = now + Duration::days(ttl_days);

    let claims = RefreshClaims {
        sub: user.id.to_string(),
        jti: Uuid::new_v4().to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
        token_type: TokenKind::Refresh.as_str().to_string(),
    };

    sign(&claims, secret)
}

/// Verify and decode an access token
pub fn verify_access_token(token: &str, secret: &str) -> Result<AccessClaims, JwtError> {
    let claims: AccessClaims = verify(token, secret)?;
    check_kind(&claims.token_type, TokenKind::Access)?;
    Ok(claims)
}

/// Verify and decode a refresh token
pub fn verify_refresh_token(token: &str, secret: &str) -> Result<RefreshClaims, JwtError> {
    let claims: RefreshClaims = verify(token, secret)?;
    check_kind(&claims.token_type, TokenKind::Refresh)?;
    Ok(claims)
}

fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String, JwtError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::EncodingFailed(e.to_string()))
}

fn verify<T: DeserializeOwned>(token: &str, secret: &str) -> Result<T, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    decode::<T>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            _ => JwtError::TokenInvalid(e.to_string()),
        })
}

fn check_kind(token_type: &str, expected: TokenKind) -> Result<(), JwtError> {
    if token_type != expected.as_str() {
        return Err(JwtError::TokenInvalid(format!(
            "expected {} token, got {}",
            expected.as_str(),
            token_type
        )));
    }
    Ok(())
}
