//! Password hashing
//!
//! Thin wrapper over bcrypt. Hashing happens in exactly two places (register
//! and change-password); the store only ever receives a derived hash, so a
//! value is never hashed twice.

use thiserror::Error;

/// bcrypt cost factor. Raising it slows both hashing and verification.
const HASH_COST: u32 = 10;

/// Hashing errors
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Password verification failed: {0}")]
    VerificationFailed(String),
}

/// Hash a plaintext password with a per-call random salt.
pub fn hash_password(plaintext: &str) -> Result<String, HashError> {
    bcrypt::hash(plaintext, HASH_COST).map_err(|e| HashError::HashingFailed(e.to_string()))
}

/// Check a plaintext password against a stored hash.
///
/// Comparison is constant-time inside bcrypt; an `Err` means the stored hash
/// is malformed, not that the password was wrong.
pub fn verify_password(plaintext: &str, hash: &str) -> Result<bool, HashError> {
    bcrypt::verify(plaintext, hash).map_err(|e| HashError::VerificationFailed(e.to_string()))
}
