//! Credential store abstraction
//!
//! The document database backing user records is an external collaborator;
//! this module owns only the interface the auth core consumes, plus an
//! in-memory implementation used by the dev server and the test suite.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::User;

/// Storage Result type
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by credential store implementations
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate value for {0}")]
    Duplicate(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Persistence operations consumed by the session manager and the request
/// authenticator. All writes are all-or-nothing; `rotate_refresh_token` is
/// the conditional write that serializes concurrent refreshes.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user record. Fails with [`StoreError::Duplicate`] when
    /// the username or email (either field, case-insensitively) is already
    /// taken.
    async fn create_user(&self, user: User) -> Result<User>;

    /// Look up a user by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Look up a user whose username or email equals `identifier`
    /// (lowercased). Unambiguous because `create_user` enforces uniqueness
    /// across both fields.
    async fn find_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;

    /// Overwrite the stored refresh token unconditionally. Login passes
    /// `Some` (superseding any prior session); logout passes `None`.
    async fn set_refresh_token(&self, id: Uuid, token: Option<String>) -> Result<()>;

    /// Replace the stored refresh token only if it still equals `expected`.
    /// Returns `false` when the slot changed in the meantime, in which case
    /// nothing is written.
    async fn rotate_refresh_token(&self, id: Uuid, expected: &str, new: String) -> Result<bool>;

    /// Replace the stored password hash.
    async fn update_password(&self, id: Uuid, password_hash: String) -> Result<()>;
}
