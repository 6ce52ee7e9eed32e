//! Data models for the VideoTube backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod auth;
pub use auth::*;

/// User model as persisted by the credential store.
///
/// `password_hash` and `refresh_token` never leave the server; every
/// externally visible copy goes through [`UserResponse`].
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub password_hash: String,
    /// The single active refresh token, stored verbatim. `None` after logout
    /// or before the first login.
    pub refresh_token: Option<String>,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
    /// Video references owned by the CRUD layer; carried opaquely here.
    pub watch_history: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            fullname: user.fullname,
            avatar: user.avatar,
            cover_image: user.cover_image,
            created_at: user.created_at,
        }
    }
}
