//! In-memory credential store
//!
//! Backs the dev server and the test suite. A single mutex over the map
//! makes every operation atomic, which is exactly the all-or-nothing write
//! behavior the session manager assumes of the real document store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::User;
use crate::storage::{Result, StoreError, UserStore};

/// In-memory store keyed by user id
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: User) -> Result<User> {
        let mut users = self.users.lock().await;

        // Uniqueness across both identifier fields: a username may not equal
        // another record's email either, so username-or-email lookups stay
        // unambiguous.
        for existing in users.values() {
            if existing.username == user.username || existing.email == user.username {
                return Err(StoreError::Duplicate("username".to_string()));
            }
            if existing.email == user.email || existing.username == user.email {
                return Err(StoreError::Duplicate("email".to_string()));
            }
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        let users = self.users.lock().await;
        Ok(users
            .values()
            .find(|u| u.username == identifier || u.email == identifier)
            .cloned())
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<String>) -> Result<()> {
        let mut users = self.users.lock().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        user.refresh_token = token;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn rotate_refresh_token(&self, id: Uuid, expected: &str, new: String) -> Result<bool> {
        let mut users = self.users.lock().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if user.refresh_token.as_deref() != Some(expected) {
            return Ok(false);
        }

        user.refresh_token = Some(new);
        user.updated_at = Utc::now();
        Ok(true)
    }

    async fn update_password(&self, id: Uuid, password_hash: String) -> Result<()> {
        let mut users = self.users.lock().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        user.password_hash = password_hash;
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(username: &str, email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            fullname: "Test User".to_string(),
            password_hash: "$2b$10$irrelevant".to_string(),
            refresh_token: None,
            avatar: None,
            cover_image: None,
            watch_history: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryStore::new();
        let user = store.create_user(test_user("alice", "alice@x.com")).await.unwrap();

        assert!(store.find_by_id(user.id).await.unwrap().is_some());
        assert!(store
            .find_by_username_or_email("alice")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_by_username_or_email("alice@x.com")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_by_username_or_email("bob")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = MemoryStore::new();
        store.create_user(test_user("alice", "alice@x.com")).await.unwrap();

        let err = store
            .create_user(test_user("alice", "other@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_username_colliding_with_email_rejected() {
        let store = MemoryStore::new();
        store.create_user(test_user("alice", "alice@x.com")).await.unwrap();

        // A username equal to an existing email would make
        // username-or-email lookups ambiguous.
        let err = store
            .create_user(test_user("alice@x.com", "second@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_rotate_is_conditional() {
        let store = MemoryStore::new();
        let user = store.create_user(test_user("alice", "alice@x.com")).await.unwrap();

        store
            .set_refresh_token(user.id, Some("r1".to_string()))
            .await
            .unwrap();

        assert!(store
            .rotate_refresh_token(user.id, "r1", "r2".to_string())
            .await
            .unwrap());

        // Second rotation against the superseded value must not write.
        assert!(!store
            .rotate_refresh_token(user.id, "r1", "r3".to_string())
            .await
            .unwrap());

        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some("r2"));
    }
}
