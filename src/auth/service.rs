//! Session management service
//!
//! Orchestrates the credential store, password hasher, and token issuer into
//! the login / refresh / logout lifecycle. One refresh token slot per user:
//! logging in again or rotating supersedes the previous token.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::config::AuthConfig;
use crate::models::{
    AuthTokensResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, User, UserResponse,
};
use crate::storage::{StoreError, UserStore};

use super::hasher::{hash_password, verify_password, HashError};
use super::jwt::{
    generate_access_token, generate_refresh_token, verify_access_token, verify_refresh_token,
    JwtError,
};

/// Session lifecycle errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    #[error("Refresh token is superseded or revoked")]
    RefreshTokenStale,

    #[error("{0} already taken")]
    IdentifierTaken(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Hashing error: {0}")]
    Hash(String),

    #[error("Token encoding error: {0}")]
    TokenEncoding(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::TokenExpired => AuthError::TokenExpired,
            JwtError::TokenInvalid(msg) => AuthError::TokenInvalid(msg),
            JwtError::EncodingFailed(msg) => AuthError::TokenEncoding(msg),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => AuthError::UserNotFound,
            StoreError::Duplicate(field) => AuthError::IdentifierTaken(field),
            StoreError::Backend(msg) => AuthError::Store(msg),
        }
    }
}

impl From<HashError> for AuthError {
    fn from(e: HashError) -> Self {
        AuthError::Hash(e.to_string())
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    config: AuthConfig,
}

impl AuthService {
    /// Create a new AuthService. Secrets arrive pre-validated via
    /// [`AuthConfig`]; nothing here reads the environment.
    pub fn new(store: Arc<dyn UserStore>, config: AuthConfig) -> Self {
        Self { store, config }
    }

    /// Register a new user.
    ///
    /// The password is hashed here and only here on the create path; the
    /// store never sees plaintext.
    pub async fn register(&self, req: RegisterRequest) -> Result<UserResponse, AuthError> {
        let req = RegisterRequest {
            username: req.username.trim().to_lowercase(),
            email: req.email.trim().to_lowercase(),
            fullname: req.fullname.trim().to_string(),
            ..req
        };
        req.validate()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: req.username,
            email: req.email,
            fullname: req.fullname,
            password_hash: hash_password(&req.password)?,
            refresh_token: None,
            avatar: req.avatar,
            cover_image: req.cover_image,
            watch_history: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let created = self.store.create_user(user).await?;
        tracing::info!(user_id = %created.id, username = %created.username, "User registered");

        Ok(created.into())
    }

    /// Log in with a username or email and issue a fresh token pair.
    ///
    /// The new refresh token overwrites whatever was stored, so a login on a
    /// second device invalidates the first device's refresh token.
    pub async fn login(&self, req: LoginRequest) -> Result<AuthTokensResponse, AuthError> {
        let identifier = req.identifier.trim().to_lowercase();

        let user = self
            .store
            .find_by_username_or_email(&identifier)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(&req.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let (access_token, refresh_token) = self.issue_token_pair(&user)?;

        self.store
            .set_refresh_token(user.id, Some(refresh_token.clone()))
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(self.tokens_response(access_token, refresh_token, user))
    }

    /// Exchange a refresh token for a new token pair, rotating the stored
    /// slot.
    ///
    /// The conditional write is the authoritative gate: of two concurrent
    /// calls presenting the same token, exactly one commits and the loser
    /// fails with [`AuthError::RefreshTokenStale`].
    pub async fn refresh(&self, presented: &str) -> Result<AuthTokensResponse, AuthError> {
        let claims = verify_refresh_token(presented, &self.config.refresh_token_secret)?;
        let user_id = claims.user_id()?;

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        // Early check so an obviously superseded token never mints anything;
        // the rotate below re-checks atomically.
        if user.refresh_token.as_deref() != Some(presented) {
            tracing::warn!(user_id = %user.id, "Superseded refresh token presented");
            return Err(AuthError::RefreshTokenStale);
        }

        let (access_token, refresh_token) = self.issue_token_pair(&user)?;

        let rotated = self
            .store
            .rotate_refresh_token(user.id, presented, refresh_token.clone())
            .await?;
        if !rotated {
            tracing::warn!(user_id = %user.id, "Lost refresh rotation race");
            return Err(AuthError::RefreshTokenStale);
        }

        Ok(self.tokens_response(access_token, refresh_token, user))
    }

    /// Log out: clear the stored refresh token.
    ///
    /// Access tokens already issued stay valid until their own expiry; they
    /// are stateless and never looked up.
    pub async fn logout(&self, user_id: Uuid) -> Result<(), AuthError> {
        self.store.set_refresh_token(user_id, None).await?;
        tracing::info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Change the password after re-verifying the old one. The refresh slot
    /// is untouched: existing sessions stay valid.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        req: ChangePasswordRequest,
    ) -> Result<(), AuthError> {
        req.validate()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(&req.old_password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.store
            .update_password(user_id, hash_password(&req.new_password)?)
            .await?;

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Resolve an access token to the identity it asserts.
    ///
    /// The user is re-loaded from the store rather than trusted from claims,
    /// so a deleted identity fails even with an unexpired token.
    pub async fn authenticate(&self, access_token: &str) -> Result<UserResponse, AuthError> {
        let claims = verify_access_token(access_token, &self.config.access_token_secret)?;
        let user_id = claims.user_id()?;

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.into())
    }

    fn issue_token_pair(&self, user: &User) -> Result<(String, String), AuthError> {
        let access = generate_access_token(
            user,
            &self.config.access_token_secret,
            self.config.access_token_ttl_seconds,
        )?;
        let refresh = generate_refresh_token(
            user,
            &self.config.refresh_token_secret,
            self.config.refresh_token_ttl_days,
        )?;
        Ok((access, refresh))
    }

    fn tokens_response(
        &self,
        access_token: String,
        refresh_token: String,
        user: User,
    ) -> AuthTokensResponse {
        AuthTokensResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_ttl_seconds,
            user: user.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn test_service() -> AuthService {
        let config = AuthConfig::new(
            "test-access-secret".into(),
            "test-refresh-secret".into(),
            900,
            10,
        )
        .unwrap();
        AuthService::new(Arc::new(MemoryStore::new()), config)
    }

    fn alice() -> RegisterRequest {
        RegisterRequest {
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
            fullname: "Alice Example".to_string(),
            password: "secret-password-1".to_string(),
            avatar: None,
            cover_image: None,
        }
    }

    fn login(identifier: &str, password: &str) -> LoginRequest {
        LoginRequest {
            identifier: identifier.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_scrubs_and_normalizes() {
        let service = test_service();

        let user = service
            .register(RegisterRequest {
                username: "  Alice  ".to_string(),
                email: "Alice@X.com".to_string(),
                fullname: "  Alice Example ".to_string(),
                ..alice()
            })
            .await
            .unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@x.com");
        assert_eq!(user.fullname, "Alice Example");
        // The response type has no hash or refresh token field at all;
        // login works against the normalized identifier.
        service
            .login(login("ALICE", "secret-password-1"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_register_rejects_taken_identifier() {
        let service = test_service();
        service.register(alice()).await.unwrap();

        let err = service
            .register(RegisterRequest {
                email: "other@x.com".to_string(),
                ..alice()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::IdentifierTaken(_)));
    }

    #[tokio::test]
    async fn test_login_by_username_and_by_email() {
        let service = test_service();
        service.register(alice()).await.unwrap();

        assert!(service.login(login("alice", "secret-password-1")).await.is_ok());
        assert!(service
            .login(login("alice@x.com", "secret-password-1"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_login_failure_leaves_store_unchanged() {
        let service = test_service();
        let registered = service.register(alice()).await.unwrap();

        let err = service
            .login(login("alice", "wrongpass"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let err = service
            .login(login("nobody", "secret-password-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));

        // No refresh token was written by the failed attempts.
        let stored = service.store.find_by_id(registered.id).await.unwrap().unwrap();
        assert!(stored.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_login_persists_refresh_token_verbatim() {
        let service = test_service();
        let registered = service.register(alice()).await.unwrap();

        let tokens = service.login(login("alice", "secret-password-1")).await.unwrap();

        let stored = service.store.find_by_id(registered.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some(tokens.refresh_token.as_str()));
    }

    #[tokio::test]
    async fn test_refresh_rotation_lifecycle() {
        let service = test_service();
        service.register(alice()).await.unwrap();

        let first = service.login(login("alice", "secret-password-1")).await.unwrap();

        let second = service.refresh(&first.refresh_token).await.unwrap();
        assert_ne!(second.access_token, first.access_token);
        assert_ne!(second.refresh_token, first.refresh_token);

        // The superseded token is permanently dead.
        let err = service.refresh(&first.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::RefreshTokenStale));

        // The rotated token works exactly once more.
        let third = service.refresh(&second.refresh_token).await.unwrap();
        assert_ne!(third.refresh_token, second.refresh_token);
    }

    #[tokio::test]
    async fn test_refresh_with_garbage_token() {
        let service = test_service();

        let err = service.refresh("not.a.token").await.unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid(_)));
    }

    #[tokio::test]
    async fn test_second_login_supersedes_first_session() {
        let service = test_service();
        service.register(alice()).await.unwrap();

        let first = service.login(login("alice", "secret-password-1")).await.unwrap();
        let second = service.login(login("alice", "secret-password-1")).await.unwrap();

        let err = service.refresh(&first.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::RefreshTokenStale));
        assert!(service.refresh(&second.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_logout_revokes_refresh_but_not_access() {
        let service = test_service();
        let registered = service.register(alice()).await.unwrap();

        let tokens = service.login(login("alice", "secret-password-1")).await.unwrap();
        service.logout(registered.id).await.unwrap();

        let err = service.refresh(&tokens.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::RefreshTokenStale));

        // The access token is stateless and survives logout until expiry.
        let who = service.authenticate(&tokens.access_token).await.unwrap();
        assert_eq!(who.id, registered.id);
    }

    #[tokio::test]
    async fn test_concurrent_refresh_has_exactly_one_winner() {
        let service = test_service();
        let registered = service.register(alice()).await.unwrap();
        let tokens = service.login(login("alice", "secret-password-1")).await.unwrap();

        let (a, b) = tokio::join!(
            service.refresh(&tokens.refresh_token),
            service.refresh(&tokens.refresh_token)
        );

        let (winner, loser) = match (&a, &b) {
            (Ok(_), Err(_)) => (a.unwrap(), b.unwrap_err()),
            (Err(_), Ok(_)) => (b.unwrap(), a.unwrap_err()),
            _ => panic!("expected exactly one of two concurrent refreshes to succeed"),
        };
        assert!(matches!(loser, AuthError::RefreshTokenStale));

        // The store holds exactly the winner's token.
        let stored = service.store.find_by_id(registered.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some(winner.refresh_token.as_str()));
    }

    #[tokio::test]
    async fn test_change_password_keeps_session_alive() {
        let service = test_service();
        let registered = service.register(alice()).await.unwrap();
        let tokens = service.login(login("alice", "secret-password-1")).await.unwrap();

        let err = service
            .change_password(
                registered.id,
                ChangePasswordRequest {
                    old_password: "wrongpass".to_string(),
                    new_password: "secret-password-2".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        service
            .change_password(
                registered.id,
                ChangePasswordRequest {
                    old_password: "secret-password-1".to_string(),
                    new_password: "secret-password-2".to_string(),
                },
            )
            .await
            .unwrap();

        // Old password is dead, new one works, and the pre-change session
        // still refreshes.
        assert!(service.login(login("alice", "secret-password-1")).await.is_err());
        assert!(service.refresh(&tokens.refresh_token).await.is_ok());
        assert!(service.login(login("alice", "secret-password-2")).await.is_ok());
    }

    #[tokio::test]
    async fn test_authenticate_rejects_unknown_identity() {
        let service = test_service();

        // A structurally valid token for an identity the store has never
        // seen must not authenticate.
        let ghost = User {
            id: Uuid::new_v4(),
            username: "ghost".to_string(),
            email: "ghost@x.com".to_string(),
            fullname: "Ghost".to_string(),
            password_hash: "$2b$10$irrelevant".to_string(),
            refresh_token: None,
            avatar: None,
            cover_image: None,
            watch_history: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let token = generate_access_token(&ghost, "test-access-secret", 900).unwrap();

        let err = service.authenticate(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }
}
