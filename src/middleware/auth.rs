//! Authentication middleware
//!
//! Extractor that resolves the access token on an inbound request to a
//! scrubbed user before any handler runs. The token is read from the
//! `accessToken` cookie first, then from the `Authorization: Bearer` header.

use std::ops::Deref;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    extract::cookie::CookieJar,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::auth::AuthService;
use crate::error::ApiError;
use crate::models::UserResponse;

/// Cookie carrying the access token
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
/// Cookie carrying the refresh token
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Authenticated user resolved from the access token.
///
/// The identity is re-loaded from the credential store, so the claims are
/// never the sole source for authorization-sensitive reads.
///
/// ```rust,ignore
/// async fn protected_handler(user: AuthenticatedUser) -> impl IntoResponse {
///     format!("Hello, {}", user.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserResponse);

impl Deref for AuthenticatedUser {
    type Target = UserResponse;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_access_token(parts, state)
            .await
            .ok_or_else(|| ApiError::Unauthorized("unauthorized request".to_string()))?;

        let auth_service = Arc::<AuthService>::from_ref(state);

        let user = auth_service.authenticate(&token).await?;

        Ok(AuthenticatedUser(user))
    }
}

/// Pull the access token out of the request. Cookie wins over bearer header
/// when both are present.
async fn extract_access_token<S: Send + Sync>(parts: &mut Parts, state: &S) -> Option<String> {
    let jar = CookieJar::from_request_parts(parts, state).await.ok()?;
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
        return Some(cookie.value().to_string());
    }

    TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
        .await
        .ok()
        .map(|TypedHeader(Authorization(bearer))| bearer.token().to_string())
}
