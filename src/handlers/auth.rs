//! Authentication HTTP handlers
//!
//! Thin adapters between the HTTP surface (JSON bodies, cookies, bearer
//! headers) and the session service. Tokens travel as `HttpOnly` + `Secure`
//! cookies; the access token is also accepted as a bearer header and the
//! refresh token as a body field.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::error::ApiError;
use crate::middleware::{AuthenticatedUser, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::models::{
    AuthTokensResponse, ChangePasswordRequest, LoginRequest, RefreshTokenRequest, RegisterRequest,
    UserResponse,
};
use crate::state::AppState;

/// POST /api/v1/users/register - Create a new user
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state.auth_service.register(req).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/v1/users/login - Authenticate and issue a token pair
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthTokensResponse>), ApiError> {
    let tokens = state.auth_service.login(req).await?;

    let jar = set_token_cookies(jar, &tokens);
    Ok((jar, Json(tokens)))
}

/// POST /api/v1/users/refresh-token - Rotate the refresh token
///
/// The token is taken from the `refreshToken` cookie when present, else from
/// the request body.
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshTokenRequest>>,
) -> Result<(CookieJar, Json<AuthTokensResponse>), ApiError> {
    let presented = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| body.and_then(|Json(req)| req.refresh_token))
        .ok_or_else(|| ApiError::Unauthorized("refresh token required".to_string()))?;

    let tokens = state.auth_service.refresh(&presented).await?;

    let jar = set_token_cookies(jar, &tokens);
    Ok((jar, Json(tokens)))
}

/// POST /api/v1/users/logout - Clear the stored refresh token and cookies
pub async fn logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError> {
    state.auth_service.logout(user.id).await?;

    let jar = jar
        .remove(removal_cookie(ACCESS_TOKEN_COOKIE))
        .remove(removal_cookie(REFRESH_TOKEN_COOKIE));
    Ok((jar, StatusCode::NO_CONTENT))
}

/// POST /api/v1/users/change-password - Change the current user's password
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    state.auth_service.change_password(user.id, req).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/users/current-user - Get the authenticated user
pub async fn current_user(user: AuthenticatedUser) -> Json<UserResponse> {
    Json(user.0)
}

fn set_token_cookies(jar: CookieJar, tokens: &AuthTokensResponse) -> CookieJar {
    jar.add(token_cookie(ACCESS_TOKEN_COOKIE, tokens.access_token.clone()))
        .add(token_cookie(REFRESH_TOKEN_COOKIE, tokens.refresh_token.clone()))
}

/// Not script-readable, not sent over plaintext transport. Lifetime is
/// governed by the token's own expiry, not the cookie's.
fn token_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .path("/")
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}
