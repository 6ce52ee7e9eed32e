//! Centralized API error handling for the VideoTube backend
//!
//! Provides a unified error type for API responses with HTTP status code
//! mapping and JSON error envelopes. Every authentication failure maps to a
//! 401 with a stable machine-checkable code; only store/hash breakage is a
//! 5xx.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;

/// API error type with HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid username/email or password")]
    InvalidCredentials,

    #[error("Access token has expired")]
    TokenExpired,

    #[error("Invalid or malformed token")]
    TokenInvalid,

    #[error("Refresh token has been superseded or revoked")]
    RefreshTokenStale,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// JSON error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// Error details in the response
#[derive(Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

impl ApiError {
    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::TokenExpired => "TOKEN_EXPIRED",
            ApiError::TokenInvalid => "TOKEN_INVALID",
            ApiError::RefreshTokenStale => "REFRESH_TOKEN_STALE",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_)
            | ApiError::InvalidCredentials
            | ApiError::TokenExpired
            | ApiError::TokenInvalid
            | ApiError::RefreshTokenStale => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        match &self {
            ApiError::InternalError(_) => {
                tracing::error!(error = %message, code = %error_code, "Server error occurred");
            }
            _ => {
                tracing::debug!(error = %message, code = %error_code, "Client error occurred");
            }
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code: error_code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            // Unknown identifier and bad password share one user-facing
            // message so responses don't reveal which accounts exist.
            AuthError::InvalidCredentials | AuthError::UserNotFound => {
                ApiError::InvalidCredentials
            }
            AuthError::TokenExpired => ApiError::TokenExpired,
            AuthError::TokenInvalid(_) => ApiError::TokenInvalid,
            AuthError::RefreshTokenStale => ApiError::RefreshTokenStale,
            AuthError::IdentifierTaken(field) => {
                ApiError::Conflict(format!("{} is already in use", field))
            }
            AuthError::Validation(msg) => ApiError::ValidationError(msg),
            AuthError::Hash(msg) | AuthError::TokenEncoding(msg) => {
                ApiError::InternalError(msg)
            }
            AuthError::Store(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

/// Result type alias using ApiError
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError::InvalidCredentials.error_code(), "INVALID_CREDENTIALS");
        assert_eq!(ApiError::TokenExpired.error_code(), "TOKEN_EXPIRED");
        assert_eq!(ApiError::TokenInvalid.error_code(), "TOKEN_INVALID");
        assert_eq!(
            ApiError::RefreshTokenStale.error_code(),
            "REFRESH_TOKEN_STALE"
        );
    }

    #[test]
    fn test_auth_failures_are_401_never_5xx() {
        for err in [
            ApiError::InvalidCredentials,
            ApiError::TokenExpired,
            ApiError::TokenInvalid,
            ApiError::RefreshTokenStale,
            ApiError::Unauthorized("no token".to_string()),
        ] {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_login_failures_share_one_message() {
        let unknown: ApiError = AuthError::UserNotFound.into();
        let wrong_password: ApiError = AuthError::InvalidCredentials.into();
        assert_eq!(unknown.to_string(), wrong_password.to_string());
        assert_eq!(unknown.error_code(), wrong_password.error_code());
    }
}
