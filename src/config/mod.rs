//! Configuration management for the VideoTube backend
//!
//! Loads and validates configuration from environment variables. Token
//! secrets are required and validated here so that a misconfigured signer is
//! a startup failure, never a per-request one.

use std::env;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid environment value: {0}")]
    InvalidValue(String),

    #[error("Invalid port number: {0}")]
    InvalidPort(String),
}

/// Application environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid environment: '{}'. Expected: dev or prod",
                s
            ))),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Signing secrets and expiry policy for the token issuer and session
/// manager. Split out of [`Config`] so tests can construct it directly.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret for signing access tokens
    pub access_token_secret: String,

    /// Secret for signing refresh tokens; must differ from the access secret
    pub refresh_token_secret: String,

    /// Access token TTL in seconds (default: 900 = 15 minutes)
    pub access_token_ttl_seconds: i64,

    /// Refresh token TTL in days (default: 10)
    pub refresh_token_ttl_days: i64,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Current environment
    pub environment: Environment,

    /// Server port
    pub port: u16,

    /// CORS allowed origins (comma-separated)
    pub cors_allowed_origins: Option<String>,

    /// Log level (RUST_LOG)
    pub log_level: String,

    /// Token signing configuration
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .map(|s| Environment::from_str(&s))
            .unwrap_or(Ok(Environment::Development))?;

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort("PORT must be a valid number".to_string()))?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS").ok();

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let access_token_secret = env::var("ACCESS_TOKEN_SECRET")
            .map_err(|_| ConfigError::MissingEnvVar("ACCESS_TOKEN_SECRET".to_string()))?;

        let refresh_token_secret = env::var("REFRESH_TOKEN_SECRET")
            .map_err(|_| ConfigError::MissingEnvVar("REFRESH_TOKEN_SECRET".to_string()))?;

        let auth = AuthConfig::new(
            access_token_secret,
            refresh_token_secret,
            env::var("ACCESS_TOKEN_TTL_SECONDS")
                .unwrap_or_else(|_| "900".to_string())
                .parse::<i64>()
                .unwrap_or(900),
            env::var("REFRESH_TOKEN_TTL_DAYS")
                .unwrap_or_else(|_| "10".to_string())
                .parse::<i64>()
                .unwrap_or(10),
        )?;

        Ok(Config {
            environment,
            port,
            cors_allowed_origins,
            log_level,
            auth,
        })
    }
}

impl AuthConfig {
    /// Validate and build the token signing configuration.
    ///
    /// A blank secret or a shared access/refresh secret would collapse the
    /// two token kinds into one signing domain, so both are rejected.
    pub fn new(
        access_token_secret: String,
        refresh_token_secret: String,
        access_token_ttl_seconds: i64,
        refresh_token_ttl_days: i64,
    ) -> Result<Self, ConfigError> {
        if access_token_secret.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "ACCESS_TOKEN_SECRET must not be empty".to_string(),
            ));
        }
        if refresh_token_secret.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "REFRESH_TOKEN_SECRET must not be empty".to_string(),
            ));
        }
        if access_token_secret == refresh_token_secret {
            return Err(ConfigError::InvalidValue(
                "ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ".to_string(),
            ));
        }

        Ok(Self {
            access_token_secret,
            refresh_token_secret,
            access_token_ttl_seconds,
            refresh_token_ttl_days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_from_str() {
        assert_eq!(
            Environment::from_str("dev").unwrap(),
            Environment::Development
        );
        assert_eq!(
            Environment::from_str("PROD").unwrap(),
            Environment::Production
        );
        assert!(Environment::from_str("invalid").is_err());
    }

    #[test]
    fn test_environment_is_production() {
        assert!(!Environment::Development.is_production());
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_auth_config_accepts_distinct_secrets() {
        let auth = AuthConfig::new("access-secret".into(), "refresh-secret".into(), 900, 10);
        assert!(auth.is_ok());
    }

    #[test]
    fn test_auth_config_rejects_shared_secret() {
        let auth = AuthConfig::new("same-secret".into(), "same-secret".into(), 900, 10);
        assert!(matches!(auth, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_auth_config_rejects_blank_secret() {
        let auth = AuthConfig::new("  ".into(), "refresh-secret".into(), 900, 10);
        assert!(matches!(auth, Err(ConfigError::InvalidValue(_))));
    }
}
