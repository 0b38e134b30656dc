//! Configuration management for the user registration service
//!
//! Configuration is read once from environment variables at process start and
//! then shared read-only through the application state.

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
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Parse environment from string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid environment: '{}'. Expected: dev, staging, or prod",
                s
            ))),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

/// What the registration sequence does when the confirmation cannot be sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationPolicy {
    /// Log the failure and report the registration as successful
    #[default]
    BestEffort,
    /// Abort the registration; the already persisted user is kept
    Required,
}

impl NotificationPolicy {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "best_effort" => Ok(NotificationPolicy::BestEffort),
            "required" => Ok(NotificationPolicy::Required),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid notification policy: '{}'. Expected: best_effort or required",
                s
            ))),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Current environment
    pub environment: Environment,

    /// Server port
    pub port: u16,

    /// Maximum database connections
    pub db_max_connections: u32,

    /// CORS allowed origins (comma separated)
    pub cors_allowed_origins: Option<String>,

    /// Log level (RUST_LOG)
    pub log_level: String,

    /// Symmetric key for access token signing. `None` when unset or empty.
    pub jwt_secret: Option<String>,

    /// `iss` claim written into and required from access tokens
    pub jwt_issuer: String,

    /// `aud` claim written into and required from access tokens
    pub jwt_audience: String,

    /// Access token TTL in seconds (default: 900 = 15 minutes)
    pub jwt_access_token_ttl_seconds: i64,

    /// Refresh token TTL in days (default: 7)
    pub jwt_refresh_token_ttl_days: i64,

    /// bcrypt work factor
    pub bcrypt_cost: u32,

    /// Behaviour of the registration sequence on notification failure
    pub notification_policy: NotificationPolicy,

    /// Endpoint receiving confirmation requests; confirmations are only logged when unset
    pub notification_webhook_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .map(|s| Environment::parse(&s))
            .unwrap_or(Ok(Environment::Development))?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort("PORT must be a valid number".to_string()))?;

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .unwrap_or(5);

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS").ok();

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let jwt_secret = env::var("JWT_SECRET").ok().filter(|s| !s.trim().is_empty());

        // An unsigned deployment is only tolerated outside production
        if jwt_secret.is_none() && environment.is_production() {
            return Err(ConfigError::MissingEnvVar("JWT_SECRET".to_string()));
        }

        let jwt_issuer =
            env::var("JWT_ISSUER").unwrap_or_else(|_| "user-registration".to_string());

        let jwt_audience =
            env::var("JWT_AUDIENCE").unwrap_or_else(|_| "user-registration-clients".to_string());

        let jwt_access_token_ttl_seconds = match env::var("JWT_ACCESS_TOKEN_TTL_SECONDS") {
            Ok(raw) => parse_access_token_ttl(&raw)?,
            Err(_) => 900,
        };

        let jwt_refresh_token_ttl_days = match env::var("JWT_REFRESH_TOKEN_TTL_DAYS") {
            Ok(raw) => parse_refresh_token_ttl_days(&raw)?,
            Err(_) => 7,
        };

        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(raw) => parse_bcrypt_cost(&raw)?,
            Err(_) => bcrypt::DEFAULT_COST,
        };

        let notification_policy = env::var("NOTIFICATION_POLICY")
            .map(|s| NotificationPolicy::parse(&s))
            .unwrap_or(Ok(NotificationPolicy::BestEffort))?;

        let notification_webhook_url = env::var("NOTIFICATION_WEBHOOK_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Ok(Config {
            database_url,
            environment,
            port,
            db_max_connections,
            cors_allowed_origins,
            log_level,
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            jwt_access_token_ttl_seconds,
            jwt_refresh_token_ttl_days,
            bcrypt_cost,
            notification_policy,
            notification_webhook_url,
        })
    }

    /// Database URL with the password replaced, for logging
    pub fn database_url_masked(&self) -> String {
        if let Some(at_pos) = self.database_url.find('@') {
            if let Some(colon_pos) = self.database_url[..at_pos].rfind(':') {
                let prefix = &self.database_url[..colon_pos + 1];
                let suffix = &self.database_url[at_pos..];
                // the scheme separator is not a password delimiter
                if !self.database_url[colon_pos..].starts_with("://") {
                    return format!("{}****{}", prefix, suffix);
                }
            }
        }
        self.database_url.clone()
    }
}

/// bcrypt accepts work factors 4 through 31
fn parse_bcrypt_cost(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(cost) if (4..=31).contains(&cost) => Ok(cost),
        _ => Err(ConfigError::InvalidValue(format!(
            "BCRYPT_COST must be between 4 and 31, got '{}'",
            raw
        ))),
    }
}

/// Access tokens live between one second and one day
fn parse_access_token_ttl(raw: &str) -> Result<i64, ConfigError> {
    match raw.trim().parse::<i64>() {
        Ok(seconds) if (1..=86_400).contains(&seconds) => Ok(seconds),
        _ => Err(ConfigError::InvalidValue(format!(
            "JWT_ACCESS_TOKEN_TTL_SECONDS must be between 1 and 86400, got '{}'",
            raw
        ))),
    }
}

/// Refresh tokens live between one day and one year
fn parse_refresh_token_ttl_days(raw: &str) -> Result<i64, ConfigError> {
    match raw.trim().parse::<i64>() {
        Ok(days) if (1..=365).contains(&days) => Ok(days),
        _ => Err(ConfigError::InvalidValue(format!(
            "JWT_REFRESH_TOKEN_TTL_DAYS must be between 1 and 365, got '{}'",
            raw
        ))),
    }
}
