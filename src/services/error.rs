//! Error taxonomy of the service facade

use thiserror::Error;

use crate::auth::{AuthError, PasswordError, TokenError};
use crate::registration::{RegistrationError, RegistrationFailure};
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(msg) => ServiceError::AlreadyExists(msg),
            other => ServiceError::Store(other.to_string()),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooLong => ServiceError::Validation(err.to_string()),
            PasswordError::HashingFailed(_) => ServiceError::Internal(err.to_string()),
        }
    }
}

impl From<RegistrationFailure> for ServiceError {
    fn from(failure: RegistrationFailure) -> Self {
        match failure.error {
            RegistrationError::Validation(msg) => ServiceError::Validation(msg),
            RegistrationError::Store(e) => e.into(),
            RegistrationError::Notification(e) => ServiceError::Notification(e.to_string()),
            RegistrationError::Hashing(e) => e.into(),
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                ServiceError::Unauthorized("Invalid credentials".to_string())
            }
            AuthError::InvalidRefreshToken | AuthError::RefreshTokenNotFound => {
                ServiceError::Unauthorized("Invalid refresh token".to_string())
            }
            AuthError::Token(TokenError::MissingSigningKey) => {
                ServiceError::Configuration(TokenError::MissingSigningKey.to_string())
            }
            AuthError::Token(e) => ServiceError::Internal(e.to_string()),
            AuthError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_long_password_is_validation() {
        let err: ServiceError = PasswordError::TooLong.into();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err: ServiceError = PasswordError::HashingFailed("rng".to_string()).into();
        assert!(matches!(err, ServiceError::Internal(_)));
    }

    #[test]
    fn test_unique_violation_is_already_exists() {
        let err: ServiceError = StoreError::UniqueViolation("email".to_string()).into();
        assert!(matches!(err, ServiceError::AlreadyExists(_)));

        let err: ServiceError = StoreError::Database("connection reset".to_string()).into();
        assert!(matches!(err, ServiceError::Store(_)));
    }

    #[test]
    fn test_auth_errors_collapse_to_unauthorized() {
        let err: ServiceError = AuthError::InvalidCredentials.into();
        assert_eq!(err.to_string(), "Invalid credentials");

        let err: ServiceError = AuthError::RefreshTokenNotFound.into();
        assert_eq!(err.to_string(), "Invalid refresh token");
    }

    #[test]
    fn test_missing_signing_key_is_configuration_error() {
        let err: ServiceError = AuthError::Token(TokenError::MissingSigningKey).into();
        assert!(matches!(err, ServiceError::Configuration(_)));
    }
}
