//! Centralized API error handling
//!
//! A unified error type for API responses with HTTP status code mapping and
//! JSON error bodies of the form
//! `{"success": false, "error": {"code", "message", "details"}}`.
//! Authentication failures use the shorter `{"message"}` body.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::services::ServiceError;

/// API error type with HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("User not found")]
    UserNotFound(String),

    #[error("Validation failed")]
    ValidationError(String),

    #[error("User already exists")]
    UserAlreadyExists(String),

    #[error("Failed to update user")]
    UpdateFailed(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Internal server error")]
    InternalError(String),

    #[error("Database error")]
    DatabaseError(String),

    #[error("Server misconfigured")]
    ConfigurationError(String),

    #[error("External service error")]
    ExternalServiceError(String),

    #[error("Service unavailable")]
    ServiceUnavailable(String),
}

/// JSON error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

/// Error details in the response
#[derive(Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::UserNotFound(_) => "USER_NOT_FOUND",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::UserAlreadyExists(_) => "USER_ALREADY_EXISTS",
            ApiError::UpdateFailed(_) => "UPDATE_FAILED",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::InternalError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::ConfigurationError(_) => "CONFIGURATION_ERROR",
            ApiError::ExternalServiceError(_) => "EXTERNAL_SERVICE_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UserNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::UserAlreadyExists(_) => StatusCode::BAD_REQUEST,
            ApiError::UpdateFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ExternalServiceError(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Client-facing detail text. Server-side causes stay in the log.
    fn details(&self) -> Option<String> {
        match self {
            ApiError::UserNotFound(d)
            | ApiError::ValidationError(d)
            | ApiError::UserAlreadyExists(d)
            | ApiError::UpdateFailed(d) => Some(d.clone()),
            _ => None,
        }
    }

    fn cause(&self) -> &str {
        match self {
            ApiError::UserNotFound(c)
            | ApiError::ValidationError(c)
            | ApiError::UserAlreadyExists(c)
            | ApiError::UpdateFailed(c)
            | ApiError::Unauthorized(c)
            | ApiError::InternalError(c)
            | ApiError::DatabaseError(c)
            | ApiError::ConfigurationError(c)
            | ApiError::ExternalServiceError(c)
            | ApiError::ServiceUnavailable(c) => c,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(error = %self.cause(), code = %error_code, "Server error occurred");
        } else {
            tracing::debug!(error = %self.cause(), code = %error_code, "Client error occurred");
        }

        if let ApiError::Unauthorized(_) = self {
            return (status, Json(json!({ "message": message }))).into_response();
        }

        let body = ErrorResponse {
            success: false,
            error: ErrorDetails {
                code: error_code.to_string(),
                message,
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => ApiError::ValidationError(msg),
            ServiceError::NotFound(msg) => ApiError::UserNotFound(msg),
            ServiceError::AlreadyExists(msg) => ApiError::UserAlreadyExists(msg),
            ServiceError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            ServiceError::Configuration(msg) => ApiError::ConfigurationError(msg),
            ServiceError::Store(msg) => ApiError::DatabaseError(msg),
            ServiceError::Notification(msg) => ApiError::ExternalServiceError(msg),
            ServiceError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::ValidationError(rejection.body_text())
    }
}

/// Result type alias using ApiError
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ApiError::UserNotFound("test".to_string()).error_code(),
            "USER_NOT_FOUND"
        );
        assert_eq!(
            ApiError::UserAlreadyExists("test".to_string()).error_code(),
            "USER_ALREADY_EXISTS"
        );
        assert_eq!(
            ApiError::UpdateFailed("test".to_string()).error_code(),
            "UPDATE_FAILED"
        );
        assert_eq!(
            ApiError::ValidationError("test".to_string()).error_code(),
            "VALIDATION_ERROR"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::UserNotFound("test".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::UserAlreadyExists("test".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("test".to_string()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::ConfigurationError("test".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let (status, body) =
            body_json(ApiError::UserNotFound("No user found with ID 7".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "USER_NOT_FOUND");
        assert_eq!(body["error"]["message"], "User not found");
        assert_eq!(body["error"]["details"], "No user found with ID 7");
    }

    #[tokio::test]
    async fn test_unauthorized_body_is_message_only() {
        let (status, body) = body_json(ApiError::Unauthorized("Invalid credentials".to_string())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "message": "Invalid credentials" }));
    }

    #[tokio::test]
    async fn test_server_error_hides_cause() {
        let (_, body) = body_json(ApiError::DatabaseError("password auth failed".to_string())).await;
        assert_eq!(body["error"]["code"], "DATABASE_ERROR");
        assert!(body["error"].get("details").is_none());
    }

    #[test]
    fn test_service_error_mapping() {
        let err: ApiError = ServiceError::AlreadyExists("email".to_string()).into();
        assert!(matches!(err, ApiError::UserAlreadyExists(_)));

        let err: ApiError = ServiceError::Configuration("no key".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
