//! Data models for the user registration service

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use validator::{Validate, ValidationError};

use crate::auth::MAX_PASSWORD_BYTES;

pub mod auth;
pub use auth::*;

/// User record as persisted by the credential store
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    /// SHA-256 hex digest of the current refresh token
    pub refresh_token_hash: Option<String>,
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
}

/// Values for a user row about to be inserted. The id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Replacement values for an existing user
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Registration lifecycle events recorded in the workflow log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "workflow_status")]
pub enum WorkflowStatus {
    Started,
    Completed,
}

/// One append-only entry of a user's registration log
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    pub id: i64,
    pub user_id: i64,
    pub state: WorkflowStatus,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// bcrypt ignores input past its limit, so longer passwords are refused
fn validate_password_bytes(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_BYTES {
        let mut err = ValidationError::new("password_too_long");
        err.message = Some("Password cannot be longer than 72 bytes".into());
        return Err(err);
    }
    Ok(())
}

/// Body of `POST /api/user`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "User name is required and cannot be longer than 100 characters"))]
    pub user_name: String,

    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default, alias = "passwordHash")]
    #[validate(
        length(min = 1, message = "Password is required"),
        custom = "validate_password_bytes"
    )]
    pub password: String,
}

/// Body of `PUT /api/user`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default, alias = "userId")]
    #[validate(required(message = "User id is required"))]
    pub id: Option<i64>,

    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "User name is required and cannot be longer than 100 characters"))]
    pub user_name: String,

    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default, alias = "passwordHash")]
    #[validate(
        length(min = 1, message = "Password is required"),
        custom = "validate_password_bytes"
    )]
    pub password: String,
}

/// User response (sanitized for API)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub user_name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name,
            email: user.email,
        }
    }
}

/// Standard success envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_request_accepts_password_hash_alias() {
        let request: CreateUserRequest = serde_json::from_str(
            r#"{"userName":"alice","email":"a@x.com","passwordHash":"secret"}"#,
        )
        .unwrap();
        assert_eq!(request.password, "secret");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_user_request_rejects_missing_fields() {
        let request: CreateUserRequest = serde_json::from_str(r#"{"email":"a@x.com"}"#).unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("user_name"));
        assert!(fields.contains_key("password"));
        assert!(!fields.contains_key("email"));
    }

    #[test]
    fn test_create_user_request_rejects_bad_email() {
        let request = CreateUserRequest {
            user_name: "alice".to_string(),
            email: "not-an-email".to_string(),
            password: "secret".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_password_longer_than_bcrypt_input_is_rejected() {
        let mut request = CreateUserRequest {
            user_name: "alice".to_string(),
            email: "a@x.com".to_string(),
            password: "x".repeat(MAX_PASSWORD_BYTES),
        };
        assert!(request.validate().is_ok());

        request.password.push('A');
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_update_user_request_requires_id() {
        let request: UpdateUserRequest = serde_json::from_str(
            r#"{"userName":"alice","email":"a@x.com","password":"secret"}"#,
        )
        .unwrap();
        assert!(request.validate().unwrap_err().field_errors().contains_key("id"));

        let request: UpdateUserRequest = serde_json::from_str(
            r#"{"userId":7,"userName":"alice","email":"a@x.com","password":"secret"}"#,
        )
        .unwrap();
        assert_eq!(request.id, Some(7));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_user_response_hides_credentials() {
        let user = User {
            id: 3,
            user_name: "alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "$2b$04$hash".to_string(),
            created_at: Utc::now(),
            refresh_token_hash: Some("digest".to_string()),
            refresh_token_expires_at: None,
        };
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 3, "userName": "alice", "email": "a@x.com"})
        );
    }

    #[test]
    fn test_workflow_status_serializes_as_name() {
        assert_eq!(
            serde_json::to_string(&WorkflowStatus::Started).unwrap(),
            "\"Started\""
        );
    }
}
