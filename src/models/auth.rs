//! Authentication request/response models

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Body of `POST /api/user/login`
///
/// Clients send the id as a JSON number or as a numeric string. Any other
/// shape is kept so it can fail as bad credentials instead of a bad request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default, alias = "id")]
    pub user_id: Option<Value>,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    /// The id as a number, if it was sent in a usable form
    pub fn parsed_user_id(&self) -> Option<i64> {
        match self.user_id.as_ref()? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Body of `POST /api/user/refresh`
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[serde(default)]
    pub refresh_token: String,
}

/// Tokens handed out by login and refresh
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokensResponse {
    pub token: String,
    pub refresh_token: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> LoginRequest {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_login_request_accepts_number_or_string_id() {
        assert_eq!(parse(r#"{"userId":7,"password":"p"}"#).parsed_user_id(), Some(7));
        assert_eq!(parse(r#"{"userId":"7","password":"p"}"#).parsed_user_id(), Some(7));
        assert_eq!(parse(r#"{"id":7,"password":"p"}"#).parsed_user_id(), Some(7));
    }

    #[test]
    fn test_login_request_unusable_id_still_decodes() {
        assert_eq!(parse(r#"{"password":"p"}"#).parsed_user_id(), None);
        assert_eq!(parse(r#"{"userId":"seven","password":"p"}"#).parsed_user_id(), None);
        assert_eq!(parse(r#"{"userId":1.5,"password":"p"}"#).parsed_user_id(), None);
        assert_eq!(parse(r#"{"userId":null,"password":"p"}"#).parsed_user_id(), None);
    }
}
