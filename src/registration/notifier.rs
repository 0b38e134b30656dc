//! Confirmation senders used by the notify stage

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::models::User;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification request failed: {0}")]
    Transport(String),

    #[error("Notification endpoint answered with status {0}")]
    Rejected(u16),
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Transport(err.to_string())
    }
}

/// Sends the registration confirmation to a newly created user
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_confirmation(&self, user: &User) -> Result<(), NotifyError>;
}

/// Writes the confirmation to the log instead of delivering it
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_confirmation(&self, user: &User) -> Result<(), NotifyError> {
        tracing::info!(user_id = user.id, email = %user.email, "Confirmation email sent");
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmationPayload<'a> {
    user_id: i64,
    user_name: &'a str,
    email: &'a str,
}

/// Posts confirmation requests to an HTTP endpoint (mail relay, queue bridge, ...)
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send_confirmation(&self, user: &User) -> Result<(), NotifyError> {
        let payload = ConfirmationPayload {
            user_id: user.id,
            user_name: &user.user_name,
            email: &user.email,
        };

        let response = self.client.post(&self.url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %self.url, status = status.as_u16(), "Notification endpoint rejected request");
            return Err(NotifyError::Rejected(status.as_u16()));
        }

        tracing::info!(user_id = user.id, "Confirmation request delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user() -> User {
        User {
            id: 1,
            user_name: "alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "hash".to_string(),
            created_at: Utc::now(),
            refresh_token_hash: None,
            refresh_token_expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        assert!(LogNotifier.send_confirmation(&test_user()).await.is_ok());
    }

    #[tokio::test]
    async fn test_webhook_notifier_unreachable_endpoint() {
        // Port 9 (discard) on localhost is not expected to accept HTTP
        let notifier = WebhookNotifier::new("http://127.0.0.1:9/confirmations");
        let result = notifier.send_confirmation(&test_user()).await;
        assert!(matches!(result, Err(NotifyError::Transport(_))));
    }

    #[test]
    fn test_confirmation_payload_shape() {
        let user = test_user();
        let payload = ConfirmationPayload {
            user_id: user.id,
            user_name: &user.user_name,
            email: &user.email,
        };
        assert_eq!(
            serde_json::to_value(payload).unwrap(),
            serde_json::json!({"userId": 1, "userName": "alice", "email": "a@x.com"})
        );
    }
}
