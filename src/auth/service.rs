//! Authentication service
//!
//! Password login and refresh-token rotation. Each user holds at most one
//! refresh token; issuing a new one overwrites the previous one.

use chrono::{Duration, Utc};
use std::sync::Arc;
use thiserror::Error;

use super::jwt::{generate_refresh_token, hash_refresh_token, TokenError, TokenIssuer};
use super::password::PasswordHasher;
use crate::store::{StoreError, UserStore};

/// Auth service errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Refresh token not found")]
    RefreshTokenNotFound,

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Access/refresh token pair handed to a client
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    tokens: Arc<TokenIssuer>,
    hasher: PasswordHasher,
    refresh_token_ttl_days: i64,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        tokens: Arc<TokenIssuer>,
        hasher: PasswordHasher,
        refresh_token_ttl_days: i64,
    ) -> Self {
        Self {
            store,
            tokens,
            hasher,
            refresh_token_ttl_days,
        }
    }

    /// Check a user's password and issue a fresh token pair.
    ///
    /// Unknown users and wrong passwords fail identically.
    pub async fn login(&self, user_id: i64, password: &str) -> Result<TokenPair, AuthError> {
        let user = match self.store.find_user(user_id).await? {
            Some(user) if self.hasher.verify(password, &user.password_hash) => user,
            _ => {
                tracing::warn!(user_id, "Login rejected");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let pair = self.issue_pair(user.id).await?;
        tracing::info!(user_id = user.id, "Login successful");

        Ok(pair)
    }

    /// Exchange a refresh token for a new pair, invalidating the presented token
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let user_id = match self.validate_refresh_token(refresh_token).await {
            Ok(user_id) => user_id,
            Err(AuthError::RefreshTokenNotFound) => {
                tracing::warn!("Refresh rejected");
                return Err(AuthError::InvalidRefreshToken);
            }
            Err(e) => return Err(e),
        };

        let pair = self.issue_pair(user_id).await?;
        tracing::info!(user_id, "Tokens refreshed");

        Ok(pair)
    }

    /// Resolve a refresh token to its owner.
    ///
    /// Expired, replaced and never-issued tokens all yield `RefreshTokenNotFound`.
    pub async fn validate_refresh_token(&self, refresh_token: &str) -> Result<i64, AuthError> {
        if refresh_token.is_empty() {
            return Err(AuthError::RefreshTokenNotFound);
        }

        self.store
            .find_by_refresh_token(&hash_refresh_token(refresh_token), Utc::now())
            .await?
            .map(|user| user.id)
            .ok_or(AuthError::RefreshTokenNotFound)
    }

    /// Sign an access token, then replace the stored refresh token.
    /// Nothing is written when signing fails.
    async fn issue_pair(&self, user_id: i64) -> Result<TokenPair, AuthError> {
        let access_token = self.tokens.issue_access_token(user_id)?;
        let refresh_token = generate_refresh_token();
        let expires_at = Utc::now() + Duration::days(self.refresh_token_ttl_days);

        let saved = self
            .store
            .set_refresh_token(user_id, &hash_refresh_token(&refresh_token), expires_at)
            .await?;
        if !saved {
            // user vanished between lookup and write
            return Err(AuthError::InvalidCredentials);
        }

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    pub fn token_issuer(&self) -> &TokenIssuer {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::store::InMemoryUserStore;

    async fn setup(signing_key: Option<&str>) -> (AuthService, Arc<InMemoryUserStore>, i64) {
        let store = Arc::new(InMemoryUserStore::new());
        let hasher = PasswordHasher::new(4);
        let user = store
            .insert_user(NewUser {
                user_name: "alice".to_string(),
                email: "a@x.com".to_string(),
                password_hash: hasher.hash("secret").unwrap(),
            })
            .await
            .unwrap();

        let tokens = Arc::new(TokenIssuer::new(
            signing_key.map(str::to_string),
            "test-issuer",
            "test-audience",
            900,
        ));
        let service = AuthService::new(store.clone(), tokens, hasher, 7);

        (service, store, user.id)
    }

    #[tokio::test]
    async fn test_login_success() {
        let (service, store, user_id) = setup(Some("secret-key")).await;

        let pair = service.login(user_id, "secret").await.unwrap();
        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());

        let claims = service
            .token_issuer()
            .verify_access_token(&pair.access_token)
            .unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);

        // Only the digest is stored
        let stored = store.find_user(user_id).await.unwrap().unwrap();
        assert_eq!(
            stored.refresh_token_hash,
            Some(hash_refresh_token(&pair.refresh_token))
        );
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (service, _, user_id) = setup(Some("secret-key")).await;

        let wrong_password = service.login(user_id, "wrong").await.unwrap_err();
        let unknown_user = service.login(user_id + 100, "secret").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn test_login_without_signing_key() {
        let (service, store, user_id) = setup(None).await;

        let result = service.login(user_id, "secret").await;
        assert!(matches!(
            result,
            Err(AuthError::Token(TokenError::MissingSigningKey))
        ));

        // No refresh token was written
        let stored = store.find_user(user_id).await.unwrap().unwrap();
        assert!(stored.refresh_token_hash.is_none());
    }

    #[tokio::test]
    async fn test_refresh_rotates_token() {
        let (service, _, user_id) = setup(Some("secret-key")).await;
        let first = service.login(user_id, "secret").await.unwrap();

        let second = service.refresh(&first.refresh_token).await.unwrap();
        assert_ne!(second.refresh_token, first.refresh_token);

        // The old token is dead, the new one works
        assert!(matches!(
            service.refresh(&first.refresh_token).await,
            Err(AuthError::InvalidRefreshToken)
        ));
        assert!(service.refresh(&second.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_login_replaces_previous_refresh_token() {
        let (service, _, user_id) = setup(Some("secret-key")).await;
        let first = service.login(user_id, "secret").await.unwrap();
        let _second = service.login(user_id, "secret").await.unwrap();

        assert!(matches!(
            service.validate_refresh_token(&first.refresh_token).await,
            Err(AuthError::RefreshTokenNotFound)
        ));
    }

    #[tokio::test]
    async fn test_expired_refresh_token_not_found() {
        let (service, store, user_id) = setup(Some("secret-key")).await;
        let token = generate_refresh_token();
        store
            .set_refresh_token(
                user_id,
                &hash_refresh_token(&token),
                Utc::now() - Duration::minutes(1),
            )
            .await
            .unwrap();

        assert!(matches!(
            service.validate_refresh_token(&token).await,
            Err(AuthError::RefreshTokenNotFound)
        ));
    }

    #[tokio::test]
    async fn test_unknown_and_empty_refresh_tokens() {
        let (service, _, _) = setup(Some("secret-key")).await;

        assert!(matches!(
            service.validate_refresh_token("never-issued").await,
            Err(AuthError::RefreshTokenNotFound)
        ));
        assert!(matches!(
            service.refresh("").await,
            Err(AuthError::InvalidRefreshToken)
        ));
    }
}
