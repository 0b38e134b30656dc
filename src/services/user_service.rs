//! User service facade
//!
//! The request/response operations offered to the transport layer. Every
//! operation is independent; no state is carried between calls except what
//! the store holds.

use std::sync::Arc;

use super::ServiceError;
use crate::auth::{AuthService, PasswordHasher, TokenIssuer, TokenPair};
use crate::config::{Config, NotificationPolicy};
use crate::models::{User, UserChanges, WorkflowState};
use crate::registration::{Notifier, RegistrationInput, RegistrationSequencer};
use crate::store::UserStore;

/// Replacement values for `update_user`. The password is plaintext and gets re-hashed.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub id: i64,
    pub user_name: String,
    pub email: String,
    pub password: String,
}

/// User management and authentication facade
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    sequencer: RegistrationSequencer,
    auth: AuthService,
}

impl UserService {
    pub fn new(
        store: Arc<dyn UserStore>,
        tokens: Arc<TokenIssuer>,
        notifier: Arc<dyn Notifier>,
        hasher: PasswordHasher,
        policy: NotificationPolicy,
        refresh_token_ttl_days: i64,
    ) -> Self {
        let sequencer = RegistrationSequencer::new(store.clone(), hasher, notifier, policy);
        let auth = AuthService::new(store.clone(), tokens, hasher, refresh_token_ttl_days);

        Self {
            store,
            hasher,
            sequencer,
            auth,
        }
    }

    /// Wire the service from loaded configuration
    pub fn from_config(
        config: &Config,
        store: Arc<dyn UserStore>,
        tokens: Arc<TokenIssuer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::new(
            store,
            tokens,
            notifier,
            PasswordHasher::new(config.bcrypt_cost),
            config.notification_policy,
            config.jwt_refresh_token_ttl_days,
        )
    }

    /// Get a user by id
    pub async fn get_user(&self, id: i64) -> Result<User, ServiceError> {
        tracing::info!(user_id = id, "Getting user");

        match self.store.find_user(id).await? {
            Some(user) => Ok(user),
            None => {
                tracing::warn!(user_id = id, "User not found");
                Err(ServiceError::NotFound(format!("No user found with ID {}", id)))
            }
        }
    }

    /// Register a new user through the registration sequence
    pub async fn insert_user(&self, input: RegistrationInput) -> Result<User, ServiceError> {
        tracing::info!(user_name = %input.user_name, "Inserting new user");

        let registration = self.sequencer.run(input).await?;
        tracing::info!(
            user_id = registration.user.id,
            stage = ?registration.stage,
            "User inserted successfully"
        );

        Ok(registration.user)
    }

    /// Replace a user's name, email and password. `Ok(false)` when the id is unknown.
    pub async fn update_user(&self, update: UserUpdate) -> Result<bool, ServiceError> {
        tracing::info!(user_id = update.id, "Updating user");

        let password_hash = self.hasher.hash(&update.password)?;

        let changes = UserChanges {
            user_name: update.user_name,
            email: update.email,
            password_hash,
        };

        let updated = self.store.update_user(update.id, changes).await?;
        if updated {
            tracing::info!(user_id = update.id, "User updated successfully");
        } else {
            tracing::warn!(user_id = update.id, "User not found for update");
        }

        Ok(updated)
    }

    /// Exchange id and password for a token pair
    pub async fn login(&self, user_id: i64, password: &str) -> Result<TokenPair, ServiceError> {
        Ok(self.auth.login(user_id, password).await?)
    }

    /// Exchange a refresh token for a new pair
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ServiceError> {
        Ok(self.auth.refresh(refresh_token).await?)
    }

    /// Registration log of a user, oldest first
    pub async fn workflow_history(&self, user_id: i64) -> Result<Vec<WorkflowState>, ServiceError> {
        // distinguish "unknown user" from "no entries"
        self.get_user(user_id).await?;
        Ok(self.store.workflow_states(user_id).await?)
    }

    /// Whether the store answers
    pub async fn store_healthy(&self) -> bool {
        self.store.ping().await.is_ok()
    }
}
