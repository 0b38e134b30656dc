//! Registration sequence
//!
//! Three stages run strictly in order: validate the input, create the user,
//! send the confirmation. The first failing stage ends the sequence. Nothing is
//! undone on failure: a user created before a failing notify stage stays in
//! the store.
//!
//! ```text
//! Pending -> Validated -> Created -> Notified
//!    \           \           \
//!     +-----------+-----------+--> Failed
//! ```

mod notifier;

pub use notifier::{LogNotifier, Notifier, NotifyError, WebhookNotifier};

use std::sync::Arc;
use thiserror::Error;

use crate::auth::{PasswordError, PasswordHasher};
use crate::config::NotificationPolicy;
use crate::models::{NewUser, User, WorkflowStatus};
use crate::store::{StoreError, UserStore};

/// Position of a registration in the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStage {
    Pending,
    Validated,
    Created,
    Notified,
    Failed,
}

impl RegistrationStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, RegistrationStage::Notified | RegistrationStage::Failed)
    }

    /// Legal single-step transitions
    pub fn can_advance_to(self, next: RegistrationStage) -> bool {
        use RegistrationStage::*;
        match (self, next) {
            (Pending, Validated) | (Validated, Created) | (Created, Notified) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Hashing(#[from] PasswordError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Notification(#[from] NotifyError),
}

/// Input of a registration
#[derive(Debug, Clone)]
pub struct RegistrationInput {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

/// Output of the validate stage
#[derive(Debug)]
struct ValidatedInput {
    user_name: String,
    email: String,
    password: String,
}

/// A registration that reached a successful end
#[derive(Debug)]
pub struct Registration {
    pub user: User,
    /// `Notified`, or `Created` when a best-effort confirmation could not be sent
    pub stage: RegistrationStage,
    pub history: Vec<RegistrationStage>,
    pub notification_error: Option<String>,
}

/// A registration that ended in `Failed`
#[derive(Error, Debug)]
#[error("registration failed after stage {reached:?}: {error}")]
pub struct RegistrationFailure {
    /// Last stage completed before the failure
    pub reached: RegistrationStage,
    /// The persisted user, when the failure happened after the create stage
    pub user: Option<User>,
    pub history: Vec<RegistrationStage>,
    #[source]
    pub error: RegistrationError,
}

/// Stage bookkeeping for one run
struct Progress {
    history: Vec<RegistrationStage>,
}

impl Progress {
    fn new() -> Self {
        Self {
            history: vec![RegistrationStage::Pending],
        }
    }

    fn current(&self) -> RegistrationStage {
        *self.history.last().unwrap_or(&RegistrationStage::Pending)
    }

    fn advance(&mut self, next: RegistrationStage) {
        debug_assert!(self.current().can_advance_to(next));
        self.history.push(next);
    }

    fn fail(mut self, user: Option<User>, error: RegistrationError) -> RegistrationFailure {
        let reached = self.current();
        self.advance(RegistrationStage::Failed);
        tracing::warn!(stage = ?reached, error = %error, "Registration failed");
        RegistrationFailure {
            reached,
            user,
            history: self.history,
            error,
        }
    }
}

/// Runs the validate → create → notify sequence
#[derive(Clone)]
pub struct RegistrationSequencer {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    notifier: Arc<dyn Notifier>,
    policy: NotificationPolicy,
}

impl RegistrationSequencer {
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        notifier: Arc<dyn Notifier>,
        policy: NotificationPolicy,
    ) -> Self {
        Self {
            store,
            hasher,
            notifier,
            policy,
        }
    }

    pub fn policy(&self) -> NotificationPolicy {
        self.policy
    }

    pub async fn run(&self, input: RegistrationInput) -> Result<Registration, RegistrationFailure> {
        let mut progress = Progress::new();

        let validated = match validate(input) {
            Ok(validated) => validated,
            Err(e) => return Err(progress.fail(None, e)),
        };
        progress.advance(RegistrationStage::Validated);

        let user = match self.create(validated).await {
            Ok(user) => user,
            Err((user, e)) => return Err(progress.fail(user, e)),
        };
        progress.advance(RegistrationStage::Created);

        match self.notifier.send_confirmation(&user).await {
            Ok(()) => {
                if let Err(e) = self
                    .store
                    .append_workflow_state(user.id, WorkflowStatus::Completed)
                    .await
                {
                    return Err(progress.fail(Some(user), e.into()));
                }
                progress.advance(RegistrationStage::Notified);
                tracing::info!(user_id = user.id, "Registration completed");

                Ok(Registration {
                    user,
                    stage: RegistrationStage::Notified,
                    history: progress.history,
                    notification_error: None,
                })
            }
            Err(e) => match self.policy {
                NotificationPolicy::Required => Err(progress.fail(Some(user), e.into())),
                NotificationPolicy::BestEffort => {
                    tracing::warn!(
                        user_id = user.id,
                        error = %e,
                        "Confirmation not sent, registration kept"
                    );
                    Ok(Registration {
                        user,
                        stage: progress.current(),
                        history: progress.history,
                        notification_error: Some(e.to_string()),
                    })
                }
            },
        }
    }

    /// Hash, insert and log `Started`. The user is returned alongside the
    /// error when the insert went through but the log entry did not.
    async fn create(
        &self,
        input: ValidatedInput,
    ) -> Result<User, (Option<User>, RegistrationError)> {
        let password_hash = match self.hasher.hash(&input.password) {
            Ok(hash) => hash,
            Err(e) => return Err((None, RegistrationError::from(e))),
        };

        let new_user = NewUser {
            user_name: input.user_name,
            email: input.email,
            password_hash,
        };
        let user = match self.store.insert_user(new_user).await {
            Ok(user) => user,
            Err(e) => return Err((None, RegistrationError::from(e))),
        };
        tracing::info!(user_id = user.id, "User created");

        if let Err(e) = self
            .store
            .append_workflow_state(user.id, WorkflowStatus::Started)
            .await
        {
            return Err((Some(user), RegistrationError::from(e)));
        }

        Ok(user)
    }
}

/// Presence check only; formats are checked when the request is decoded
fn validate(input: RegistrationInput) -> Result<ValidatedInput, RegistrationError> {
    if input.user_name.trim().is_empty() || input.email.trim().is_empty() {
        return Err(RegistrationError::Validation(
            "UserName and Email are required.".to_string(),
        ));
    }

    Ok(ValidatedInput {
        user_name: input.user_name,
        email: input.email,
        password: input.password,
    })
}
