//! Credential store
//!
//! Persistence of user records, their current refresh token and the
//! registration workflow log. The store is the only state shared between
//! requests; it adds no locking of its own on top of what the backend offers.

mod memory;
mod postgres;

pub use memory::InMemoryUserStore;
pub use postgres::PgUserStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{NewUser, User, UserChanges, WorkflowState, WorkflowStatus};

/// Store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Referenced record does not exist: {0}")]
    MissingReference(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// SQLSTATE codes we classify
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    return StoreError::UniqueViolation(db_err.message().to_string())
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    return StoreError::MissingReference(db_err.message().to_string())
                }
                _ => {}
            }
        }
        StoreError::Database(err.to_string())
    }
}

/// Persistence operations needed by the registration and authentication flows
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch a user by id
    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// Insert a user; fails with `UniqueViolation` when the email is taken
    async fn insert_user(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Overwrite name, email and password hash. Returns false when no row has `id`.
    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<bool, StoreError>;

    /// Replace the user's refresh token digest and expiry. Returns false when no row has `id`.
    async fn set_refresh_token(
        &self,
        id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Find the user holding `token_hash` whose token expires after `now`
    async fn find_by_refresh_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError>;

    /// Append an entry to the user's workflow log
    async fn append_workflow_state(
        &self,
        user_id: i64,
        state: WorkflowStatus,
    ) -> Result<WorkflowState, StoreError>;

    /// The user's workflow log, oldest first
    async fn workflow_states(&self, user_id: i64) -> Result<Vec<WorkflowState>, StoreError>;

    /// Connectivity probe for health checks
    async fn ping(&self) -> Result<(), StoreError>;
}
