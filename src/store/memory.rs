//! In-memory credential store
//!
//! Mirrors the constraints of the relational schema (unique email, workflow
//! entries must reference an existing user) so the service behaves the same
//! with or without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::RwLock;

use super::{StoreError, UserStore};
use crate::models::{NewUser, User, UserChanges, WorkflowState, WorkflowStatus};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    workflow_states: Vec<WorkflowState>,
    next_user_id: i64,
    next_workflow_state_id: i64,
}

impl Tables {
    fn email_taken(&self, email: &str, except_id: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except_id)
    }
}

/// Credential store kept in process memory
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn insert_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.email_taken(&new_user.email, None) {
            return Err(StoreError::UniqueViolation(format!(
                "email '{}' already registered",
                new_user.email
            )));
        }

        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            user_name: new_user.user_name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: Utc::now(),
            refresh_token_hash: None,
            refresh_token_expires_at: None,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&id) {
            return Ok(false);
        }
        if tables.email_taken(&changes.email, Some(id)) {
            return Err(StoreError::UniqueViolation(format!(
                "email '{}' already registered",
                changes.email
            )));
        }

        if let Some(user) = tables.users.get_mut(&id) {
            user.user_name = changes.user_name;
            user.email = changes.email;
            user.password_hash = changes.password_hash;
        }

        Ok(true)
    }

    async fn set_refresh_token(
        &self,
        id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;

        match tables.users.get_mut(&id) {
            Some(user) => {
                user.refresh_token_hash = Some(token_hash.to_string());
                user.refresh_token_expires_at = Some(expires_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_by_refresh_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;

        let user = tables.users.values().find(|u| {
            u.refresh_token_hash.as_deref() == Some(token_hash)
                && u.refresh_token_expires_at.map_or(false, |exp| exp > now)
        });

        Ok(user.cloned())
    }

    async fn append_workflow_state(
        &self,
        user_id: i64,
        state: WorkflowStatus,
    ) -> Result<WorkflowState, StoreError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::MissingReference(format!(
                "user {} does not exist",
                user_id
            )));
        }

        tables.next_workflow_state_id += 1;
        let entry = WorkflowState {
            id: tables.next_workflow_state_id,
            user_id,
            state,
            created_at: Utc::now(),
        };
        tables.workflow_states.push(entry.clone());

        Ok(entry)
    }

    async fn workflow_states(&self, user_id: i64) -> Result<Vec<WorkflowState>, StoreError> {
        let tables = self.tables.read().await;

        Ok(tables
            .workflow_states
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
