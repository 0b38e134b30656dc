//! PostgreSQL credential store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{StoreError, UserStore};
use crate::models::{NewUser, User, UserChanges, WorkflowState, WorkflowStatus};

const USER_COLUMNS: &str = "id, user_name, email, password_hash, created_at, refresh_token_hash, refresh_token_expires_at";

/// Credential store backed by the `users` and `workflow_states` tables
#[derive(Clone)]
pub struct PgUserStore {
    db_pool: PgPool,
}

impl PgUserStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(user)
    }

    async fn insert_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (user_name, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&new_user.user_name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(Utc::now())
        .fetch_one(&self.db_pool)
        .await?;

        Ok(user)
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<bool, StoreError> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE users
            SET user_name = $1, email = $2, password_hash = $3
            WHERE id = $4
            "#,
        )
        .bind(&changes.user_name)
        .bind(&changes.email)
        .bind(&changes.password_hash)
        .bind(id)
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn set_refresh_token(
        &self,
        id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE users
            SET refresh_token_hash = $1, refresh_token_expires_at = $2
            WHERE id = $3
            "#,
        )
        .bind(token_hash)
        .bind(expires_at)
        .bind(id)
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn find_by_refresh_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE refresh_token_hash = $1 AND refresh_token_expires_at > $2",
            USER_COLUMNS
        ))
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(user)
    }

    async fn append_workflow_state(
        &self,
        user_id: i64,
        state: WorkflowStatus,
    ) -> Result<WorkflowState, StoreError> {
        let entry = sqlx::query_as::<_, WorkflowState>(
            r#"
            INSERT INTO workflow_states (user_id, state, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, state, created_at
            "#,
        )
        .bind(user_id)
        .bind(state)
        .bind(Utc::now())
        .fetch_one(&self.db_pool)
        .await?;

        Ok(entry)
    }

    async fn workflow_states(&self, user_id: i64) -> Result<Vec<WorkflowState>, StoreError> {
        let entries = sqlx::query_as::<_, WorkflowState>(
            r#"
            SELECT id, user_id, state, created_at
            FROM workflow_states
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(entries)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.db_pool).await?;
        Ok(())
    }
}
