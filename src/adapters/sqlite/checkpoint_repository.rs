//! SQLite implementation of the CheckpointStore.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Checkpoint;
use crate::domain::ports::CheckpointStore;

#[derive(Clone)]
pub struct SqliteCheckpointRepository {
    pool: SqlitePool,
}

impl SqliteCheckpointRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Number of stored checkpoints.
    pub async fn count(&self) -> DomainResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM checkpoints")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CheckpointRow {
    payload: String,
}

fn row_to_checkpoint(row: CheckpointRow) -> DomainResult<Checkpoint> {
    Checkpoint::from_json(&row.payload).map_err(|e| DomainError::SerializationError(e.to_string()))
}

#[async_trait]
impl CheckpointStore for SqliteCheckpointRepository {
    async fn save_checkpoint(&self, session_id: &str, checkpoint: &Checkpoint) -> Result<()> {
        let payload = checkpoint.to_json().map_err(DomainError::from)?;

        sqlx::query(
            r#"INSERT INTO checkpoints
               (session_id, payload, last_discussed_node, next_resume_node, created_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(session_id) DO UPDATE SET
                   payload = excluded.payload,
                   last_discussed_node = excluded.last_discussed_node,
                   next_resume_node = excluded.next_resume_node,
                   created_at = excluded.created_at"#,
        )
        .bind(session_id)
        .bind(&payload)
        .bind(&checkpoint.last_discussed_node)
        .bind(&checkpoint.next_resume_node)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(DomainError::from)?;

        Ok(())
    }

    async fn load_checkpoint(&self, session_id: &str) -> Result<Option<Checkpoint>> {
        let row: Option<CheckpointRow> =
            sqlx::query_as("SELECT payload FROM checkpoints WHERE session_id = ?")
                .bind(session_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(DomainError::from)?;

        Ok(row.map(row_to_checkpoint).transpose()?)
    }

    async fn delete_checkpoint(&self, session_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM checkpoints WHERE session_id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(DomainError::from)?;
        Ok(())
    }

    async fn take_checkpoint(&self, session_id: &str) -> Result<Option<Checkpoint>> {
        let mut tx = self.pool.begin().await.map_err(DomainError::from)?;

        let row: Option<CheckpointRow> =
            sqlx::query_as("SELECT payload FROM checkpoints WHERE session_id = ?")
                .bind(session_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(DomainError::from)?;
        sqlx::query("DELETE FROM checkpoints WHERE session_id = ?")
            .bind(session_id)
            .execute(&mut *tx)
            .await
            .map_err(DomainError::from)?;

        tx.commit().await.map_err(DomainError::from)?;
        Ok(row.map(row_to_checkpoint).transpose()?)
    }
}
