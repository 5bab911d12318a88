//! Checkpoint store port (trait) for dependency injection.
//!
//! Storage is owned by the caller; the navigator only hands over the
//! checkpoint payload produced on PAUSE_SESSION.

use crate::domain::models::Checkpoint;
use anyhow::Result;
use async_trait::async_trait;

/// Repository trait for checkpoint persistence
///
/// At most one checkpoint is held per session id; saving replaces it.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Store the checkpoint for a session, replacing any previous one
    ///
    /// # Errors
    /// Returns error if serialization or the backing store fails
    async fn save_checkpoint(&self, session_id: &str, checkpoint: &Checkpoint) -> Result<()>;

    /// Read the checkpoint for a session without consuming it
    ///
    /// # Returns
    /// - `Some(Checkpoint)` if one is stored
    /// - `None` otherwise
    async fn load_checkpoint(&self, session_id: &str) -> Result<Option<Checkpoint>>;

    /// Remove the checkpoint for a session
    async fn delete_checkpoint(&self, session_id: &str) -> Result<()>;

    /// Load and remove in one step so a checkpoint seeds exactly one session
    async fn take_checkpoint(&self, session_id: &str) -> Result<Option<Checkpoint>> {
        let checkpoint = self.load_checkpoint(session_id).await?;
        if checkpoint.is_some() {
            self.delete_checkpoint(session_id).await?;
        }
        Ok(checkpoint)
    }
}
