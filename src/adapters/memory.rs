//! In-memory adapters for embedding hosts and tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::errors::DomainError;
use crate::domain::models::{Checkpoint, GraphSnapshot};
use crate::domain::ports::{CheckpointStore, GraphSource};

/// Graph source backed by a map of per-session snapshots.
#[derive(Default)]
pub struct InMemoryGraphSource {
    snapshots: RwLock<HashMap<String, GraphSnapshot>>,
}

impl InMemoryGraphSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the snapshot the next `get_snapshot` for `session_id` returns.
    pub async fn put(&self, session_id: &str, snapshot: GraphSnapshot) {
        self.snapshots
            .write()
            .await
            .insert(session_id.to_string(), snapshot);
    }
}

#[async_trait]
impl GraphSource for InMemoryGraphSource {
    async fn get_snapshot(&self, session_id: &str) -> Result<GraphSnapshot> {
        self.snapshots
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| anyhow!(DomainError::SessionNotFound(session_id.to_string())))
    }
}

/// Checkpoint store backed by a map.
#[derive(Default)]
pub struct InMemoryCheckpointStore {
    checkpoints: RwLock<HashMap<String, Checkpoint>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.checkpoints.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.checkpoints.read().await.is_empty()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn save_checkpoint(&self, session_id: &str, checkpoint: &Checkpoint) -> Result<()> {
        self.checkpoints
            .write()
            .await
            .insert(session_id.to_string(), checkpoint.clone());
        Ok(())
    }

    async fn load_checkpoint(&self, session_id: &str) -> Result<Option<Checkpoint>> {
        Ok(self.checkpoints.read().await.get(session_id).cloned())
    }

    async fn delete_checkpoint(&self, session_id: &str) -> Result<()> {
        self.checkpoints.write().await.remove(session_id);
        Ok(())
    }

    async fn take_checkpoint(&self, session_id: &str) -> Result<Option<Checkpoint>> {
        Ok(self.checkpoints.write().await.remove(session_id))
    }
}
