//! Graph source port (trait) for dependency injection.
//!
//! The graph builder owns the life-history graph; the navigator only ever
//! sees read-only snapshots of it.

use crate::domain::models::GraphSnapshot;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait GraphSource: Send + Sync {
    /// Current snapshot of the graph for a session
    ///
    /// # Errors
    /// Returns error if the graph builder cannot be reached or the session
    /// is unknown to it.
    async fn get_snapshot(&self, session_id: &str) -> Result<GraphSnapshot>;
}
