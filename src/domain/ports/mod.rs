//! Port trait definitions (Hexagonal Architecture)
//!
//! The collaborators the navigator talks to across I/O boundaries:
//! - GraphSource: the graph builder's `getSnapshot`
//! - CheckpointStore: storage for pause/resume checkpoints
//!
//! The decision core itself never calls these; the session service does.

pub mod checkpoint_store;
pub mod graph_source;

pub use checkpoint_store::CheckpointStore;
pub use graph_source::GraphSource;
