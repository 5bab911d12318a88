//! Domain models for the interview navigator.

pub mod checkpoint;
pub mod config;
pub mod coverage;
pub mod decision;
pub mod graph;
pub mod instruction;
pub mod session;
pub mod user_state;

pub use checkpoint::{Checkpoint, ResumeSeed};
pub use config::{
    ConflictConfig, CoverageConfig, DatabaseConfig, DimensionWeights, LoggingConfig,
    NavigatorConfig, PolicyConfig, StrategyConfig, UserStateConfig,
};
pub use coverage::{CoverageMetrics, Dimension, MAX_DEPTH};
pub use decision::{
    AssertedFact, ConflictReport, ConflictSeverity, DecisionContext, DecisionOutcome,
    DraftInstruction, EngineWarning, PolicyDecision, RawDecision, TurnInput,
};
pub use graph::{
    Edge, EdgeKind, GraphSnapshot, Node, NodeStatus, NodeType, SnapshotIssue, TemporalAnchor,
};
pub use instruction::{
    ActionBlock, BridgeType, ContextBlock, DebugSnapshot, Entity, EntityType, FinalState,
    GoalType, Instruction, InstructionMeta, PrimaryAction, PrimaryTone, SecondaryTone,
    StrategyChoice, StrategyType, TacticalGoal, ToneConstraint, ToneGuard, SCHEMA_VERSION,
};
pub use session::{NavigatorSession, SessionFlags, TouchedNode, TurnMeta};
pub use user_state::{StateSign, UserState, UserStateSignal};
