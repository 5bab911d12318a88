//! Narrative Navigator - dialogue navigation for biographical interviews
//!
//! Each turn, the navigator reads the life-history graph snapshot, the
//! interviewee's state and the session ledger, then emits one structured
//! [`Instruction`] telling the generation layer what to do next: dig deeper,
//! switch topic, clarify, summarize, pause or close. It never produces
//! dialogue text itself.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, ports and errors
//! - **Service Layer** (`services`): the decision pipeline and session service
//! - **Adapters** (`adapters`): in-memory and SQLite port implementations
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//!
//! # Example
//!
//! ```no_run
//! use narrative_navigator::{DecisionEngine, NavigatorConfig, NavigatorSession, TurnInput};
//! use narrative_navigator::domain::models::GraphSnapshot;
//!
//! # fn main() -> anyhow::Result<()> {
//! let engine = DecisionEngine::new(NavigatorConfig::default())?;
//! let mut session = NavigatorSession::new("grandma-li");
//! let input = TurnInput::new(GraphSnapshot::default(), 1);
//! let outcome = engine.decide(&input, &session);
//! session.record(&outcome, &input.snapshot);
//! println!("{}", outcome.instruction.to_json()?);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::models::{
    Checkpoint, DecisionOutcome, EngineWarning, GraphSnapshot, Instruction, NavigatorConfig,
    NavigatorSession, PrimaryAction, TurnInput,
};
pub use domain::ports::{CheckpointStore, GraphSource};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::logging::{LogConfig, LoggerImpl};
pub use services::{DecisionEngine, InterviewSessionService, TurnSignals};
