pub mod checkpoint_manager;
pub mod conflict_detector;
pub mod coverage_evaluator;
pub mod decision_engine;
pub mod instruction_assembler;
pub mod interview_session_service;
pub mod policy_evaluator;
pub mod strategy_selector;
pub mod tone_selector;
pub mod user_state_assessor;

pub use checkpoint_manager::CheckpointManager;
pub use conflict_detector::ConflictDetector;
pub use coverage_evaluator::CoverageEvaluator;
pub use decision_engine::DecisionEngine;
pub use instruction_assembler::InstructionAssembler;
pub use interview_session_service::{InterviewSessionService, TurnSignals};
pub use policy_evaluator::{PolicyEvaluator, RULES};
pub use strategy_selector::{StrategySelection, StrategySelector};
pub use tone_selector::ToneSelector;
pub use user_state_assessor::UserStateAssessor;
