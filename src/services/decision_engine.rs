//! Per-turn orchestration.
//!
//! `decide` is total: any input, however damaged, yields a schema-valid
//! [`Instruction`]. Degradations are reported as [`EngineWarning`]s next to
//! it instead of as errors.

use tracing::{debug, info, instrument, warn};

use super::checkpoint_manager::CheckpointManager;
use super::conflict_detector::ConflictDetector;
use super::coverage_evaluator::CoverageEvaluator;
use super::instruction_assembler::{opening_cue, InstructionAssembler};
use super::policy_evaluator::PolicyEvaluator;
use super::strategy_selector::{bridge_for, StrategySelection, StrategySelector};
use super::tone_selector::ToneSelector;
use super::user_state_assessor::UserStateAssessor;
use crate::domain::errors::ConfigError;
use crate::domain::models::{
    CoverageMetrics, DebugSnapshot, DecisionContext, DecisionOutcome, DraftInstruction,
    EngineWarning, NavigatorConfig, NavigatorSession, PrimaryAction, StateSign, TurnInput,
    TurnMeta, UserState,
};

/// Stateless decision engine. Session state lives in [`NavigatorSession`].
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    config: NavigatorConfig,
    coverage: CoverageEvaluator,
    user_state: UserStateAssessor,
    conflicts: ConflictDetector,
    policy: PolicyEvaluator,
    strategy: StrategySelector,
}

impl DecisionEngine {
    /// Build an engine, refusing configurations the rule or tone tables
    /// cannot honour.
    pub fn new(config: NavigatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        PolicyEvaluator::validate_table()?;
        ToneSelector::validate_table()?;

        Ok(Self {
            coverage: CoverageEvaluator::new(config.coverage.weights.clone()),
            user_state: UserStateAssessor::new(config.user_state.smoothing_half_life_turns),
            conflicts: ConflictDetector::new(config.conflict.temporal_tolerance_years),
            policy: PolicyEvaluator::new(config.policy.clone()),
            strategy: StrategySelector::new(config.strategy.high_mention_threshold),
            config,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Decide the next instruction for one turn.
    ///
    /// The session is only read; apply the outcome with
    /// [`NavigatorSession::record`].
    #[instrument(skip(self, input, session), fields(session = session.session_id(), turn = input.meta.turn_number))]
    pub fn decide(&self, input: &TurnInput, session: &NavigatorSession) -> DecisionOutcome {
        let snapshot = &input.snapshot;
        let mut warnings = Vec::new();

        let issues = snapshot.validate();
        if issues.iter().any(|i| i.is_malformed()) {
            let warnings: Vec<EngineWarning> = issues
                .iter()
                .filter(|i| i.is_malformed())
                .map(|i| EngineWarning::MalformedSnapshot(i.to_string()))
                .collect();
            return self.fallback(&input.meta, warnings);
        }
        warnings.extend(
            issues
                .iter()
                .map(|i| EngineWarning::SnapshotIssue(i.to_string())),
        );

        let (focus, seed_warnings) = CheckpointManager::seed_focus(session, snapshot);
        warnings.extend(seed_warnings);
        let active = focus.as_deref().and_then(|id| snapshot.node(id));
        let depth = active.map_or(0, |n| session.depth_of(&n.id));

        let (coverage, coverage_warnings) = match &input.coverage {
            Some(metrics) => self.coverage.normalize(metrics.clone(), depth),
            None => self.coverage.evaluate(snapshot, depth),
        };
        warnings.extend(coverage_warnings);

        let (user_state, state_warnings) = self
            .user_state
            .assess(input.user_signal.as_ref(), session.smoothed_state());
        warnings.extend(state_warnings);

        let (conflict, conflict_warnings) = self.conflicts.detect(&input.facts, snapshot);
        warnings.extend(conflict_warnings);

        let ctx = DecisionContext {
            snapshot,
            session,
            active,
            coverage,
            user_state,
            conflict,
            flags: input.flags,
            turn_number: input.meta.turn_number,
            saturation: self.config.policy.saturation_threshold,
        };

        let decision = self.policy.evaluate(&ctx);
        let sign = StateSign::of(&ctx.user_state, self.config.policy.pause_energy_floor);

        let selection = match decision.action {
            PrimaryAction::Clarify => StrategySelection {
                strategy: None,
                target_node: ctx.conflict.as_ref().map(|c| c.node_id.clone()),
            },
            PrimaryAction::Summarize => StrategySelection {
                strategy: None,
                target_node: ctx
                    .active_id()
                    .and_then(|id| snapshot.containing_chapter(id))
                    .map(|ch| ch.id.clone()),
            },
            action => self.strategy.select(&ctx, action, decision.goal),
        };
        let bridge = bridge_for(&ctx, decision.action, decision.goal, &selection);

        let entities = selection
            .target_node
            .as_deref()
            .and_then(|id| snapshot.node(id))
            .map(InstructionAssembler::entities_for)
            .unwrap_or_default();

        let checkpoint = (decision.action == PrimaryAction::PauseSession)
            .then(|| CheckpointManager::capture(&ctx, &self.strategy));
        let final_state = (decision.action == PrimaryAction::CloseInterview)
            .then(|| InstructionAssembler::final_state(&ctx, &self.config.policy));

        let mut trace = decision.trace;
        if let Some(choice) = &selection.strategy {
            trace.push(format!(
                "strategy: {} (priority {})",
                choice.strategy_type.as_str(),
                choice.priority
            ));
        }

        let draft = DraftInstruction {
            action: decision.action,
            goal: decision.goal,
            focus_dimension: decision.focus_dimension,
            tone: ToneSelector::select(decision.action, decision.goal, sign),
            strategy: selection.strategy,
            target_node: selection.target_node,
            bridge,
            entities,
            suggested_opening: Some(opening_cue(decision.action, decision.goal)),
            checkpoint,
            final_state,
            trace,
        };

        let debug_snapshot = input.meta.debug.then(|| DebugSnapshot {
            current_focus: ctx.active_id().map(str::to_string),
            coverage_metrics: ctx.coverage.clone(),
            user_state: ctx.user_state,
            decision_trace: String::new(),
        });

        let (instruction, assembly_warnings) =
            InstructionAssembler::assemble(draft, snapshot, &input.meta, sign, debug_snapshot);
        warnings.extend(assembly_warnings);

        for warning in &warnings {
            warn!(%warning, "degraded input");
        }
        info!(
            action = %instruction.action.primary_action,
            goal = %instruction.action.tactical_goal.goal_type,
            target = ?instruction.action.target_node,
            "instruction emitted"
        );

        DecisionOutcome {
            active_node: ctx.active_id().map(str::to_string),
            active_exhausted: ctx.active_exhausted(),
            coverage: ctx.coverage,
            user_state: ctx.user_state,
            instruction,
            warnings,
            safe_default: false,
        }
    }

    /// Decide from a JSON-encoded [`TurnInput`].
    ///
    /// Unparsable input yields the safe default instruction.
    pub fn decide_json(&self, json: &str, session: &NavigatorSession) -> DecisionOutcome {
        match serde_json::from_str::<TurnInput>(json) {
            Ok(input) => self.decide(&input, session),
            Err(e) => {
                let meta = TurnMeta {
                    turn_number: session.turns_taken() + 1,
                    ..TurnMeta::default()
                };
                self.fallback(&meta, vec![EngineWarning::UnparsableInput(e.to_string())])
            }
        }
    }

    fn fallback(&self, meta: &TurnMeta, warnings: Vec<EngineWarning>) -> DecisionOutcome {
        for warning in &warnings {
            warn!(%warning, "falling back to safe default");
        }
        debug!(turn = meta.turn_number, "safe default emitted");
        DecisionOutcome {
            instruction: InstructionAssembler::safe_default(meta),
            warnings,
            coverage: CoverageMetrics::zero(),
            user_state: UserState::default(),
            active_node: None,
            active_exhausted: false,
            safe_default: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        GoalType, GraphSnapshot, Node, NodeType, SessionFlags, UserStateSignal,
    };

    fn engine() -> DecisionEngine {
        DecisionEngine::new(NavigatorConfig::default()).unwrap()
    }

    fn snapshot() -> GraphSnapshot {
        let mut ev = Node::new("ev", NodeType::KeyEvent, "First job");
        ev.slot_fill_map.insert("time".to_string(), true);
        GraphSnapshot {
            nodes: vec![ev],
            edges: vec![],
            current_focus: Some("ev".to_string()),
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = NavigatorConfig::default();
        config.policy.saturation_threshold = 1.5;
        assert!(DecisionEngine::new(config).is_err());
    }

    #[test]
    fn test_malformed_snapshot_gets_safe_default() {
        let mut snap = snapshot();
        snap.nodes.push(Node::new("ev", NodeType::KeyEvent, "dup"));
        let outcome = engine().decide(&TurnInput::new(snap, 1), &NavigatorSession::new("s"));
        assert_eq!(outcome.instruction.action.primary_action, PrimaryAction::DeepDive);
        assert_eq!(
            outcome.instruction.action.tactical_goal.goal_type,
            GoalType::ExtractDetails
        );
        assert!(matches!(outcome.warnings[0], EngineWarning::MalformedSnapshot(_)));
    }

    #[test]
    fn test_unparsable_json_gets_safe_default() {
        let outcome = engine().decide_json("{not json", &NavigatorSession::new("s"));
        assert_eq!(outcome.instruction.action.primary_action, PrimaryAction::DeepDive);
        assert_eq!(outcome.instruction.meta.turn_number, 1);
        assert!(matches!(outcome.warnings[0], EngineWarning::UnparsableInput(_)));
    }

    #[test]
    fn test_safe_default_turn_leaves_session_baselines_alone() {
        let engine = engine();
        let mut session = NavigatorSession::new("s");
        let snap = snapshot();

        let bad = engine.decide_json("{not json", &session);
        assert!(bad.safe_default);
        session.record(&bad, &snap);
        assert_eq!(session.turns_taken(), 1);
        assert_eq!(session.coverage_at_start(), None);
        assert_eq!(session.smoothed_state(), None);
        assert_eq!(session.last_focus(), None);

        let input = TurnInput::new(snap.clone(), 2).with_signal(UserStateSignal::new(0.8, 0.9));
        let good = engine.decide(&input, &session);
        assert!(!good.safe_default);
        session.record(&good, &snap);
        assert_eq!(session.coverage_at_start(), Some(good.coverage.overall_coverage));
        assert_eq!(session.smoothed_state(), Some(good.user_state));
    }

    #[test]
    fn test_farewell_pauses_with_checkpoint() {
        let input = TurnInput::new(snapshot(), 4).with_flags(SessionFlags {
            farewell_detected: true,
            ..SessionFlags::default()
        });
        let outcome = engine().decide(&input, &NavigatorSession::new("s"));
        assert_eq!(outcome.instruction.action.primary_action, PrimaryAction::PauseSession);
        let checkpoint = outcome.instruction.checkpoint.unwrap();
        assert_eq!(checkpoint.last_discussed_node.as_deref(), Some("ev"));
    }

    #[test]
    fn test_debug_snapshot_carries_trace() {
        let mut input = TurnInput::new(snapshot(), 2)
            .with_signal(UserStateSignal::new(0.8, 0.9));
        input.meta.debug = true;
        let outcome = engine().decide(&input, &NavigatorSession::new("s"));
        let debug = outcome.instruction.debug_snapshot.unwrap();
        assert_eq!(debug.current_focus.as_deref(), Some("ev"));
        assert!(debug.decision_trace.contains("CLOSE_INTERVIEW: no match"));
    }
}
