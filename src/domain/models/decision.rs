//! Per-turn decision types.
//!
//! [`TurnInput`] is what the caller hands in, [`DecisionContext`] is the fused
//! internal view the rules read, and [`DecisionOutcome`] is what comes back.
//! The context never crosses the output boundary; only the
//! [`DebugSnapshot`](super::instruction::DebugSnapshot) projection of it does.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::checkpoint::Checkpoint;
use super::coverage::{CoverageMetrics, Dimension};
use super::graph::{GraphSnapshot, Node, NodeStatus};
use super::instruction::{
    BridgeType, Entity, FinalState, GoalType, Instruction, PrimaryAction, StrategyChoice,
    ToneConstraint,
};
use super::session::{NavigatorSession, SessionFlags, TurnMeta};
use super::user_state::{UserState, UserStateSignal};

/// A fact the extraction layer just asserted about a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssertedFact {
    /// "It happened between these years."
    Time {
        /// Node the claim is about.
        node_id: String,
        /// First year claimed.
        start_year: i32,
        /// Last year claimed.
        end_year: i32,
    },
    /// "It happened there."
    Place {
        /// Node the claim is about.
        node_id: String,
        /// Place claimed.
        place: String,
    },
    /// "This person was there."
    Person {
        /// Node the claim is about.
        node_id: String,
        /// Relationship node id or person label.
        person: String,
    },
}

impl AssertedFact {
    /// Node the claim is about.
    pub fn node_id(&self) -> &str {
        match self {
            Self::Time { node_id, .. } | Self::Place { node_id, .. } | Self::Person { node_id, .. } => {
                node_id
            }
        }
    }
}

/// How serious a detected conflict is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictSeverity {
    /// Ambiguous; worth confirming.
    Soft,
    /// Two claims cannot both be true.
    Hard,
}

/// A contradiction between a new claim and the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    /// Hard contradiction or soft ambiguity.
    pub severity: ConflictSeverity,
    /// Node the offending claim was about.
    pub node_id: String,
    /// Human-readable account of the contradiction.
    pub description: String,
}

/// Everything the caller supplies for one turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnInput {
    /// Current graph snapshot.
    pub snapshot: GraphSnapshot,

    /// Raw user-state signal; missing means neutral.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_signal: Option<UserStateSignal>,

    /// Precomputed coverage; derived from the snapshot when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<CoverageMetrics>,

    /// Facts asserted since the last turn.
    #[serde(default)]
    pub facts: Vec<AssertedFact>,

    /// Conversational signals.
    #[serde(default)]
    pub flags: SessionFlags,

    /// Turn metadata.
    pub meta: TurnMeta,
}

impl TurnInput {
    /// Input for `turn_number` over `snapshot`, everything else defaulted.
    pub fn new(snapshot: GraphSnapshot, turn_number: u32) -> Self {
        Self {
            snapshot,
            meta: TurnMeta {
                turn_number,
                ..TurnMeta::default()
            },
            ..Self::default()
        }
    }

    /// Attach a user-state signal.
    pub fn with_signal(mut self, signal: UserStateSignal) -> Self {
        self.user_signal = Some(signal);
        self
    }

    /// Attach precomputed coverage.
    pub fn with_coverage(mut self, coverage: CoverageMetrics) -> Self {
        self.coverage = Some(coverage);
        self
    }

    /// Attach session flags.
    pub fn with_flags(mut self, flags: SessionFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Attach asserted facts.
    pub fn with_facts(mut self, facts: Vec<AssertedFact>) -> Self {
        self.facts = facts;
        self
    }
}

/// Non-fatal degradation noticed while deciding.
///
/// Warnings travel back with the instruction and are logged; none of them
/// stop the engine from emitting a valid instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineWarning {
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("unparsable turn input: {0}")]
    UnparsableInput(String),

    #[error("snapshot issue: {0}")]
    SnapshotIssue(String),

    #[error("missing {field}, using default {default}")]
    MissingField { field: &'static str, default: String },

    #[error("{field} out of range, clamped")]
    OutOfRange { field: &'static str },

    #[error("invalid {field} value '{value}', replaced with {replacement}")]
    InvalidEnum {
        field: &'static str,
        value: String,
        replacement: &'static str,
    },

    #[error("goal {goal} does not belong to {action}, replaced with {replacement}")]
    GoalMismatch {
        action: PrimaryAction,
        goal: GoalType,
        replacement: GoalType,
    },

    #[error("target node '{0}' is not in the snapshot, switching breadth")]
    DanglingTarget(String),

    #[error("resume node '{0}' is not in the snapshot")]
    StaleResumeNode(String),

    #[error("fact refers to unknown node '{0}'")]
    UnknownFactNode(String),
}

/// Fused read-only view of one turn, discarded once the instruction is out.
#[derive(Debug, Clone)]
pub struct DecisionContext<'a> {
    /// Snapshot under decision.
    pub snapshot: &'a GraphSnapshot,
    /// Session ledger as of the previous turn.
    pub session: &'a NavigatorSession,
    /// Active node, if any.
    pub active: Option<&'a Node>,
    /// Metrics for this turn.
    pub coverage: CoverageMetrics,
    /// User state for this turn.
    pub user_state: UserState,
    /// First conflict found among the asserted facts.
    pub conflict: Option<ConflictReport>,
    /// Conversational signals.
    pub flags: SessionFlags,
    /// Turn being decided.
    pub turn_number: u32,
    /// Fill ratio at which a node counts as exhausted.
    pub saturation: f64,
}

impl DecisionContext<'_> {
    /// Active node id.
    pub fn active_id(&self) -> Option<&str> {
        self.active.map(|n| n.id.as_str())
    }

    /// Slot-fill ratio of the active node; 0 without one.
    pub fn active_fill(&self) -> f64 {
        self.active.map_or(0.0, Node::slot_fill_ratio)
    }

    /// Exploration status of any node in this session.
    pub fn status_of(&self, node: &Node) -> NodeStatus {
        NodeStatus::classify(
            node.slot_fill_ratio(),
            self.session.depth_of(&node.id),
            self.saturation,
        )
    }

    /// Whether every prerequisite of `node` is in the snapshot and exhausted.
    pub fn ready_to_explore(&self, node: &Node) -> bool {
        node.depends_on.iter().all(|dep| {
            self.snapshot
                .node(dep)
                .is_some_and(|d| self.status_of(d) == NodeStatus::Exhausted)
        })
    }

    /// Whether the active node is exhausted.
    pub fn active_exhausted(&self) -> bool {
        self.active
            .is_some_and(|n| self.status_of(n) == NodeStatus::Exhausted)
    }
}

/// Output of the policy evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDecision {
    /// Chosen action.
    pub action: PrimaryAction,
    /// Chosen goal.
    pub goal: GoalType,
    /// Dimension that drove the goal, if one did.
    pub focus_dimension: Option<Dimension>,
    /// Rule trace, one line per rule considered.
    pub trace: Vec<String>,
}

/// A fully typed decision ready for assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftInstruction {
    pub action: PrimaryAction,
    pub goal: GoalType,
    pub focus_dimension: Option<Dimension>,
    pub tone: ToneConstraint,
    pub strategy: Option<StrategyChoice>,
    pub target_node: Option<String>,
    pub bridge: BridgeType,
    pub entities: Vec<Entity>,
    pub suggested_opening: Option<String>,
    pub checkpoint: Option<Checkpoint>,
    pub final_state: Option<FinalState>,
    pub trace: Vec<String>,
}

/// A partially constructed decision with unchecked string enums.
///
/// Produced by hosts that override or hand-build a decision; the assembler
/// repairs every invalid member before it reaches the output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDecision {
    #[serde(default)]
    pub primary_action: Option<String>,
    #[serde(default)]
    pub goal_type: Option<String>,
    #[serde(default)]
    pub primary_tone: Option<String>,
    #[serde(default)]
    pub secondary_tone: Option<String>,
    #[serde(default)]
    pub bridge_type: Option<String>,
    #[serde(default)]
    pub target_node: Option<String>,
}

/// Result of one `decide` call.
#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    /// The instruction for the generation layer.
    pub instruction: Instruction,
    /// Degradations noticed along the way.
    pub warnings: Vec<EngineWarning>,
    /// Metrics the decision used.
    pub coverage: CoverageMetrics,
    /// User state the decision used (post-smoothing).
    pub user_state: UserState,
    /// Active node the decision was made from.
    pub active_node: Option<String>,
    /// Whether that node was exhausted.
    pub active_exhausted: bool,
    /// Set when the instruction is the safe default; the metrics above are
    /// placeholders and must not be folded into session state.
    pub safe_default: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_tagged_json() {
        let fact: AssertedFact = serde_json::from_str(
            r#"{"kind": "time", "node_id": "ev1", "start_year": 1970, "end_year": 1972}"#,
        )
        .unwrap();
        assert_eq!(fact.node_id(), "ev1");
        assert!(matches!(fact, AssertedFact::Time { start_year: 1970, .. }));
    }

    #[test]
    fn test_turn_input_defaults() {
        let input: TurnInput =
            serde_json::from_str(r#"{"snapshot": {}, "meta": {"turn_number": 2}}"#).unwrap();
        assert!(input.user_signal.is_none());
        assert!(input.facts.is_empty());
        assert_eq!(input.meta.turn_number, 2);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ConflictSeverity::Hard > ConflictSeverity::Soft);
    }

    #[test]
    fn test_warning_messages() {
        let warning = EngineWarning::DanglingTarget("ghost".to_string());
        assert!(warning.to_string().contains("ghost"));
    }
}
