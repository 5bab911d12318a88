//! The structured instruction handed to the generation layer.
//!
//! An [`Instruction`] says what to do next, never what the current state is.
//! Raw coverage and user-state numbers only appear inside the optional
//! `checkpoint`, `final_state` and `_debug_snapshot` envelopes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::checkpoint::Checkpoint;
use super::coverage::{CoverageMetrics, Dimension};
use super::user_state::UserState;

/// Semantic version stamped on every instruction.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// The tactical move for this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrimaryAction {
    /// Stay on the active node and extract more.
    DeepDive,
    /// Move to a different node or topic.
    BreadthSwitch,
    /// Resolve a contradiction or ambiguity.
    Clarify,
    /// Review a finished chapter or synthesise a theme.
    Summarize,
    /// End today's session and leave a checkpoint.
    PauseSession,
    /// Close the whole interview.
    CloseInterview,
}

impl PrimaryAction {
    /// All actions, in rule precedence order (highest first).
    pub const ALL: [Self; 6] = [
        Self::CloseInterview,
        Self::Clarify,
        Self::PauseSession,
        Self::Summarize,
        Self::BreadthSwitch,
        Self::DeepDive,
    ];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeepDive => "DEEP_DIVE",
            Self::BreadthSwitch => "BREADTH_SWITCH",
            Self::Clarify => "CLARIFY",
            Self::Summarize => "SUMMARIZE",
            Self::PauseSession => "PAUSE_SESSION",
            Self::CloseInterview => "CLOSE_INTERVIEW",
        }
    }

    /// Parse a wire name, case-insensitively.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "DEEP_DIVE" => Some(Self::DeepDive),
            "BREADTH_SWITCH" => Some(Self::BreadthSwitch),
            "CLARIFY" => Some(Self::Clarify),
            "SUMMARIZE" => Some(Self::Summarize),
            "PAUSE_SESSION" => Some(Self::PauseSession),
            "CLOSE_INTERVIEW" => Some(Self::CloseInterview),
            _ => None,
        }
    }

    /// Goals this action may carry, preferred default first.
    pub fn goals(&self) -> &'static [GoalType] {
        match self {
            Self::DeepDive => &[
                GoalType::ExtractDetails,
                GoalType::ExtractEmotions,
                GoalType::ExtractReflections,
                GoalType::ExtractSensory,
                GoalType::ExtractCausality,
            ],
            Self::BreadthSwitch => &[
                GoalType::ExploreTheme,
                GoalType::ExplorePerson,
                GoalType::ExploreLocation,
                GoalType::ExplorePeriod,
            ],
            Self::Clarify => &[GoalType::ResolveConflict, GoalType::ConfirmUnderstanding],
            Self::Summarize => &[GoalType::ReviewPeriod, GoalType::SynthesizeTheme],
            Self::PauseSession => &[GoalType::SessionFarewell],
            Self::CloseInterview => &[GoalType::FinalClosure],
        }
    }

    /// The goal used when a decision carries none or an invalid one.
    pub fn default_goal(&self) -> GoalType {
        self.goals()[0]
    }
}

impl std::fmt::Display for PrimaryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the action is meant to achieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalType {
    /// Factual detail: when, where, who, outcome.
    ExtractDetails,
    /// How it felt.
    ExtractEmotions,
    /// What it means now.
    ExtractReflections,
    /// Sights, sounds, smells.
    ExtractSensory,
    /// Why it happened.
    ExtractCausality,
    /// Open a person thread.
    ExplorePerson,
    /// Open a place thread.
    ExploreLocation,
    /// Open a theme thread.
    ExploreTheme,
    /// Open a life-period thread.
    ExplorePeriod,
    /// Settle a hard contradiction.
    ResolveConflict,
    /// Check a soft ambiguity.
    ConfirmUnderstanding,
    /// Recap a finished chapter.
    ReviewPeriod,
    /// Draw a cross-chapter theme together.
    SynthesizeTheme,
    /// Say goodbye for today.
    SessionFarewell,
    /// Close the interview.
    FinalClosure,
}

impl GoalType {
    /// Every goal.
    pub const ALL: [Self; 15] = [
        Self::ExtractDetails,
        Self::ExtractEmotions,
        Self::ExtractReflections,
        Self::ExtractSensory,
        Self::ExtractCausality,
        Self::ExplorePerson,
        Self::ExploreLocation,
        Self::ExploreTheme,
        Self::ExplorePeriod,
        Self::ResolveConflict,
        Self::ConfirmUnderstanding,
        Self::ReviewPeriod,
        Self::SynthesizeTheme,
        Self::SessionFarewell,
        Self::FinalClosure,
    ];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtractDetails => "EXTRACT_DETAILS",
            Self::ExtractEmotions => "EXTRACT_EMOTIONS",
            Self::ExtractReflections => "EXTRACT_REFLECTIONS",
            Self::ExtractSensory => "EXTRACT_SENSORY",
            Self::ExtractCausality => "EXTRACT_CAUSALITY",
            Self::ExplorePerson => "EXPLORE_PERSON",
            Self::ExploreLocation => "EXPLORE_LOCATION",
            Self::ExploreTheme => "EXPLORE_THEME",
            Self::ExplorePeriod => "EXPLORE_PERIOD",
            Self::ResolveConflict => "RESOLVE_CONFLICT",
            Self::ConfirmUnderstanding => "CONFIRM_UNDERSTANDING",
            Self::ReviewPeriod => "REVIEW_PERIOD",
            Self::SynthesizeTheme => "SYNTHESIZE_THEME",
            Self::SessionFarewell => "SESSION_FAREWELL",
            Self::FinalClosure => "FINAL_CLOSURE",
        }
    }

    /// Parse a wire name, case-insensitively.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        let upper = s.trim().to_uppercase();
        Self::ALL.into_iter().find(|g| g.as_str() == upper)
    }

    /// The action family this goal belongs to.
    pub fn family(&self) -> PrimaryAction {
        match self {
            Self::ExtractDetails
            | Self::ExtractEmotions
            | Self::ExtractReflections
            | Self::ExtractSensory
            | Self::ExtractCausality => PrimaryAction::DeepDive,
            Self::ExplorePerson | Self::ExploreLocation | Self::ExploreTheme | Self::ExplorePeriod => {
                PrimaryAction::BreadthSwitch
            }
            Self::ResolveConflict | Self::ConfirmUnderstanding => PrimaryAction::Clarify,
            Self::ReviewPeriod | Self::SynthesizeTheme => PrimaryAction::Summarize,
            Self::SessionFarewell => PrimaryAction::PauseSession,
            Self::FinalClosure => PrimaryAction::CloseInterview,
        }
    }

    /// Whether this goal may accompany the given action.
    pub fn is_valid_for(&self, action: PrimaryAction) -> bool {
        self.family() == action
    }
}

impl std::fmt::Display for GoalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall register of the utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrimaryTone {
    /// Deep comfort for heavy material.
    EmpathicSupportive,
    /// Soft, friendly warmth.
    GentleWarm,
    /// Even and matter-of-fact. The conservative default.
    ProfessionalNeutral,
    /// Honouring and dignified.
    RespectfulReverent,
    /// Interested and open.
    CuriousInquiring,
    /// Upbeat and affirming.
    EncouragingWarm,
    /// Slow and thoughtful.
    ReflectiveContemplative,
}

impl PrimaryTone {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmpathicSupportive => "EMPATHIC_SUPPORTIVE",
            Self::GentleWarm => "GENTLE_WARM",
            Self::ProfessionalNeutral => "PROFESSIONAL_NEUTRAL",
            Self::RespectfulReverent => "RESPECTFUL_REVERENT",
            Self::CuriousInquiring => "CURIOUS_INQUIRING",
            Self::EncouragingWarm => "ENCOURAGING_WARM",
            Self::ReflectiveContemplative => "REFLECTIVE_CONTEMPLATIVE",
        }
    }

    /// Parse a wire name, case-insensitively.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "EMPATHIC_SUPPORTIVE" => Some(Self::EmpathicSupportive),
            "GENTLE_WARM" => Some(Self::GentleWarm),
            "PROFESSIONAL_NEUTRAL" => Some(Self::ProfessionalNeutral),
            "RESPECTFUL_REVERENT" => Some(Self::RespectfulReverent),
            "CURIOUS_INQUIRING" => Some(Self::CuriousInquiring),
            "ENCOURAGING_WARM" => Some(Self::EncouragingWarm),
            "REFLECTIVE_CONTEMPLATIVE" => Some(Self::ReflectiveContemplative),
            _ => None,
        }
    }
}

/// Colouring layered on top of the primary tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecondaryTone {
    /// Thankful.
    Grateful,
    /// Unhurried.
    Patient,
    /// Looking back fondly.
    Nostalgic,
    /// Confirming the interviewee's account.
    Affirming,
    /// Light touch.
    Playful,
}

impl SecondaryTone {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grateful => "GRATEFUL",
            Self::Patient => "PATIENT",
            Self::Nostalgic => "NOSTALGIC",
            Self::Affirming => "AFFIRMING",
            Self::Playful => "PLAYFUL",
        }
    }

    /// Parse a wire name, case-insensitively.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GRATEFUL" => Some(Self::Grateful),
            "PATIENT" => Some(Self::Patient),
            "NOSTALGIC" => Some(Self::Nostalgic),
            "AFFIRMING" => Some(Self::Affirming),
            "PLAYFUL" => Some(Self::Playful),
            _ => None,
        }
    }
}

/// Behavioural guard rail for the generation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToneGuard {
    /// Acknowledge the feeling before asking anything.
    ValidateFeelings,
    /// Leave room for pauses.
    AllowSilence,
    /// No evaluative language.
    NoJudgment,
    /// Do not suggest the answer.
    AvoidLeading,
    /// One short sentence.
    KeepBrief,
}

/// Tone tuple attached to an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneConstraint {
    /// Main register.
    pub primary_tone: PrimaryTone,

    /// Optional colouring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_tone: Option<SecondaryTone>,

    /// Guard rails.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<ToneGuard>,
}

impl ToneConstraint {
    /// The conservative fallback tone.
    pub fn conservative() -> Self {
        Self {
            primary_tone: PrimaryTone::ProfessionalNeutral,
            secondary_tone: None,
            constraints: vec![ToneGuard::NoJudgment],
        }
    }
}

/// Transitional framing between the previous and next topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BridgeType {
    /// No bridge. The conservative default.
    #[default]
    None,
    /// "Around the same time..."
    Temporal,
    /// "Because of that..."
    Causal,
    /// "Speaking of her..."
    Social,
    /// "That sense of duty again..."
    Thematic,
    /// "Back in that town..."
    Spatial,
    /// "That same feeling..."
    Emotional,
}

impl BridgeType {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Temporal => "TEMPORAL",
            Self::Causal => "CAUSAL",
            Self::Social => "SOCIAL",
            Self::Thematic => "THEMATIC",
            Self::Spatial => "SPATIAL",
            Self::Emotional => "EMOTIONAL",
        }
    }

    /// Parse a wire name, case-insensitively.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "NONE" => Some(Self::None),
            "TEMPORAL" => Some(Self::Temporal),
            "CAUSAL" => Some(Self::Causal),
            "SOCIAL" => Some(Self::Social),
            "THEMATIC" => Some(Self::Thematic),
            "SPATIAL" => Some(Self::Spatial),
            "EMOTIONAL" => Some(Self::Emotional),
            _ => None,
        }
    }
}

/// Navigation strategy for DEEP_DIVE and BREADTH_SWITCH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyType {
    /// From an event to a person in it.
    EventToPerson,
    /// From a remembered object to the feeling attached.
    ObjectToEmotion,
    /// From a life period to one individual in it.
    EraToIndividual,
    /// Jump along a shared feeling or theme.
    AffectiveAssociation,
    /// Jump to a frequently mentioned person.
    SocialNetworkJump,
    /// Jump to another place.
    SpatialJump,
    /// Return to a node left unfinished earlier.
    TaskResume,
    /// Step back to a period overview.
    HistoricalSnapshot,
}

impl StrategyType {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EventToPerson => "EVENT_TO_PERSON",
            Self::ObjectToEmotion => "OBJECT_TO_EMOTION",
            Self::EraToIndividual => "ERA_TO_INDIVIDUAL",
            Self::AffectiveAssociation => "AFFECTIVE_ASSOCIATION",
            Self::SocialNetworkJump => "SOCIAL_NETWORK_JUMP",
            Self::SpatialJump => "SPATIAL_JUMP",
            Self::TaskResume => "TASK_RESUME",
            Self::HistoricalSnapshot => "HISTORICAL_SNAPSHOT",
        }
    }

    /// Whether this strategy belongs to the deep pool.
    pub fn is_deep(&self) -> bool {
        matches!(
            self,
            Self::EventToPerson | Self::ObjectToEmotion | Self::EraToIndividual
        )
    }
}

/// Kind of entity referenced in the context block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    /// A person.
    Person,
    /// A place.
    Location,
    /// An event.
    Event,
    /// A life period.
    Period,
    /// A theme.
    Theme,
    /// A remembered object.
    Object,
}

/// Tactical goal attached to the action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacticalGoal {
    /// Goal kind; restricted by the action family.
    pub goal_type: GoalType,

    /// Dimension the goal works on, when one drove the choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_dimension: Option<Dimension>,
}

/// Chosen navigation strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyChoice {
    /// Strategy kind.
    pub strategy_type: StrategyType,
    /// Priority tier, 1 (highest) to 3.
    pub priority: u8,
}

/// The `action` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionBlock {
    /// What to do.
    pub primary_action: PrimaryAction,

    /// Why.
    pub tactical_goal: TacticalGoal,

    /// How it should sound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone_constraint: Option<ToneConstraint>,

    /// Navigation strategy, for DEEP_DIVE and BREADTH_SWITCH.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyChoice>,

    /// Node to talk about.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_node: Option<String>,
}

/// Entity the generation layer may mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity kind.
    pub entity_type: EntityType,
    /// Display label.
    pub label: String,
    /// Graph node backing the entity, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

/// The `context` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextBlock {
    /// Framing from the previous topic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge_type: Option<BridgeType>,

    /// Entities in play.
    #[serde(default)]
    pub entities: Vec<Entity>,

    /// Opening cue key for the generation layer (not an utterance).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_opening: Option<String>,
}

/// The `meta` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionMeta {
    /// Schema version, `major.minor.patch`.
    pub version: String,
    /// Emission time.
    pub timestamp: DateTime<Utc>,
    /// Unique instruction id.
    pub instruction_id: Uuid,
    /// Turn this instruction answers.
    pub turn_number: u32,
}

impl InstructionMeta {
    /// Whether this instruction's version shares our major version.
    pub fn is_compatible(&self) -> bool {
        fn major(version: &str) -> Option<u64> {
            let mut parts = version.split('.');
            let major = parts.next()?.parse().ok()?;
            let rest: Vec<&str> = parts.collect();
            (rest.len() == 2 && rest.iter().all(|p| p.parse::<u64>().is_ok())).then_some(major)
        }
        matches!((major(&self.version), major(SCHEMA_VERSION)), (Some(a), Some(b)) if a == b)
    }
}

/// End-of-interview summary, only on CLOSE_INTERVIEW.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalState {
    /// Overall coverage reached.
    pub overall_coverage: f64,
    /// Themes with their supporting node counts, strongest first.
    pub theme_summary: Vec<String>,
    /// Labels of life chapters considered covered.
    pub life_chapters_covered: Vec<String>,
    /// Whether the interviewee should confirm nothing is missing.
    pub completeness_confirmation_needed: bool,
}

/// Read-only projection of the decision context for debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugSnapshot {
    /// Active node id.
    pub current_focus: Option<String>,
    /// Metrics used for the decision.
    pub coverage_metrics: CoverageMetrics,
    /// User state used for the decision.
    pub user_state: UserState,
    /// Rule-by-rule trace.
    pub decision_trace: String,
}

/// The sole externally visible output of the navigator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// Envelope metadata.
    pub meta: InstructionMeta,

    /// What to do.
    pub action: ActionBlock,

    /// Supporting context.
    #[serde(default)]
    pub context: ContextBlock,

    /// Resume data, only on PAUSE_SESSION.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<Checkpoint>,

    /// Closure data, only on CLOSE_INTERVIEW.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_state: Option<FinalState>,

    /// Decision context projection, only in debug mode.
    #[serde(
        rename = "_debug_snapshot",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub debug_snapshot: Option<DebugSnapshot>,
}

impl Instruction {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse an instruction as a consumer would.
    ///
    /// Unknown fields are tolerated; a missing `meta` or `action` is an error.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Instruction {
        Instruction {
            meta: InstructionMeta {
                version: SCHEMA_VERSION.to_string(),
                timestamp: Utc::now(),
                instruction_id: Uuid::new_v4(),
                turn_number: 3,
            },
            action: ActionBlock {
                primary_action: PrimaryAction::DeepDive,
                tactical_goal: TacticalGoal {
                    goal_type: GoalType::ExtractEmotions,
                    focus_dimension: None,
                },
                tone_constraint: Some(ToneConstraint::conservative()),
                strategy: None,
                target_node: Some("ev1".to_string()),
            },
            context: ContextBlock::default(),
            checkpoint: None,
            final_state: None,
            debug_snapshot: None,
        }
    }

    #[test]
    fn test_every_goal_has_exactly_one_family() {
        for goal in GoalType::ALL {
            let families: Vec<_> = PrimaryAction::ALL
                .iter()
                .filter(|a| a.goals().contains(&goal))
                .collect();
            assert_eq!(families, vec![&goal.family()], "{goal}");
        }
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_string(&PrimaryAction::BreadthSwitch).unwrap();
        assert_eq!(json, "\"BREADTH_SWITCH\"");
        assert_eq!(PrimaryAction::from_str("pause_session"), Some(PrimaryAction::PauseSession));
        assert_eq!(GoalType::from_str("EXPLORE_PERSON"), Some(GoalType::ExplorePerson));
        assert_eq!(GoalType::from_str("EXPLORE_MOON"), None);
        assert_eq!(BridgeType::from_str("spatial"), Some(BridgeType::Spatial));
        assert_eq!(PrimaryTone::from_str("LOUD"), None);
    }

    #[test]
    fn test_consumer_tolerates_unknown_fields() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["future_field"] = serde_json::json!({"anything": true});
        value["action"]["new_hint"] = serde_json::json!("x");
        let parsed = Instruction::from_json(&value.to_string()).unwrap();
        assert_eq!(parsed.action.primary_action, PrimaryAction::DeepDive);
    }

    #[test]
    fn test_consumer_rejects_missing_meta_or_action() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value.as_object_mut().unwrap().remove("meta");
        assert!(Instruction::from_json(&value.to_string()).is_err());

        let mut value = serde_json::to_value(sample()).unwrap();
        value.as_object_mut().unwrap().remove("action");
        assert!(Instruction::from_json(&value.to_string()).is_err());
    }

    #[test]
    fn test_version_compatibility() {
        let mut meta = sample().meta;
        assert!(meta.is_compatible());
        meta.version = "1.4.2".to_string();
        assert!(meta.is_compatible());
        meta.version = "2.0.0".to_string();
        assert!(!meta.is_compatible());
        meta.version = "one".to_string();
        assert!(!meta.is_compatible());
    }

    #[test]
    fn test_debug_snapshot_field_name() {
        let json = sample().to_json().unwrap();
        assert!(!json.contains("_debug_snapshot"));
    }
}
