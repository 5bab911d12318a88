//! Builds and validates the outgoing [`Instruction`].
//!
//! This is the only place a decision turns into output. Anything invalid in
//! the draft is repaired here, never passed through.

use chrono::Utc;
use uuid::Uuid;

use super::tone_selector::ToneSelector;
use crate::domain::models::{
    ActionBlock, BridgeType, Checkpoint, ContextBlock, DebugSnapshot, DecisionContext,
    DraftInstruction, EngineWarning, Entity, EntityType, FinalState, GoalType, GraphSnapshot,
    Instruction, InstructionMeta, Node, NodeType, PolicyConfig, PrimaryAction, PrimaryTone,
    RawDecision, SecondaryTone, StateSign, TacticalGoal, ToneConstraint, TurnMeta, SCHEMA_VERSION,
};

/// Composes instructions from drafts.
pub struct InstructionAssembler;

impl InstructionAssembler {
    /// Validate a draft and wrap it in the output envelope.
    ///
    /// `debug` is attached only when the caller asked for it in `meta`.
    pub fn assemble(
        mut draft: DraftInstruction,
        snapshot: &GraphSnapshot,
        meta: &TurnMeta,
        sign: StateSign,
        debug: Option<DebugSnapshot>,
    ) -> (Instruction, Vec<EngineWarning>) {
        let mut warnings = Vec::new();

        if !draft.goal.is_valid_for(draft.action) {
            let replacement = draft.action.default_goal();
            warnings.push(EngineWarning::GoalMismatch {
                action: draft.action,
                goal: draft.goal,
                replacement,
            });
            draft.goal = replacement;
            draft.focus_dimension = None;
            draft.tone = ToneSelector::select(draft.action, draft.goal, sign);
        }

        if let Some(target) = draft.target_node.clone() {
            if !snapshot.contains(&target) {
                warnings.push(EngineWarning::DanglingTarget(target.clone()));
                draft.target_node = None;
                draft.action = PrimaryAction::BreadthSwitch;
                draft.goal = GoalType::ExploreTheme;
                draft.focus_dimension = None;
                draft.strategy = None;
                draft.bridge = BridgeType::None;
                draft.tone = ToneSelector::select(draft.action, draft.goal, sign);
                draft.entities.retain(|e| e.node_id.as_deref() != Some(target.as_str()));
                draft.suggested_opening = Some(opening_cue(draft.action, draft.goal));
                draft.trace.push(format!("assembler: cleared dangling target '{target}'"));
            }
        }

        if !matches!(
            draft.action,
            PrimaryAction::DeepDive | PrimaryAction::BreadthSwitch
        ) {
            draft.strategy = None;
        }

        let checkpoint = match draft.action {
            PrimaryAction::PauseSession => Some(draft.checkpoint.take().unwrap_or_else(|| {
                warnings.push(EngineWarning::MissingField {
                    field: "checkpoint",
                    default: "empty checkpoint".to_string(),
                });
                Checkpoint {
                    last_discussed_node: None,
                    next_resume_node: None,
                    topics_covered_today: Vec::new(),
                    coverage_today: 0.0,
                    summary_today: String::new(),
                }
            })),
            _ => None,
        };

        let final_state = match draft.action {
            PrimaryAction::CloseInterview => Some(draft.final_state.take().unwrap_or_else(|| {
                warnings.push(EngineWarning::MissingField {
                    field: "final_state",
                    default: "confirmation needed".to_string(),
                });
                FinalState {
                    overall_coverage: 0.0,
                    theme_summary: Vec::new(),
                    life_chapters_covered: Vec::new(),
                    completeness_confirmation_needed: true,
                }
            })),
            _ => None,
        };

        let debug_snapshot = if meta.debug {
            debug.map(|mut d| {
                d.decision_trace = draft.trace.join("\n");
                d
            })
        } else {
            None
        };

        let instruction = Instruction {
            meta: InstructionMeta {
                version: SCHEMA_VERSION.to_string(),
                timestamp: meta.timestamp.unwrap_or_else(Utc::now),
                instruction_id: Uuid::new_v4(),
                turn_number: meta.turn_number,
            },
            action: ActionBlock {
                primary_action: draft.action,
                tactical_goal: TacticalGoal {
                    goal_type: draft.goal,
                    focus_dimension: draft.focus_dimension,
                },
                tone_constraint: Some(draft.tone),
                strategy: draft.strategy,
                target_node: draft.target_node,
            },
            context: ContextBlock {
                bridge_type: Some(draft.bridge),
                entities: draft.entities,
                suggested_opening: draft.suggested_opening,
            },
            checkpoint,
            final_state,
            debug_snapshot,
        };

        (instruction, warnings)
    }

    /// Repair a partially constructed decision into a typed draft.
    ///
    /// Invalid enum strings become the most conservative member of their set;
    /// missing ones fall back to the documented defaults.
    pub fn repair(raw: RawDecision, sign: StateSign) -> (DraftInstruction, Vec<EngineWarning>) {
        let mut warnings = Vec::new();

        let action = match raw.primary_action.as_deref() {
            None => {
                warnings.push(EngineWarning::MissingField {
                    field: "primary_action",
                    default: PrimaryAction::DeepDive.to_string(),
                });
                PrimaryAction::DeepDive
            }
            Some(s) => PrimaryAction::from_str(s).unwrap_or_else(|| {
                warnings.push(EngineWarning::InvalidEnum {
                    field: "primary_action",
                    value: s.to_string(),
                    replacement: "DEEP_DIVE",
                });
                PrimaryAction::DeepDive
            }),
        };

        let goal = match raw.goal_type.as_deref() {
            None => {
                warnings.push(EngineWarning::MissingField {
                    field: "goal_type",
                    default: action.default_goal().to_string(),
                });
                action.default_goal()
            }
            Some(s) => GoalType::from_str(s).unwrap_or_else(|| {
                warnings.push(EngineWarning::InvalidEnum {
                    field: "goal_type",
                    value: s.to_string(),
                    replacement: action.default_goal().as_str(),
                });
                action.default_goal()
            }),
        };

        let mut tone = ToneSelector::select(action, goal, sign);
        if let Some(s) = raw.primary_tone.as_deref() {
            match PrimaryTone::from_str(s) {
                Some(primary) => tone.primary_tone = primary,
                None => {
                    warnings.push(EngineWarning::InvalidEnum {
                        field: "primary_tone",
                        value: s.to_string(),
                        replacement: PrimaryTone::ProfessionalNeutral.as_str(),
                    });
                    tone = ToneConstraint::conservative();
                }
            }
        }
        if let Some(s) = raw.secondary_tone.as_deref() {
            match SecondaryTone::from_str(s) {
                Some(secondary) => tone.secondary_tone = Some(secondary),
                None => {
                    warnings.push(EngineWarning::InvalidEnum {
                        field: "secondary_tone",
                        value: s.to_string(),
                        replacement: "none",
                    });
                    tone.secondary_tone = None;
                }
            }
        }

        let bridge = match raw.bridge_type.as_deref() {
            None => BridgeType::None,
            Some(s) => BridgeType::from_str(s).unwrap_or_else(|| {
                warnings.push(EngineWarning::InvalidEnum {
                    field: "bridge_type",
                    value: s.to_string(),
                    replacement: BridgeType::None.as_str(),
                });
                BridgeType::None
            }),
        };

        let draft = DraftInstruction {
            action,
            goal,
            focus_dimension: None,
            tone,
            strategy: None,
            target_node: raw.target_node,
            bridge,
            entities: Vec::new(),
            suggested_opening: Some(opening_cue(action, goal)),
            checkpoint: None,
            final_state: None,
            trace: vec!["repaired from raw decision".to_string()],
        };
        (draft, warnings)
    }

    /// Repair and assemble in one step.
    pub fn assemble_raw(
        raw: RawDecision,
        snapshot: &GraphSnapshot,
        meta: &TurnMeta,
        sign: StateSign,
    ) -> (Instruction, Vec<EngineWarning>) {
        let (draft, mut warnings) = Self::repair(raw, sign);
        let (instruction, more) = Self::assemble(draft, snapshot, meta, sign, None);
        warnings.extend(more);
        (instruction, warnings)
    }

    /// `DEEP_DIVE + EXTRACT_DETAILS + CURIOUS_INQUIRING`, used when the input
    /// cannot be decided on at all.
    pub fn safe_default(meta: &TurnMeta) -> Instruction {
        let draft = DraftInstruction {
            action: PrimaryAction::DeepDive,
            goal: GoalType::ExtractDetails,
            focus_dimension: None,
            tone: ToneConstraint {
                primary_tone: PrimaryTone::CuriousInquiring,
                secondary_tone: None,
                constraints: Vec::new(),
            },
            strategy: None,
            target_node: None,
            bridge: BridgeType::None,
            entities: Vec::new(),
            suggested_opening: Some(opening_cue(PrimaryAction::DeepDive, GoalType::ExtractDetails)),
            checkpoint: None,
            final_state: None,
            trace: vec!["safe default".to_string()],
        };
        let meta = TurnMeta { debug: false, ..*meta };
        Self::assemble(draft, &GraphSnapshot::default(), &meta, StateSign::Neutral, None).0
    }

    /// Entity for a graph node, plus its place when one is recorded.
    pub fn entities_for(node: &Node) -> Vec<Entity> {
        let entity_type = match node.node_type {
            NodeType::LifeChapter => EntityType::Period,
            NodeType::KeyEvent => EntityType::Event,
            NodeType::Relationship => EntityType::Person,
            NodeType::Theme => EntityType::Theme,
        };
        let label = if node.label.is_empty() {
            node.id.clone()
        } else {
            node.label.clone()
        };
        let mut entities = vec![Entity {
            entity_type,
            label,
            node_id: Some(node.id.clone()),
        }];
        if let Some(place) = &node.location {
            entities.push(Entity {
                entity_type: EntityType::Location,
                label: place.clone(),
                node_id: None,
            });
        }
        entities
    }

    /// End-of-interview summary.
    pub fn final_state(ctx: &DecisionContext<'_>, cfg: &PolicyConfig) -> FinalState {
        let mut themes: Vec<(String, usize)> = ctx.snapshot.theme_support().into_iter().collect();
        themes.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let theme_summary = themes
            .into_iter()
            .map(|(tag, count)| format!("{tag} ({count})"))
            .collect();

        let chapters: Vec<&Node> = ctx
            .snapshot
            .nodes
            .iter()
            .filter(|n| n.node_type == NodeType::LifeChapter)
            .collect();
        let covered: Vec<String> = chapters
            .iter()
            .filter(|ch| chapter_covered(ctx.snapshot, ch, cfg))
            .map(|ch| ch.label.clone())
            .collect();

        let overall = ctx.coverage.overall_coverage;
        FinalState {
            overall_coverage: overall,
            theme_summary,
            completeness_confirmation_needed: covered.len() < chapters.len() || overall < 0.95,
            life_chapters_covered: covered,
        }
    }
}

fn chapter_covered(snapshot: &GraphSnapshot, chapter: &Node, cfg: &PolicyConfig) -> bool {
    let events: Vec<&Node> = snapshot
        .children_of(&chapter.id)
        .into_iter()
        .filter(|n| n.node_type == NodeType::KeyEvent)
        .collect();
    if events.is_empty() {
        chapter.slot_fill_ratio() >= cfg.saturation_threshold
    } else {
        events
            .iter()
            .all(|n| n.slot_fill_ratio() >= cfg.chapter_complete_threshold)
    }
}

/// Cue key for the generation layer, e.g. `deep_dive.extract_emotions`.
pub fn opening_cue(action: PrimaryAction, goal: GoalType) -> String {
    format!(
        "{}.{}",
        action.as_str().to_lowercase(),
        goal.as_str().to_lowercase()
    )
}
