//! Priority-ordered rule evaluation.
//!
//! The rule table is evaluated top to bottom and the first matching guard
//! wins. The order of [`RULES`] is the precedence contract; nothing outside
//! this table decides the primary action.

use tracing::debug;

use crate::domain::errors::ConfigError;
use crate::domain::models::graph::EXHAUSTION_DEPTH;
use crate::domain::models::{
    ConflictSeverity, DecisionContext, Dimension, GoalType, NodeType, PolicyConfig, PolicyDecision,
    PrimaryAction,
};

type Guard = fn(&DecisionContext<'_>, &PolicyConfig) -> bool;
type Build = fn(&DecisionContext<'_>, &PolicyConfig) -> RuleOutcome;

/// Goal chosen by a rule plus a note for the trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub goal: GoalType,
    pub focus_dimension: Option<Dimension>,
    pub note: String,
}

impl RuleOutcome {
    fn new(goal: GoalType, focus_dimension: Option<Dimension>, note: impl Into<String>) -> Self {
        Self {
            goal,
            focus_dimension,
            note: note.into(),
        }
    }
}

/// One row of the rule table.
pub struct Rule {
    pub action: PrimaryAction,
    guard: Guard,
    build: Build,
}

/// The rule table, highest precedence first.
pub static RULES: [Rule; 6] = [
    Rule {
        action: PrimaryAction::CloseInterview,
        guard: close_guard,
        build: close_build,
    },
    Rule {
        action: PrimaryAction::Clarify,
        guard: clarify_guard,
        build: clarify_build,
    },
    Rule {
        action: PrimaryAction::PauseSession,
        guard: pause_guard,
        build: pause_build,
    },
    Rule {
        action: PrimaryAction::Summarize,
        guard: summarize_guard,
        build: summarize_build,
    },
    Rule {
        action: PrimaryAction::BreadthSwitch,
        guard: breadth_guard,
        build: breadth_build,
    },
    Rule {
        action: PrimaryAction::DeepDive,
        guard: deep_guard,
        build: deep_build,
    },
];

/// Evaluates [`RULES`] against a decision context.
#[derive(Debug, Clone, Default)]
pub struct PolicyEvaluator {
    config: PolicyConfig,
}

impl PolicyEvaluator {
    /// Create an evaluator with the given thresholds.
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Thresholds in use.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Check the rule table covers every action once, in precedence order.
    pub fn validate_table() -> Result<(), ConfigError> {
        let order: Vec<PrimaryAction> = RULES.iter().map(|r| r.action).collect();
        if order != PrimaryAction::ALL {
            let names: Vec<&str> = order.iter().map(PrimaryAction::as_str).collect();
            return Err(ConfigError::IncompleteTable(format!(
                "rule order is [{}]",
                names.join(", ")
            )));
        }
        Ok(())
    }

    /// Pick exactly one action and goal.
    pub fn evaluate(&self, ctx: &DecisionContext<'_>) -> PolicyDecision {
        let mut trace = Vec::with_capacity(RULES.len() + 1);
        for rule in &RULES {
            if (rule.guard)(ctx, &self.config) {
                let outcome = (rule.build)(ctx, &self.config);
                debug!(action = %rule.action, goal = %outcome.goal, "rule matched");
                trace.push(format!("{}: matched ({})", rule.action, outcome.note));
                return PolicyDecision {
                    action: rule.action,
                    goal: outcome.goal,
                    focus_dimension: outcome.focus_dimension,
                    trace,
                };
            }
            trace.push(format!("{}: no match", rule.action));
        }

        debug!("no rule matched, falling back to DEEP_DIVE");
        trace.push("fallback: DEEP_DIVE/EXTRACT_DETAILS".to_string());
        PolicyDecision {
            action: PrimaryAction::DeepDive,
            goal: GoalType::ExtractDetails,
            focus_dimension: None,
            trace,
        }
    }
}

fn close_guard(ctx: &DecisionContext<'_>, cfg: &PolicyConfig) -> bool {
    ctx.flags.interview_complete
        && ctx.coverage.overall_coverage >= cfg.close_overall_threshold
        && ctx.coverage.min_dimension() >= cfg.close_dimension_floor
}

fn close_build(ctx: &DecisionContext<'_>, _: &PolicyConfig) -> RuleOutcome {
    RuleOutcome::new(
        GoalType::FinalClosure,
        None,
        format!("overall {:.2}, interview complete", ctx.coverage.overall_coverage),
    )
}

fn clarify_guard(ctx: &DecisionContext<'_>, _: &PolicyConfig) -> bool {
    ctx.conflict.is_some()
}

fn clarify_build(ctx: &DecisionContext<'_>, _: &PolicyConfig) -> RuleOutcome {
    match &ctx.conflict {
        Some(c) if c.severity == ConflictSeverity::Soft => {
            RuleOutcome::new(GoalType::ConfirmUnderstanding, None, "soft ambiguity")
        }
        _ => RuleOutcome::new(GoalType::ResolveConflict, Some(Dimension::Time), "hard contradiction"),
    }
}

fn pause_guard(ctx: &DecisionContext<'_>, cfg: &PolicyConfig) -> bool {
    ctx.flags.farewell_detected
        || ctx.user_state.energy_level < cfg.pause_energy_floor
        || ctx.turn_number > cfg.session_turn_cap
}

fn pause_build(ctx: &DecisionContext<'_>, cfg: &PolicyConfig) -> RuleOutcome {
    let note = if ctx.flags.farewell_detected {
        "farewell".to_string()
    } else if ctx.user_state.energy_level < cfg.pause_energy_floor {
        format!("energy {:.2} below floor", ctx.user_state.energy_level)
    } else {
        format!("turn {} over cap {}", ctx.turn_number, cfg.session_turn_cap)
    };
    RuleOutcome::new(GoalType::SessionFarewell, None, note)
}

fn summarize_guard(ctx: &DecisionContext<'_>, cfg: &PolicyConfig) -> bool {
    if !ctx.flags.topic_boundary {
        return false;
    }
    let Some(active) = ctx.active else {
        return false;
    };
    let Some(chapter) = ctx.snapshot.containing_chapter(&active.id) else {
        return false;
    };
    let events: Vec<_> = ctx
        .snapshot
        .children_of(&chapter.id)
        .into_iter()
        .filter(|n| n.node_type == NodeType::KeyEvent)
        .collect();
    !events.is_empty()
        && events
            .iter()
            .all(|n| n.slot_fill_ratio() >= cfg.chapter_complete_threshold)
}

fn summarize_build(ctx: &DecisionContext<'_>, cfg: &PolicyConfig) -> RuleOutcome {
    let strongest = ctx
        .snapshot
        .theme_support()
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)));
    match strongest {
        Some((theme, count)) if count >= cfg.theme_support_threshold => RuleOutcome::new(
            GoalType::SynthesizeTheme,
            Some(Dimension::Reflection),
            format!("theme '{theme}' has {count} nodes"),
        ),
        _ => RuleOutcome::new(GoalType::ReviewPeriod, Some(Dimension::Time), "chapter complete"),
    }
}

fn active_saturated(ctx: &DecisionContext<'_>, cfg: &PolicyConfig) -> bool {
    ctx.active.is_some_and(|n| {
        n.slot_fill_ratio() > cfg.saturation_threshold
            || ctx.session.depth_of(&n.id) >= EXHAUSTION_DEPTH
    })
}

fn breadth_guard(ctx: &DecisionContext<'_>, cfg: &PolicyConfig) -> bool {
    ctx.user_state.energy_level < cfg.breadth_energy_ceiling
        || active_saturated(ctx, cfg)
        || ctx.coverage.min_dimension() < cfg.dimension_gap_threshold
}

/// Breadth goal for the least covered dimension.
pub fn breadth_goal_for(dimension: Dimension) -> GoalType {
    match dimension {
        Dimension::People => GoalType::ExplorePerson,
        Dimension::Space => GoalType::ExploreLocation,
        Dimension::Emotion | Dimension::Reflection => GoalType::ExploreTheme,
        Dimension::Time => GoalType::ExplorePeriod,
    }
}

fn breadth_build(ctx: &DecisionContext<'_>, cfg: &PolicyConfig) -> RuleOutcome {
    let mut fired = Vec::new();
    if ctx.user_state.energy_level < cfg.breadth_energy_ceiling {
        fired.push("low energy");
    }
    if active_saturated(ctx, cfg) {
        fired.push("active node saturated");
    }
    if ctx.coverage.min_dimension() < cfg.dimension_gap_threshold {
        fired.push("dimension gap");
    }

    let min = ctx.coverage.min_dimension();
    let tied: Vec<Dimension> = Dimension::ALL
        .into_iter()
        .filter(|d| (ctx.coverage.dimension(*d) - min).abs() < 1e-9)
        .collect();
    let rank = |goal: GoalType| {
        cfg.breadth_goal_tiebreak
            .iter()
            .position(|g| *g == goal)
            .unwrap_or(usize::MAX)
    };
    let dimension = tied
        .iter()
        .copied()
        .min_by_key(|d| rank(breadth_goal_for(*d)))
        .unwrap_or(Dimension::Emotion);
    let goal = breadth_goal_for(dimension);

    RuleOutcome::new(
        goal,
        Some(dimension),
        format!("{}; weakest {} {:.2}", fired.join(", "), dimension.as_str(), min),
    )
}

fn deep_guard(ctx: &DecisionContext<'_>, cfg: &PolicyConfig) -> bool {
    ctx.active.is_some()
        && ctx.active_fill() < cfg.saturation_threshold
        && ctx.user_state.emotional_energy > cfg.deep_dive_emotion_floor
        && ctx.user_state.energy_level > cfg.deep_dive_energy_floor
}

/// Extraction goal for an unfilled slot.
fn extract_goal_for(slot: &str) -> GoalType {
    match slot {
        "emotion" => GoalType::ExtractEmotions,
        "cause" => GoalType::ExtractCausality,
        "reflection" => GoalType::ExtractReflections,
        "sensory" => GoalType::ExtractSensory,
        _ => GoalType::ExtractDetails,
    }
}

const EXTRACT_ORDER: [GoalType; 5] = [
    GoalType::ExtractEmotions,
    GoalType::ExtractCausality,
    GoalType::ExtractReflections,
    GoalType::ExtractSensory,
    GoalType::ExtractDetails,
];

fn deep_build(ctx: &DecisionContext<'_>, _: &PolicyConfig) -> RuleOutcome {
    let Some(active) = ctx.active else {
        return RuleOutcome::new(GoalType::ExtractDetails, None, "no active node");
    };
    let unfilled = active.unfilled_slots();
    let open: Vec<GoalType> = EXTRACT_ORDER
        .into_iter()
        .filter(|g| unfilled.iter().any(|s| extract_goal_for(s) == *g))
        .collect();
    let high_value: Vec<GoalType> = open
        .iter()
        .copied()
        .filter(|g| matches!(g, GoalType::ExtractEmotions | GoalType::ExtractCausality))
        .collect();
    let pool = if high_value.is_empty() { open } else { high_value };
    if pool.is_empty() {
        return RuleOutcome::new(GoalType::ExtractDetails, None, "no open slots");
    }

    let depth = usize::from(ctx.session.depth_of(&active.id));
    let mut goal = pool[depth % pool.len()];
    if pool.len() > 1 && ctx.session.last_deep_goal(&active.id) == Some(goal) {
        goal = pool[(depth + 1) % pool.len()];
    }

    let focus = match goal {
        GoalType::ExtractEmotions => Some(Dimension::Emotion),
        GoalType::ExtractReflections => Some(Dimension::Reflection),
        GoalType::ExtractDetails => Dimension::ALL
            .into_iter()
            .find(|d| unfilled.contains(&d.slot())),
        _ => None,
    };
    RuleOutcome::new(goal, focus, format!("{} open slots, depth {depth}", unfilled.len()))
}
