//! Per-session navigation state.
//!
//! Sessions are independent units of work: each owns its ledger and nothing
//! here is shared between sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::checkpoint::{Checkpoint, ResumeSeed};
use super::coverage::MAX_DEPTH;
use super::decision::DecisionOutcome;
use super::graph::GraphSnapshot;
use super::instruction::{GoalType, PrimaryAction};
use super::user_state::UserState;

/// Caller-detected conversational signals for this turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFlags {
    /// The interviewee said goodbye or asked to stop for today.
    #[serde(default)]
    pub farewell_detected: bool,

    /// The interviewee confirmed the interview is complete.
    #[serde(default)]
    pub interview_complete: bool,

    /// The conversation reached a natural topic boundary.
    #[serde(default)]
    pub topic_boundary: bool,
}

/// Turn metadata supplied by the session manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnMeta {
    /// 1-based turn number within the current session.
    pub turn_number: u32,

    /// Emission time to stamp; defaults to now.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Attach a `_debug_snapshot` to the instruction.
    #[serde(default)]
    pub debug: bool,
}

/// A node touched during the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchedNode {
    /// Node id.
    pub id: String,
    /// Label at the time it was touched.
    pub label: String,
}

/// Ledger for one interview session.
#[derive(Debug, Clone)]
pub struct NavigatorSession {
    session_id: String,
    started_at: DateTime<Utc>,
    turns_taken: u32,
    deep_dive_counts: HashMap<String, u8>,
    last_deep_goal: HashMap<String, GoalType>,
    touched: Vec<TouchedNode>,
    suspended: Vec<String>,
    coverage_at_start: Option<f64>,
    smoothed_state: Option<UserState>,
    seed: Option<ResumeSeed>,
    last_focus: Option<String>,
}

impl NavigatorSession {
    /// Start a fresh session with no prior checkpoint.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            started_at: Utc::now(),
            turns_taken: 0,
            deep_dive_counts: HashMap::new(),
            last_deep_goal: HashMap::new(),
            touched: Vec::new(),
            suspended: Vec::new(),
            coverage_at_start: None,
            smoothed_state: None,
            seed: None,
            last_focus: None,
        }
    }

    /// Start a session, consuming the previous session's checkpoint if any.
    pub fn resume(session_id: impl Into<String>, checkpoint: Option<Checkpoint>) -> Self {
        let mut session = Self::new(session_id);
        if let Some(checkpoint) = checkpoint {
            let seed = ResumeSeed::from(checkpoint);
            session.last_focus = seed.previous_node.clone();
            session.seed = Some(seed);
        }
        session
    }

    /// Session identifier.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// When the session started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Turns recorded so far.
    pub fn turns_taken(&self) -> u32 {
        self.turns_taken
    }

    /// Resume seed still waiting for the first turn.
    pub fn pending_seed(&self) -> Option<&ResumeSeed> {
        self.seed.as_ref()
    }

    /// DEEP_DIVE actions taken on `node_id` this session, capped at 5.
    pub fn depth_of(&self, node_id: &str) -> u8 {
        self.deep_dive_counts.get(node_id).copied().unwrap_or(0)
    }

    /// Goal of the last DEEP_DIVE on `node_id`.
    pub fn last_deep_goal(&self, node_id: &str) -> Option<GoalType> {
        self.last_deep_goal.get(node_id).copied()
    }

    /// Nodes touched this session, in first-touch order.
    pub fn touched(&self) -> &[TouchedNode] {
        &self.touched
    }

    /// Nodes left unfinished by a breadth switch, oldest first.
    pub fn suspended(&self) -> &[String] {
        &self.suspended
    }

    /// Overall coverage observed on the first turn.
    pub fn coverage_at_start(&self) -> Option<f64> {
        self.coverage_at_start
    }

    /// Smoothed user state carried from the previous turn.
    pub fn smoothed_state(&self) -> Option<UserState> {
        self.smoothed_state
    }

    /// Node the previous instruction pointed at.
    pub fn last_focus(&self) -> Option<&str> {
        self.last_focus.as_deref()
    }

    /// Apply a finished decision to the ledger.
    ///
    /// A safe-default outcome only advances the turn counter.
    pub fn record(&mut self, outcome: &DecisionOutcome, snapshot: &GraphSnapshot) {
        self.turns_taken += 1;
        if outcome.safe_default {
            return;
        }
        self.seed = None;
        if self.coverage_at_start.is_none() {
            self.coverage_at_start = Some(outcome.coverage.overall_coverage);
        }
        self.smoothed_state = Some(outcome.user_state);

        let action = &outcome.instruction.action;
        let target = action.target_node.clone();

        if let Some(active) = &outcome.active_node {
            self.touch(active, snapshot);
        }
        if let Some(target) = &target {
            self.touch(target, snapshot);
        }

        match action.primary_action {
            PrimaryAction::DeepDive => {
                if let Some(target) = &target {
                    let depth = self.deep_dive_counts.entry(target.clone()).or_insert(0);
                    *depth = (*depth + 1).min(MAX_DEPTH);
                    self.last_deep_goal
                        .insert(target.clone(), action.tactical_goal.goal_type);
                }
            }
            PrimaryAction::BreadthSwitch => {
                if let Some(active) = &outcome.active_node {
                    let unfinished = !outcome.active_exhausted;
                    if unfinished && target.as_deref() != Some(active.as_str()) && !self.suspended.contains(active)
                    {
                        self.suspended.push(active.clone());
                    }
                }
                if let Some(target) = &target {
                    self.suspended.retain(|id| id != target);
                }
            }
            _ => {}
        }

        self.last_focus = target.or_else(|| outcome.active_node.clone());
    }

    fn touch(&mut self, id: &str, snapshot: &GraphSnapshot) {
        if self.touched.iter().any(|t| t.id == id) {
            return;
        }
        let label = snapshot
            .node(id)
            .map(|n| n.label.clone())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| id.to_string());
        self.touched.push(TouchedNode {
            id: id.to_string(),
            label,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_consumes_checkpoint_into_seed() {
        let checkpoint = Checkpoint {
            last_discussed_node: Some("a".to_string()),
            next_resume_node: Some("b".to_string()),
            topics_covered_today: vec![],
            coverage_today: 0.1,
            summary_today: String::new(),
        };
        let session = NavigatorSession::resume("s1", Some(checkpoint));
        assert_eq!(
            session.pending_seed().and_then(|s| s.resume_node.as_deref()),
            Some("b")
        );
        assert_eq!(session.last_focus(), Some("a"));
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = NavigatorSession::new("s2");
        assert_eq!(session.turns_taken(), 0);
        assert!(session.pending_seed().is_none());
        assert_eq!(session.depth_of("anything"), 0);
    }

    #[test]
    fn test_flags_default_false() {
        let flags: SessionFlags = serde_json::from_str("{}").unwrap();
        assert_eq!(flags, SessionFlags::default());
    }
}
