//! Pause/resume state across sessions.

use tracing::{debug, info};

use super::strategy_selector::{progress_order, StrategySelector};
use crate::domain::models::{
    Checkpoint, DecisionContext, EngineWarning, GraphSnapshot, NavigatorSession, NodeStatus,
};

/// Produces checkpoints on PAUSE_SESSION and consumes them at session start.
pub struct CheckpointManager;

impl CheckpointManager {
    /// Build the checkpoint for a pausing session.
    pub fn capture(ctx: &DecisionContext<'_>, selector: &StrategySelector) -> Checkpoint {
        let last_discussed_node = ctx
            .active_id()
            .map(str::to_string)
            .or_else(|| ctx.session.last_focus().map(str::to_string));

        let next_resume_node = Self::next_resume_node(ctx, selector);

        let mut topics_covered_today: Vec<String> =
            ctx.session.touched().iter().map(|t| t.label.clone()).collect();
        if let Some(active) = ctx.active {
            if !ctx.session.touched().iter().any(|t| t.id == active.id) {
                let label = if active.label.is_empty() {
                    active.id.clone()
                } else {
                    active.label.clone()
                };
                topics_covered_today.push(label);
            }
        }

        let overall = ctx.coverage.overall_coverage;
        let coverage_today = ctx
            .session
            .coverage_at_start()
            .map_or(0.0, |start| overall - start);

        let summary_today = format!(
            "{} topics ({}); coverage {:+.3}",
            topics_covered_today.len(),
            topics_covered_today.join(", "),
            coverage_today
        );

        debug!(
            last = ?last_discussed_node,
            next = ?next_resume_node,
            topics = topics_covered_today.len(),
            "checkpoint captured"
        );

        Checkpoint {
            last_discussed_node,
            next_resume_node,
            topics_covered_today,
            coverage_today,
            summary_today,
        }
    }

    /// Highest-ranked breadth candidate reachable from the focus, unfinished
    /// nodes first.
    ///
    /// Falls back to the focus itself while it still has something to give.
    fn next_resume_node(ctx: &DecisionContext<'_>, selector: &StrategySelector) -> Option<String> {
        let reachable = ctx.active.map(|a| ctx.snapshot.reachable_from(&a.id));
        let mut candidates = selector.breadth_candidates(ctx, reachable.as_ref());
        candidates.sort_by(|a, b| progress_order(ctx, a.node, b.node));
        candidates.first().map(|c| c.node.id.clone()).or_else(|| {
            ctx.active
                .filter(|a| ctx.status_of(a) != NodeStatus::Exhausted)
                .map(|a| a.id.clone())
        })
    }

    /// Resolve the active node for a turn, spending the session's resume seed
    /// when one is pending.
    pub fn seed_focus(
        session: &NavigatorSession,
        snapshot: &GraphSnapshot,
    ) -> (Option<String>, Vec<EngineWarning>) {
        let mut warnings = Vec::new();
        let snapshot_focus = snapshot
            .current_focus
            .as_deref()
            .filter(|id| snapshot.contains(id))
            .map(str::to_string);

        let Some(seed) = session.pending_seed() else {
            return (snapshot_focus, warnings);
        };
        match seed.resume_node.as_deref() {
            Some(id) if snapshot.contains(id) => {
                info!(session = session.session_id(), node = id, "resuming from checkpoint");
                (Some(id.to_string()), warnings)
            }
            Some(id) => {
                warnings.push(EngineWarning::StaleResumeNode(id.to_string()));
                (snapshot_focus, warnings)
            }
            None => (snapshot_focus, warnings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        Checkpoint, CoverageMetrics, Edge, EdgeKind, Node, NodeType, SessionFlags, UserState,
    };

    fn ctx<'a>(snapshot: &'a GraphSnapshot, session: &'a NavigatorSession) -> DecisionContext<'a> {
        let mut coverage = CoverageMetrics::zero();
        coverage.overall_coverage = 0.4;
        DecisionContext {
            snapshot,
            session,
            active: snapshot.current_focus.as_deref().and_then(|id| snapshot.node(id)),
            coverage,
            user_state: UserState::default(),
            conflict: None,
            flags: SessionFlags::default(),
            turn_number: 3,
            saturation: 0.8,
        }
    }

    fn snapshot() -> GraphSnapshot {
        GraphSnapshot {
            nodes: vec![
                Node::new("ev", NodeType::KeyEvent, "Wedding"),
                Node::new("bride", NodeType::Relationship, "Mei"),
                Node::new("island", NodeType::KeyEvent, "Unrelated trip"),
            ],
            edges: vec![Edge::new("ev", "bride", EdgeKind::Social)],
            current_focus: Some("ev".to_string()),
        }
    }

    #[test]
    fn test_capture_points_at_reachable_candidate() {
        let snap = snapshot();
        let session = NavigatorSession::new("s");
        let checkpoint = CheckpointManager::capture(&ctx(&snap, &session), &StrategySelector::default());
        assert_eq!(checkpoint.last_discussed_node.as_deref(), Some("ev"));
        assert_eq!(checkpoint.next_resume_node.as_deref(), Some("bride"));
        assert_eq!(checkpoint.topics_covered_today, vec!["Wedding".to_string()]);
        assert_eq!(checkpoint.coverage_today, 0.0);
        assert!(checkpoint.summary_today.starts_with("1 topics (Wedding)"));
    }

    #[test]
    fn test_isolated_focus_resumes_on_itself() {
        let mut snap = snapshot();
        snap.edges.clear();
        let session = NavigatorSession::new("s");
        let checkpoint = CheckpointManager::capture(&ctx(&snap, &session), &StrategySelector::default());
        assert_eq!(checkpoint.next_resume_node.as_deref(), Some("ev"));
    }

    #[test]
    fn test_seed_overrides_snapshot_focus() {
        let snap = snapshot();
        let session = NavigatorSession::resume(
            "s",
            Some(Checkpoint {
                last_discussed_node: Some("ev".to_string()),
                next_resume_node: Some("island".to_string()),
                topics_covered_today: vec![],
                coverage_today: 0.0,
                summary_today: String::new(),
            }),
        );
        let (focus, warnings) = CheckpointManager::seed_focus(&session, &snap);
        assert_eq!(focus.as_deref(), Some("island"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_stale_seed_warns_and_keeps_snapshot_focus() {
        let snap = snapshot();
        let session = NavigatorSession::resume(
            "s",
            Some(Checkpoint {
                last_discussed_node: None,
                next_resume_node: Some("gone".to_string()),
                topics_covered_today: vec![],
                coverage_today: 0.0,
                summary_today: String::new(),
            }),
        );
        let (focus, warnings) = CheckpointManager::seed_focus(&session, &snap);
        assert_eq!(focus.as_deref(), Some("ev"));
        assert_eq!(warnings, vec![EngineWarning::StaleResumeNode("gone".to_string())]);
    }

    #[test]
    fn test_resume_prefers_unfinished_then_priority() {
        let mut snap = snapshot();
        snap.nodes[1].mention_count = 5;
        let mut youth = Node::new("youth", NodeType::LifeChapter, "Youth");
        youth.slot_fill_map.insert("time".to_string(), true);
        snap.nodes.push(youth);
        snap.edges.push(Edge::new("ev", "youth", EdgeKind::Temporal));
        let session = NavigatorSession::new("s");
        let checkpoint = CheckpointManager::capture(&ctx(&snap, &session), &StrategySelector::default());
        assert_eq!(checkpoint.next_resume_node.as_deref(), Some("youth"));

        snap.nodes[3].slot_fill_map.clear();
        snap.nodes[3].priority = 1;
        let checkpoint = CheckpointManager::capture(&ctx(&snap, &session), &StrategySelector::default());
        assert_eq!(checkpoint.next_resume_node.as_deref(), Some("youth"));
    }
}
