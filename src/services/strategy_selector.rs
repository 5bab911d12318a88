//! Navigation strategy selection for DEEP_DIVE and BREADTH_SWITCH.
//!
//! Both pools are fixed. Within the breadth pool the lowest applicable tier
//! wins. Inside tier 1 the candidate with the most mentions wins; after that,
//! and in the lower tiers, unfinished nodes come before untouched ones (see
//! [`progress_order`]), then mentions, then the earlier node in the snapshot.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::domain::models::{
    BridgeType, DecisionContext, Dimension, EdgeKind, GoalType, Node, NodeStatus, NodeType,
    PrimaryAction, StrategyChoice, StrategyType,
};

/// Deep pool with its priorities.
pub const DEEP_POOL: [(StrategyType, u8); 3] = [
    (StrategyType::EventToPerson, 1),
    (StrategyType::ObjectToEmotion, 2),
    (StrategyType::EraToIndividual, 3),
];

/// Breadth pool with its tiers.
pub const BREADTH_POOL: [(StrategyType, u8); 5] = [
    (StrategyType::AffectiveAssociation, 1),
    (StrategyType::SocialNetworkJump, 1),
    (StrategyType::SpatialJump, 2),
    (StrategyType::TaskResume, 2),
    (StrategyType::HistoricalSnapshot, 3),
];

/// A breadth target with the strategy that reaches it.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub strategy: StrategyType,
    pub tier: u8,
    pub node: &'a Node,
    index: usize,
}

/// Strategy and target chosen for an action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategySelection {
    pub strategy: Option<StrategyChoice>,
    pub target_node: Option<String>,
}

/// Ranks candidate strategies for the current context.
#[derive(Debug, Clone)]
pub struct StrategySelector {
    high_mention_threshold: u32,
}

impl Default for StrategySelector {
    fn default() -> Self {
        Self::new(2)
    }
}

impl StrategySelector {
    /// Create a selector; relationship nodes with at least
    /// `high_mention_threshold` mentions qualify for SOCIAL_NETWORK_JUMP.
    pub fn new(high_mention_threshold: u32) -> Self {
        Self {
            high_mention_threshold,
        }
    }

    /// Select a strategy for `action`. Other actions get no strategy.
    pub fn select(
        &self,
        ctx: &DecisionContext<'_>,
        action: PrimaryAction,
        goal: GoalType,
    ) -> StrategySelection {
        match action {
            PrimaryAction::DeepDive => Self::select_deep(ctx, goal),
            PrimaryAction::BreadthSwitch => self
                .breadth_candidates(ctx, None)
                .first()
                .map(|c| StrategySelection {
                    strategy: Some(StrategyChoice {
                        strategy_type: c.strategy,
                        priority: c.tier,
                    }),
                    target_node: Some(c.node.id.clone()),
                })
                .unwrap_or_default(),
            _ => StrategySelection::default(),
        }
    }

    fn select_deep(ctx: &DecisionContext<'_>, goal: GoalType) -> StrategySelection {
        let Some(active) = ctx.active else {
            return StrategySelection::default();
        };
        let applicable = |strategy: StrategyType| match strategy {
            StrategyType::EventToPerson => {
                active.node_type == NodeType::KeyEvent
                    && (!active.slot_filled(Dimension::People.slot())
                        || ctx
                            .snapshot
                            .neighbours(&active.id)
                            .iter()
                            .any(|(n, k)| *k == EdgeKind::Social && n.node_type == NodeType::Relationship))
            }
            StrategyType::ObjectToEmotion => {
                matches!(goal, GoalType::ExtractEmotions | GoalType::ExtractSensory)
            }
            StrategyType::EraToIndividual => active.node_type == NodeType::LifeChapter,
            _ => false,
        };
        let strategy = DEEP_POOL
            .iter()
            .find(|(s, _)| applicable(*s))
            .map(|(s, p)| StrategyChoice {
                strategy_type: *s,
                priority: *p,
            });
        StrategySelection {
            strategy,
            target_node: Some(active.id.clone()),
        }
    }

    /// Breadth candidates, best first.
    ///
    /// Only nodes that are neither the active node nor exhausted qualify,
    /// and untouched nodes only once their prerequisites are exhausted.
    /// With `within` set, candidates are restricted to those ids.
    pub fn breadth_candidates<'a>(
        &self,
        ctx: &DecisionContext<'a>,
        within: Option<&HashSet<String>>,
    ) -> Vec<Candidate<'a>> {
        let snapshot = ctx.snapshot;
        let active = ctx.active;
        let eligible: Vec<(usize, &'a Node)> = snapshot
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| active.is_none_or(|a| a.id != n.id))
            .filter(|(_, n)| match ctx.status_of(n) {
                NodeStatus::Exhausted => false,
                NodeStatus::Pending => ctx.ready_to_explore(n),
                NodeStatus::Mentioned => true,
            })
            .filter(|(_, n)| within.is_none_or(|ids| ids.contains(&n.id)))
            .collect();

        let thematic: HashSet<&str> = active
            .map(|a| {
                snapshot
                    .neighbours(&a.id)
                    .into_iter()
                    .filter(|(_, k)| *k == EdgeKind::Thematic)
                    .map(|(n, _)| n.id.as_str())
                    .collect()
            })
            .unwrap_or_default();

        let applies = |strategy: StrategyType, node: &Node| -> bool {
            match strategy {
                StrategyType::AffectiveAssociation => active.is_some_and(|a| {
                    thematic.contains(node.id.as_str())
                        || node.theme_tags.iter().any(|t| a.theme_tags.contains(t))
                }),
                StrategyType::SocialNetworkJump => {
                    node.node_type == NodeType::Relationship
                        && node.mention_count >= self.high_mention_threshold
                }
                StrategyType::SpatialJump => {
                    node.dimension_tags.contains(&Dimension::Space)
                        || (node.location.is_some()
                            && node.location != active.and_then(|a| a.location.clone()))
                }
                StrategyType::TaskResume => ctx.session.suspended().contains(&node.id),
                StrategyType::HistoricalSnapshot => true,
                _ => false,
            }
        };

        for tier in 1..=3u8 {
            let mut found: Vec<Candidate<'a>> = Vec::new();
            for (strategy, _) in BREADTH_POOL.iter().filter(|(_, t)| *t == tier) {
                for (index, node) in &eligible {
                    let node: &'a Node = *node;
                    if applies(*strategy, node) && !found.iter().any(|c| c.node.id == node.id) {
                        found.push(Candidate {
                            strategy: *strategy,
                            tier,
                            node,
                            index: *index,
                        });
                    }
                }
            }
            if !found.is_empty() {
                found.sort_by(|a, b| {
                    let chapter = |c: &Candidate<'_>| {
                        tier == 3 && c.node.node_type != NodeType::LifeChapter
                    };
                    let mentions = |x: &Candidate<'_>, y: &Candidate<'_>| {
                        y.node.mention_count.cmp(&x.node.mention_count)
                    };
                    chapter(a)
                        .cmp(&chapter(b))
                        .then_with(|| if tier == 1 { mentions(a, b) } else { Ordering::Equal })
                        .then_with(|| progress_order(ctx, a.node, b.node))
                        .then_with(|| mentions(a, b))
                        .then_with(|| a.index.cmp(&b.index))
                });
                return found;
            }
        }
        Vec::new()
    }
}

/// Unfinished nodes before untouched ones; among unfinished the least
/// complete first, among untouched the highest priority first.
pub fn progress_order(ctx: &DecisionContext<'_>, a: &Node, b: &Node) -> Ordering {
    let (sa, sb) = (ctx.status_of(a), ctx.status_of(b));
    let rank = |status: NodeStatus| match status {
        NodeStatus::Mentioned => 0u8,
        NodeStatus::Pending => 1,
        NodeStatus::Exhausted => 2,
    };
    rank(sa).cmp(&rank(sb)).then_with(|| match sa {
        NodeStatus::Mentioned => a.slot_fill_ratio().total_cmp(&b.slot_fill_ratio()),
        _ => a.priority.cmp(&b.priority),
    })
}

/// Framing from the previous node to the next.
pub fn bridge_for(
    ctx: &DecisionContext<'_>,
    action: PrimaryAction,
    goal: GoalType,
    selection: &StrategySelection,
) -> BridgeType {
    match action {
        PrimaryAction::Summarize if goal == GoalType::SynthesizeTheme => BridgeType::Thematic,
        PrimaryAction::Summarize => BridgeType::Temporal,
        PrimaryAction::BreadthSwitch => {
            let edge = ctx
                .active_id()
                .zip(selection.target_node.as_deref())
                .and_then(|(from, to)| ctx.snapshot.edge_between(from, to));
            match (edge, selection.strategy.as_ref().map(|s| s.strategy_type)) {
                (Some(EdgeKind::Temporal | EdgeKind::Contains), _) => BridgeType::Temporal,
                (Some(EdgeKind::Causal), _) => BridgeType::Causal,
                (Some(EdgeKind::Social), _) => BridgeType::Social,
                (Some(EdgeKind::Thematic), _) => BridgeType::Thematic,
                (None, Some(StrategyType::AffectiveAssociation)) => BridgeType::Emotional,
                (None, Some(StrategyType::SocialNetworkJump)) => BridgeType::Social,
                (None, Some(StrategyType::SpatialJump)) => BridgeType::Spatial,
                (None, Some(StrategyType::TaskResume | StrategyType::HistoricalSnapshot)) => {
                    BridgeType::Temporal
                }
                _ => BridgeType::None,
            }
        }
        _ => BridgeType::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        CoverageMetrics, Edge, GraphSnapshot, NavigatorSession, SessionFlags, UserState,
    };

    fn ctx<'a>(snapshot: &'a GraphSnapshot, session: &'a NavigatorSession) -> DecisionContext<'a> {
        DecisionContext {
            snapshot,
            session,
            active: snapshot.current_focus.as_deref().and_then(|id| snapshot.node(id)),
            coverage: CoverageMetrics::zero(),
            user_state: UserState::default(),
            conflict: None,
            flags: SessionFlags::default(),
            turn_number: 1,
            saturation: 0.8,
        }
    }

    fn person(id: &str, mentions: u32) -> Node {
        Node {
            mention_count: mentions,
            ..Node::new(id, NodeType::Relationship, id)
        }
    }

    #[test]
    fn test_tier_one_prefers_most_mentioned() {
        let mut active = Node::new("ev", NodeType::KeyEvent, "wedding");
        active.theme_tags.push("family".to_string());
        let mut cousin = Node::new("cousin_ev", NodeType::KeyEvent, "reunion");
        cousin.theme_tags.push("family".to_string());
        cousin.mention_count = 1;
        let snap = GraphSnapshot {
            nodes: vec![active, cousin, person("uncle", 5)],
            edges: vec![],
            current_focus: Some("ev".to_string()),
        };
        let session = NavigatorSession::new("s");
        let selection =
            StrategySelector::default().select(&ctx(&snap, &session), PrimaryAction::BreadthSwitch, GoalType::ExploreTheme);
        assert_eq!(selection.target_node.as_deref(), Some("uncle"));
        let choice = selection.strategy.unwrap();
        assert_eq!(choice.strategy_type, StrategyType::SocialNetworkJump);
        assert_eq!(choice.priority, 1);
    }

    #[test]
    fn test_low_mention_person_falls_to_lower_tier() {
        let snap = GraphSnapshot {
            nodes: vec![
                Node::new("ev", NodeType::KeyEvent, "wedding"),
                person("uncle", 1),
                Node::new("ch", NodeType::LifeChapter, "youth"),
            ],
            edges: vec![],
            current_focus: Some("ev".to_string()),
        };
        let session = NavigatorSession::new("s");
        let selection =
            StrategySelector::default().select(&ctx(&snap, &session), PrimaryAction::BreadthSwitch, GoalType::ExploreTheme);
        let choice = selection.strategy.unwrap();
        assert_eq!(choice.strategy_type, StrategyType::HistoricalSnapshot);
        assert_eq!(choice.priority, 3);
        assert_eq!(selection.target_node.as_deref(), Some("ch"));
    }

    #[test]
    fn test_exhausted_nodes_are_not_candidates() {
        let mut done = person("aunt", 9);
        for slot in NodeType::Relationship.expected_slots() {
            done.slot_fill_map.insert((*slot).to_string(), true);
        }
        let snap = GraphSnapshot {
            nodes: vec![Node::new("ev", NodeType::KeyEvent, "x"), done],
            edges: vec![],
            current_focus: Some("ev".to_string()),
        };
        let session = NavigatorSession::new("s");
        let selection =
            StrategySelector::default().select(&ctx(&snap, &session), PrimaryAction::BreadthSwitch, GoalType::ExplorePerson);
        assert_eq!(selection, StrategySelection::default());
    }

    #[test]
    fn test_deep_pool_event_to_person() {
        let snap = GraphSnapshot {
            nodes: vec![Node::new("ev", NodeType::KeyEvent, "x")],
            edges: vec![],
            current_focus: Some("ev".to_string()),
        };
        let session = NavigatorSession::new("s");
        let selection =
            StrategySelector::default().select(&ctx(&snap, &session), PrimaryAction::DeepDive, GoalType::ExtractEmotions);
        assert_eq!(selection.target_node.as_deref(), Some("ev"));
        assert_eq!(selection.strategy.unwrap().strategy_type, StrategyType::EventToPerson);
    }

    #[test]
    fn test_deep_pool_era_to_individual() {
        let snap = GraphSnapshot {
            nodes: vec![Node::new("ch", NodeType::LifeChapter, "youth")],
            edges: vec![],
            current_focus: Some("ch".to_string()),
        };
        let session = NavigatorSession::new("s");
        let selection =
            StrategySelector::default().select(&ctx(&snap, &session), PrimaryAction::DeepDive, GoalType::ExtractDetails);
        assert_eq!(selection.strategy.unwrap().strategy_type, StrategyType::EraToIndividual);
    }

    #[test]
    fn test_bridge_follows_edge_kind() {
        let snap = GraphSnapshot {
            nodes: vec![Node::new("ev", NodeType::KeyEvent, "x"), person("uncle", 3)],
            edges: vec![Edge::new("ev", "uncle", EdgeKind::Causal)],
            current_focus: Some("ev".to_string()),
        };
        let session = NavigatorSession::new("s");
        let context = ctx(&snap, &session);
        let selection = StrategySelector::default().select(&context, PrimaryAction::BreadthSwitch, GoalType::ExplorePerson);
        assert_eq!(
            bridge_for(&context, PrimaryAction::BreadthSwitch, GoalType::ExplorePerson, &selection),
            BridgeType::Causal
        );
        assert_eq!(
            bridge_for(&context, PrimaryAction::DeepDive, GoalType::ExtractDetails, &selection),
            BridgeType::None
        );
    }

    #[test]
    fn test_restricted_candidates() {
        let snap = GraphSnapshot {
            nodes: vec![
                Node::new("ev", NodeType::KeyEvent, "x"),
                person("near", 0),
                person("far", 8),
            ],
            edges: vec![Edge::new("ev", "near", EdgeKind::Social)],
            current_focus: Some("ev".to_string()),
        };
        let session = NavigatorSession::new("s");
        let context = ctx(&snap, &session);
        let reachable = snap.reachable_from("ev");
        let candidates = StrategySelector::default().breadth_candidates(&context, Some(&reachable));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].node.id, "near");
    }

    fn chapter(id: &str, filled: &[&str]) -> Node {
        let mut node = Node::new(id, NodeType::LifeChapter, id);
        for slot in filled {
            node.slot_fill_map.insert((*slot).to_string(), true);
        }
        node
    }

    fn ids(candidates: &[Candidate<'_>]) -> Vec<String> {
        candidates.iter().map(|c| c.node.id.clone()).collect()
    }

    #[test]
    fn test_pending_node_waits_for_prerequisites() {
        let mut later = chapter("later", &[]);
        later.depends_on = vec!["early".to_string()];
        let mut orphan = chapter("orphan", &[]);
        orphan.depends_on = vec!["missing".to_string()];
        let mut snap = GraphSnapshot {
            nodes: vec![
                Node::new("ev", NodeType::KeyEvent, "x"),
                later,
                orphan,
                chapter("early", &["time"]),
            ],
            edges: vec![],
            current_focus: Some("ev".to_string()),
        };
        let session = NavigatorSession::new("s");
        let candidates = StrategySelector::default().breadth_candidates(&ctx(&snap, &session), None);
        assert_eq!(ids(&candidates), vec!["early".to_string()]);

        snap.nodes[3] = chapter("early", NodeType::LifeChapter.expected_slots());
        let candidates = StrategySelector::default().breadth_candidates(&ctx(&snap, &session), None);
        assert_eq!(ids(&candidates), vec!["later".to_string()]);
    }

    #[test]
    fn test_unfinished_before_untouched_then_priority() {
        let mut low = chapter("low", &[]);
        low.priority = 9;
        let mut high = chapter("high", &[]);
        high.priority = 1;
        let snap = GraphSnapshot {
            nodes: vec![
                Node::new("ev", NodeType::KeyEvent, "x"),
                low,
                chapter("most", &["time", "location", "people"]),
                high,
                chapter("little", &["time"]),
            ],
            edges: vec![],
            current_focus: Some("ev".to_string()),
        };
        let session = NavigatorSession::new("s");
        let candidates = StrategySelector::default().breadth_candidates(&ctx(&snap, &session), None);
        assert_eq!(ids(&candidates), vec!["little", "most", "high", "low"]);
    }

    #[test]
    fn test_tier_one_mentions_outrank_progress() {
        let mut fresh = person("fresh", 6);
        fresh.priority = 9;
        let mut begun = person("begun", 3);
        begun.slot_fill_map.insert("people".to_string(), true);
        let snap = GraphSnapshot {
            nodes: vec![Node::new("ev", NodeType::KeyEvent, "x"), begun, fresh],
            edges: vec![],
            current_focus: Some("ev".to_string()),
        };
        let session = NavigatorSession::new("s");
        let candidates = StrategySelector::default().breadth_candidates(&ctx(&snap, &session), None);
        assert_eq!(candidates[0].tier, 1);
        assert_eq!(ids(&candidates), vec!["fresh", "begun"]);
    }
}
