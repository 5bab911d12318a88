//! Life-history graph snapshot supplied by the external graph builder.
//!
//! The snapshot is read-only to the navigator. It carries the nodes and
//! typed edges extracted so far plus the caller's designated focus node.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use thiserror::Error;

use super::coverage::Dimension;

/// Kind of node in the life-history graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// A broad period of life ("university years").
    LifeChapter,
    /// A concrete event inside a chapter.
    KeyEvent,
    /// A person and the interviewee's relationship to them.
    Relationship,
    /// A recurring motif across chapters.
    Theme,
}

impl NodeType {
    /// Slots the interview expects to fill for a node of this type.
    pub fn expected_slots(self) -> &'static [&'static str] {
        match self {
            Self::KeyEvent => &[
                "time",
                "location",
                "people",
                "cause",
                "result",
                "emotion",
                "reflection",
                "sensory",
            ],
            Self::LifeChapter => &["time", "location", "people", "emotion", "reflection"],
            Self::Relationship => &["people", "time", "location", "emotion", "reflection"],
            Self::Theme => &["emotion", "reflection", "cause"],
        }
    }

    /// Whether nodes of this type expect the given slot.
    pub fn expects_slot(self, slot: &str) -> bool {
        self.expected_slots().iter().any(|s| *s == slot)
    }
}

/// Typed relation between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Happened during / overlaps in time.
    Temporal,
    /// One led to the other.
    Causal,
    /// Connected through people.
    Social,
    /// Shares a motif.
    Thematic,
    /// Containment: a life chapter holds a child node.
    Contains,
}

/// Year range a node is anchored to. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalAnchor {
    /// First year of the range.
    pub start_year: i32,
    /// Last year of the range.
    pub end_year: i32,
}

impl TemporalAnchor {
    /// Create an anchor, normalising reversed bounds.
    pub fn new(start_year: i32, end_year: i32) -> Self {
        Self {
            start_year: start_year.min(end_year),
            end_year: start_year.max(end_year),
        }
    }

    /// Number of years separating two ranges; 0 when they overlap or touch.
    ///
    /// Widened to `i64` so any pair of `i32` years is representable.
    pub fn gap_years(&self, other: &Self) -> i64 {
        if self.end_year < other.start_year {
            i64::from(other.start_year) - i64::from(self.end_year)
        } else if other.end_year < self.start_year {
            i64::from(self.start_year) - i64::from(other.end_year)
        } else {
            0
        }
    }
}

/// A unit of the life-history graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique node identifier.
    pub id: String,

    /// Node kind.
    #[serde(rename = "type")]
    pub node_type: NodeType,

    /// Human-readable label ("Grandmother Li", "Moving to Shanghai").
    #[serde(default)]
    pub label: String,

    /// Slot name → filled?
    #[serde(default)]
    pub slot_fill_map: BTreeMap<String, bool>,

    /// Coverage dimensions this node contributes evidence to.
    #[serde(default)]
    pub dimension_tags: Vec<Dimension>,

    /// Cross-chapter themes this node supports.
    #[serde(default)]
    pub theme_tags: Vec<String>,

    /// Time anchor, once the interviewee has fixed one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal_anchor: Option<TemporalAnchor>,

    /// Recorded place, once known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// How often the interviewee has mentioned this node.
    #[serde(default)]
    pub mention_count: u32,

    /// Exploration priority, 1 (highest) to 10.
    #[serde(default = "default_priority")]
    pub priority: u8,

    /// Nodes that must be exhausted before this one is opened.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

/// Priority given to nodes that do not state one.
pub const DEFAULT_PRIORITY: u8 = 5;

const fn default_priority() -> u8 {
    DEFAULT_PRIORITY
}

impl Node {
    /// Create an empty node with no filled slots.
    pub fn new(id: impl Into<String>, node_type: NodeType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type,
            label: label.into(),
            slot_fill_map: BTreeMap::new(),
            dimension_tags: Vec::new(),
            theme_tags: Vec::new(),
            temporal_anchor: None,
            location: None,
            mention_count: 0,
            priority: DEFAULT_PRIORITY,
            depends_on: Vec::new(),
        }
    }

    /// Whether the named slot has been filled.
    pub fn slot_filled(&self, slot: &str) -> bool {
        self.slot_fill_map.get(slot).copied().unwrap_or(false)
    }

    /// Ratio of filled expected slots, in `[0, 1]`.
    ///
    /// Keys that are not expected for the node type are ignored.
    pub fn slot_fill_ratio(&self) -> f64 {
        let expected = self.node_type.expected_slots();
        if expected.is_empty() {
            return 0.0;
        }
        let filled = expected.iter().filter(|slot| self.slot_filled(slot)).count();
        filled as f64 / expected.len() as f64
    }

    /// Expected slots not yet filled.
    pub fn unfilled_slots(&self) -> Vec<&'static str> {
        self.node_type
            .expected_slots()
            .iter()
            .copied()
            .filter(|slot| !self.slot_filled(slot))
            .collect()
    }
}

/// Typed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Relation kind.
    pub kind: EdgeKind,
}

impl Edge {
    /// Create an edge.
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
        }
    }

    /// The endpoint opposite `id`, if `id` is one of the endpoints.
    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(&self.target)
        } else if self.target == id {
            Some(&self.source)
        } else {
            None
        }
    }
}

/// Exploration status of a node, derived from its fill and session depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// Known to the graph but nothing captured yet.
    Pending,
    /// Partially explored.
    Mentioned,
    /// Explored as far as the interview needs.
    Exhausted,
}

/// Depth at which a node counts as exhausted regardless of fill.
pub const EXHAUSTION_DEPTH: u8 = 4;

impl NodeStatus {
    /// Classify a node from its slot-fill ratio and session depth.
    pub fn classify(fill: f64, depth: u8, saturation: f64) -> Self {
        if fill >= saturation || depth >= EXHAUSTION_DEPTH {
            Self::Exhausted
        } else if fill > 0.0 {
            Self::Mentioned
        } else {
            Self::Pending
        }
    }
}

/// Structural problem found while validating a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotIssue {
    /// A node has an empty id. Fatal to coverage.
    #[error("node with empty id")]
    EmptyNodeId,
    /// Two nodes share an id. Fatal to coverage.
    #[error("duplicate node id '{0}'")]
    DuplicateNodeId(String),
    /// An edge references a node that is not in the snapshot.
    #[error("edge {from} -> {to} references an unknown node")]
    DanglingEdge {
        /// Source id of the offending edge.
        from: String,
        /// Target id of the offending edge.
        to: String,
    },
    /// The designated focus is not a node in the snapshot.
    #[error("current focus '{0}' is not in the snapshot")]
    UnknownFocus(String),
}

impl SnapshotIssue {
    /// Whether this issue makes the snapshot unusable.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::EmptyNodeId | Self::DuplicateNodeId(_))
    }
}

/// Snapshot of the life-history graph for one turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// All nodes known so far.
    #[serde(default)]
    pub nodes: Vec<Node>,

    /// Typed edges between nodes.
    #[serde(default)]
    pub edges: Vec<Edge>,

    /// Node the conversation is currently on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_focus: Option<String>,
}

impl GraphSnapshot {
    /// Parse a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Whether a node with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Structural validation. Returns every issue found.
    pub fn validate(&self) -> Vec<SnapshotIssue> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();

        for node in &self.nodes {
            if node.id.trim().is_empty() {
                issues.push(SnapshotIssue::EmptyNodeId);
            } else if !seen.insert(node.id.as_str()) {
                issues.push(SnapshotIssue::DuplicateNodeId(node.id.clone()));
            }
        }

        for edge in &self.edges {
            if !seen.contains(edge.source.as_str()) || !seen.contains(edge.target.as_str()) {
                issues.push(SnapshotIssue::DanglingEdge {
                    from: edge.source.clone(),
                    to: edge.target.clone(),
                });
            }
        }

        if let Some(focus) = &self.current_focus {
            if !seen.contains(focus.as_str()) {
                issues.push(SnapshotIssue::UnknownFocus(focus.clone()));
            }
        }

        issues
    }

    /// Edges whose endpoints both exist.
    fn live_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .filter(move |e| self.contains(&e.source) && self.contains(&e.target))
    }

    /// Containment parent of a node (source of a `contains` edge into it).
    pub fn parent_of(&self, id: &str) -> Option<&Node> {
        self.live_edges()
            .find(|e| e.kind == EdgeKind::Contains && e.target == id)
            .and_then(|e| self.node(&e.source))
    }

    /// Containment children of a node.
    pub fn children_of(&self, id: &str) -> Vec<&Node> {
        self.live_edges()
            .filter(|e| e.kind == EdgeKind::Contains && e.source == id)
            .filter_map(|e| self.node(&e.target))
            .collect()
    }

    /// Containment ancestors of a node, nearest first. Stops on cycles.
    pub fn ancestors_of(&self, id: &str) -> Vec<&Node> {
        let mut out: Vec<&Node> = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent_of(current) {
            if parent.id == id || out.iter().any(|n| n.id == parent.id) {
                break;
            }
            out.push(parent);
            current = parent.id.as_str();
        }
        out
    }

    /// The life chapter containing a node, or the node itself when it is one.
    pub fn containing_chapter(&self, id: &str) -> Option<&Node> {
        let node = self.node(id)?;
        if node.node_type == NodeType::LifeChapter {
            return Some(node);
        }
        self.ancestors_of(id)
            .into_iter()
            .find(|n| n.node_type == NodeType::LifeChapter)
    }

    /// Neighbours of a node over non-containment edges, with the edge kind.
    pub fn neighbours(&self, id: &str) -> Vec<(&Node, EdgeKind)> {
        self.live_edges()
            .filter(|e| e.kind != EdgeKind::Contains)
            .filter_map(|e| e.other_end(id).and_then(|other| self.node(other)).map(|n| (n, e.kind)))
            .collect()
    }

    /// Kind of the first edge joining two nodes, in either direction.
    pub fn edge_between(&self, a: &str, b: &str) -> Option<EdgeKind> {
        self.live_edges()
            .find(|e| (e.source == a && e.target == b) || (e.source == b && e.target == a))
            .map(|e| e.kind)
    }

    /// Ids of every node reachable from `start` over any edge, excluding `start`.
    pub fn reachable_from(&self, start: &str) -> HashSet<String> {
        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in self.live_edges() {
            adjacency.entry(&edge.source).or_default().push(&edge.target);
            adjacency.entry(&edge.target).or_default().push(&edge.source);
        }

        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            for next in adjacency.get(id).into_iter().flatten() {
                if *next != start && visited.insert((*next).to_string()) {
                    queue.push_back(*next);
                }
            }
        }
        visited
    }

    /// Number of distinct nodes tagged with each theme.
    pub fn theme_support(&self) -> BTreeMap<String, usize> {
        let mut support: BTreeMap<String, HashSet<&str>> = BTreeMap::new();
        for node in &self.nodes {
            for tag in &node.theme_tags {
                support.entry(tag.clone()).or_default().insert(&node.id);
            }
        }
        support.into_iter().map(|(tag, ids)| (tag, ids.len())).collect()
    }
}
