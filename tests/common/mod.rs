//! Common test utilities for integration tests
//!
//! Shared snapshot fixtures and engine helpers.

#![allow(dead_code)]

use narrative_navigator::domain::models::{
    CoverageMetrics, Dimension, Edge, EdgeKind, GraphSnapshot, Node, NodeType, TemporalAnchor,
};
use narrative_navigator::{DecisionEngine, NavigatorConfig};
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Path to a SQLite database file in a fresh temporary directory
pub fn temp_db_path() -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let db_path = dir.path().join("navigator.db");
    (dir, db_path)
}

/// Initialize a test-writer subscriber; repeated calls are no-ops
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Engine with default configuration
pub fn engine() -> DecisionEngine {
    DecisionEngine::new(NavigatorConfig::default()).expect("default config is valid")
}

/// Node with the given slots marked filled
pub fn node(id: &str, node_type: NodeType, label: &str, filled: &[&str]) -> Node {
    let mut node = Node::new(id, node_type, label);
    for slot in filled {
        node.slot_fill_map.insert((*slot).to_string(), true);
    }
    node
}

/// Coverage with the same value on every dimension
pub fn uniform_coverage(overall: f64, each: f64) -> CoverageMetrics {
    CoverageMetrics {
        overall_coverage: overall,
        dimension_coverage: Dimension::ALL.iter().map(|d| (*d, each)).collect(),
        current_depth: 0,
    }
}

/// A small two-chapter life story, focused on the wedding.
///
/// - `ch_youth` (1965-1975) contains `ev_school` and `ev_wedding`
/// - `ch_work` (1976-1995) contains `ev_factory`
/// - `rel_mei` is socially linked to the wedding and mentioned 3 times
/// - `th_duty` is a theme supported by three nodes
pub fn life_story() -> GraphSnapshot {
    let mut youth = node(
        "ch_youth",
        NodeType::LifeChapter,
        "Youth in Qingdao",
        &["time", "location"],
    );
    youth.temporal_anchor = Some(TemporalAnchor::new(1965, 1975));

    let mut work = node("ch_work", NodeType::LifeChapter, "Factory years", &["time"]);
    work.temporal_anchor = Some(TemporalAnchor::new(1976, 1995));

    let mut school = node(
        "ev_school",
        NodeType::KeyEvent,
        "Leaving school",
        &["time", "location", "people"],
    );
    school.theme_tags = vec!["duty".to_string()];

    let mut wedding = node(
        "ev_wedding",
        NodeType::KeyEvent,
        "The wedding",
        &["time", "location"],
    );
    wedding.temporal_anchor = Some(TemporalAnchor::new(1972, 1972));
    wedding.location = Some("Qingdao".to_string());
    wedding.theme_tags = vec!["duty".to_string()];

    let factory = node("ev_factory", NodeType::KeyEvent, "First shift", &["time"]);

    let mut mei = node("rel_mei", NodeType::Relationship, "Mei", &["people"]);
    mei.mention_count = 3;
    mei.theme_tags = vec!["duty".to_string()];

    let duty = node("th_duty", NodeType::Theme, "Duty", &[]);

    GraphSnapshot {
        nodes: vec![youth, work, school, wedding, factory, mei, duty],
        edges: vec![
            Edge::new("ch_youth", "ev_school", EdgeKind::Contains),
            Edge::new("ch_youth", "ev_wedding", EdgeKind::Contains),
            Edge::new("ch_work", "ev_factory", EdgeKind::Contains),
            Edge::new("ev_wedding", "rel_mei", EdgeKind::Social),
            Edge::new("ev_school", "ev_wedding", EdgeKind::Causal),
            Edge::new("ev_wedding", "ev_factory", EdgeKind::Temporal),
            Edge::new("ev_school", "th_duty", EdgeKind::Thematic),
        ],
        current_focus: Some("ev_wedding".to_string()),
    }
}

/// A single life chapter with two of five slots filled (fill 0.4)
pub fn single_chapter() -> GraphSnapshot {
    GraphSnapshot {
        nodes: vec![node(
            "ch_army",
            NodeType::LifeChapter,
            "Army service",
            &["time", "location"],
        )],
        edges: vec![],
        current_focus: Some("ch_army".to_string()),
    }
}
