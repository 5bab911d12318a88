//! Multi-turn and multi-session flows through the session service.

mod common;

use common::{engine, life_story, node, uniform_coverage};
use narrative_navigator::adapters::memory::{InMemoryCheckpointStore, InMemoryGraphSource};
use narrative_navigator::adapters::sqlite::{initialize_from_config, SqliteCheckpointRepository};
use narrative_navigator::domain::models::{
    DatabaseConfig, Edge, EdgeKind, EngineWarning, GoalType, GraphSnapshot, NodeType,
    PrimaryAction, SessionFlags, UserStateSignal,
};
use narrative_navigator::{Checkpoint, CheckpointStore, InterviewSessionService, TurnSignals};
use std::sync::Arc;

fn eager() -> TurnSignals {
    TurnSignals {
        user_signal: Some(UserStateSignal::new(0.7, 0.8)),
        coverage: Some(uniform_coverage(0.5, 0.5)),
        ..TurnSignals::default()
    }
}

fn farewell() -> TurnSignals {
    TurnSignals {
        flags: SessionFlags {
            farewell_detected: true,
            ..SessionFlags::default()
        },
        ..eager()
    }
}

/// A key event with emotion and cause open, next to a person worth visiting.
fn market_day() -> GraphSnapshot {
    let mut snapshot = GraphSnapshot {
        nodes: vec![
            node("ev_market", NodeType::KeyEvent, "Market day", &["time", "location"]),
            node("rel_uncle", NodeType::Relationship, "Uncle Wen", &["people"]),
        ],
        edges: vec![Edge::new("ev_market", "rel_uncle", EdgeKind::Social)],
        current_focus: Some("ev_market".to_string()),
    };
    snapshot.nodes[1].mention_count = 4;
    snapshot
}

async fn memory_service(
    snapshot: GraphSnapshot,
) -> (InterviewSessionService, Arc<InMemoryCheckpointStore>) {
    common::setup_test_logging();
    let graph = Arc::new(InMemoryGraphSource::new());
    graph.put("grandma", snapshot).await;
    let store = Arc::new(InMemoryCheckpointStore::new());
    let service = InterviewSessionService::new(Arc::new(engine()), graph, store.clone());
    (service, store)
}

#[tokio::test]
async fn test_deep_dives_rotate_goals_then_switch_at_exhaustion() {
    let (service, _) = memory_service(market_day()).await;
    let mut session = service.start_session("grandma").await.unwrap();

    let mut goals = Vec::new();
    for _ in 0..4 {
        let outcome = service.next_turn(&mut session, eager()).await.unwrap();
        assert_eq!(outcome.instruction.action.primary_action, PrimaryAction::DeepDive);
        assert_eq!(outcome.instruction.action.target_node.as_deref(), Some("ev_market"));
        goals.push(outcome.instruction.action.tactical_goal.goal_type);
    }
    for pair in goals.windows(2) {
        assert_ne!(pair[0], pair[1], "consecutive deep dives repeat {:?}", pair[0]);
    }
    assert!(goals.contains(&GoalType::ExtractEmotions));
    assert!(goals.contains(&GoalType::ExtractCausality));
    assert_eq!(session.depth_of("ev_market"), 4);

    let outcome = service.next_turn(&mut session, eager()).await.unwrap();
    assert_eq!(outcome.instruction.action.primary_action, PrimaryAction::BreadthSwitch);
    assert_eq!(outcome.instruction.action.target_node.as_deref(), Some("rel_uncle"));
    assert_eq!(session.turns_taken(), 5);
}

#[tokio::test]
async fn test_turn_numbers_fill_in_from_session() {
    let (service, _) = memory_service(market_day()).await;
    let mut session = service.start_session("grandma").await.unwrap();
    service.next_turn(&mut session, eager()).await.unwrap();
    let outcome = service.next_turn(&mut session, eager()).await.unwrap();
    assert_eq!(outcome.instruction.meta.turn_number, 2);
}

#[tokio::test]
async fn test_pause_checkpoint_seeds_next_session_once() {
    let (service, store) = memory_service(life_story()).await;

    let mut first = service.start_session("grandma").await.unwrap();
    service.next_turn(&mut first, eager()).await.unwrap();
    let paused = service.next_turn(&mut first, farewell()).await.unwrap();
    assert_eq!(paused.instruction.action.primary_action, PrimaryAction::PauseSession);
    let checkpoint = paused.instruction.checkpoint.clone().unwrap();
    assert_eq!(checkpoint.last_discussed_node.as_deref(), Some("ev_wedding"));
    assert!(checkpoint.topics_covered_today.contains(&"The wedding".to_string()));
    assert_eq!(store.len().await, 1);

    let second = service.start_session("grandma").await.unwrap();
    assert!(store.is_empty().await, "checkpoint is consumed on start");
    assert_eq!(
        second.pending_seed().and_then(|s| s.resume_node.clone()),
        checkpoint.next_resume_node
    );

    let third = service.start_session("grandma").await.unwrap();
    assert!(third.pending_seed().is_none());
}

#[tokio::test]
async fn test_resume_node_overrides_snapshot_focus() {
    let (service, store) = memory_service(life_story()).await;
    let checkpoint = Checkpoint {
        last_discussed_node: Some("ev_wedding".to_string()),
        next_resume_node: Some("ev_factory".to_string()),
        topics_covered_today: vec!["The wedding".to_string()],
        coverage_today: 0.1,
        summary_today: String::new(),
    };
    store.save_checkpoint("grandma", &checkpoint).await.unwrap();

    let mut session = service.start_session("grandma").await.unwrap();
    let outcome = service.next_turn(&mut session, eager()).await.unwrap();
    assert_eq!(outcome.active_node.as_deref(), Some("ev_factory"));
    assert!(session.pending_seed().is_none(), "seed is spent by the first turn");
}

#[tokio::test]
async fn test_stale_resume_node_is_reported() {
    let (service, store) = memory_service(life_story()).await;
    let checkpoint = Checkpoint {
        last_discussed_node: None,
        next_resume_node: Some("ev_vanished".to_string()),
        topics_covered_today: vec![],
        coverage_today: 0.0,
        summary_today: String::new(),
    };
    store.save_checkpoint("grandma", &checkpoint).await.unwrap();

    let mut session = service.start_session("grandma").await.unwrap();
    let outcome = service.next_turn(&mut session, eager()).await.unwrap();
    assert!(outcome
        .warnings
        .contains(&EngineWarning::StaleResumeNode("ev_vanished".to_string())));
    assert_eq!(outcome.active_node.as_deref(), Some("ev_wedding"));
}

#[tokio::test]
async fn test_unknown_session_is_an_error() {
    let (service, _) = memory_service(life_story()).await;
    let mut session = service.start_session("stranger").await.unwrap();
    assert!(service.next_turn(&mut session, eager()).await.is_err());
}

#[tokio::test]
async fn test_checkpoint_survives_database_reopen() {
    let (_dir, path) = common::temp_db_path();
    let config = DatabaseConfig {
        path: path.display().to_string(),
        max_connections: 2,
    };

    let graph = Arc::new(InMemoryGraphSource::new());
    graph.put("grandpa", life_story()).await;

    {
        let pool = initialize_from_config(&config).await.unwrap();
        let store = Arc::new(SqliteCheckpointRepository::new(pool.clone()));
        let service = InterviewSessionService::new(Arc::new(engine()), graph.clone(), store);
        let mut session = service.start_session("grandpa").await.unwrap();
        let outcome = service.next_turn(&mut session, farewell()).await.unwrap();
        assert!(outcome.instruction.checkpoint.is_some());
        pool.close().await;
    }

    let pool = initialize_from_config(&config).await.unwrap();
    let store = Arc::new(SqliteCheckpointRepository::new(pool));
    assert_eq!(store.count().await.unwrap(), 1);
    let service = InterviewSessionService::new(Arc::new(engine()), graph, store.clone());
    let session = service.start_session("grandpa").await.unwrap();
    assert!(session.pending_seed().is_some());
    assert_eq!(store.count().await.unwrap(), 0);
}
