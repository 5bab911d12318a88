//! Session lifecycle around the decision engine.
//!
//! Fetches the snapshot for each turn, applies the outcome to the session
//! ledger and persists checkpoints when a session pauses.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, instrument};

use super::decision_engine::DecisionEngine;
use crate::domain::models::{
    AssertedFact, CoverageMetrics, DecisionOutcome, NavigatorSession, PrimaryAction,
    SessionFlags, TurnInput, TurnMeta, UserStateSignal,
};
use crate::domain::ports::{CheckpointStore, GraphSource};

/// Per-turn signals the host has gathered; the snapshot comes from the
/// graph source.
#[derive(Debug, Clone, Default)]
pub struct TurnSignals {
    pub user_signal: Option<UserStateSignal>,
    pub coverage: Option<CoverageMetrics>,
    pub facts: Vec<AssertedFact>,
    pub flags: SessionFlags,
    pub meta: TurnMeta,
}

/// Service for running interview sessions.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use narrative_navigator::services::{DecisionEngine, InterviewSessionService, TurnSignals};
/// use narrative_navigator::adapters::memory::{InMemoryCheckpointStore, InMemoryGraphSource};
/// use narrative_navigator::domain::models::NavigatorConfig;
///
/// # async fn example() -> anyhow::Result<()> {
/// let engine = Arc::new(DecisionEngine::new(NavigatorConfig::default())?);
/// let service = InterviewSessionService::new(
///     engine,
///     Arc::new(InMemoryGraphSource::new()),
///     Arc::new(InMemoryCheckpointStore::new()),
/// );
/// let mut session = service.start_session("grandma-li").await?;
/// let outcome = service.next_turn(&mut session, TurnSignals::default()).await?;
/// println!("{}", outcome.instruction.to_json()?);
/// # Ok(())
/// # }
/// ```
pub struct InterviewSessionService {
    engine: Arc<DecisionEngine>,
    graph: Arc<dyn GraphSource>,
    checkpoints: Arc<dyn CheckpointStore>,
}

impl InterviewSessionService {
    pub fn new(
        engine: Arc<DecisionEngine>,
        graph: Arc<dyn GraphSource>,
        checkpoints: Arc<dyn CheckpointStore>,
    ) -> Self {
        Self {
            engine,
            graph,
            checkpoints,
        }
    }

    /// Open a session, consuming any checkpoint the previous one left.
    #[instrument(skip(self), err)]
    pub async fn start_session(&self, session_id: &str) -> Result<NavigatorSession> {
        let checkpoint = self
            .checkpoints
            .take_checkpoint(session_id)
            .await
            .with_context(|| format!("failed to load checkpoint for session {session_id}"))?;
        if checkpoint.is_some() {
            info!(session_id, "resuming from stored checkpoint");
        }
        Ok(NavigatorSession::resume(session_id, checkpoint))
    }

    /// Decide one turn and apply it to the session.
    #[instrument(skip(self, session, signals), fields(session_id = session.session_id()), err)]
    pub async fn next_turn(
        &self,
        session: &mut NavigatorSession,
        signals: TurnSignals,
    ) -> Result<DecisionOutcome> {
        let snapshot = self
            .graph
            .get_snapshot(session.session_id())
            .await
            .context("failed to fetch graph snapshot")?;

        let mut meta = signals.meta;
        if meta.turn_number == 0 {
            meta.turn_number = session.turns_taken() + 1;
        }
        let input = TurnInput {
            snapshot,
            user_signal: signals.user_signal,
            coverage: signals.coverage,
            facts: signals.facts,
            flags: signals.flags,
            meta,
        };

        let outcome = self.engine.decide(&input, session);
        session.record(&outcome, &input.snapshot);

        if outcome.instruction.action.primary_action == PrimaryAction::PauseSession {
            if let Some(checkpoint) = &outcome.instruction.checkpoint {
                self.checkpoints
                    .save_checkpoint(session.session_id(), checkpoint)
                    .await
                    .context("failed to save checkpoint")?;
                info!(
                    next = ?checkpoint.next_resume_node,
                    "checkpoint saved"
                );
            }
        }

        Ok(outcome)
    }
}
