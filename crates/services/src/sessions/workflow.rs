use std::sync::Arc;

use quiz_core::model::Question;
use quiz_core::{Clock, GameRules};
use storage::repository::HighScoreRepository;

use super::game::{GameSession, SessionStep};
use crate::error::GameServiceError;
use crate::high_score_service::HighScoreService;

/// Orchestrates session start, input handling, and high-score persistence.
#[derive(Clone)]
pub struct GameLoopService {
    clock: Clock,
    rules: GameRules,
    high_scores: HighScoreService,
    seed: Option<u64>,
}

impl GameLoopService {
    #[must_use]
    pub fn new(clock: Clock, rules: GameRules, high_scores: Arc<dyn HighScoreRepository>) -> Self {
        Self {
            clock,
            rules,
            high_scores: HighScoreService::new(high_scores),
            seed: None,
        }
    }

    #[must_use]
    pub fn with_high_score_service(mut self, high_scores: HighScoreService) -> Self {
        self.high_scores = high_scores;
        self
    }

    /// Seed question shuffles for reproducible sessions.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Read the persisted high score and start a session over `pool`.
    ///
    /// # Errors
    ///
    /// Returns `GameServiceError` if the pool is empty or the high score cannot be read.
    pub async fn start_session(&self, pool: Vec<Question>) -> Result<GameSession, GameServiceError> {
        let high_score = self.high_scores.load().await?;
        let mut session = GameSession::new(pool, self.rules, self.clock, high_score);
        if let Some(seed) = self.seed {
            session = session.with_seed(seed);
        }
        session.start()?;
        tracing::info!(
            session = %session.id(),
            questions = session.state().total_questions(),
            high_score,
            "session started"
        );
        Ok(session)
    }

    /// Restart a session in place with a fresh shuffle.
    ///
    /// # Errors
    ///
    /// Returns `GameServiceError::Session` if the pool is empty.
    pub fn restart(&self, session: &mut GameSession) -> Result<(), GameServiceError> {
        session.restart()?;
        tracing::info!(session = %session.id(), "session restarted");
        Ok(())
    }

    /// Apply elapsed wall-clock time and persist any resulting high score.
    ///
    /// # Errors
    ///
    /// Returns `GameServiceError::Storage` if the high score cannot be written.
    pub async fn tick(&self, session: &mut GameSession) -> Result<SessionStep, GameServiceError> {
        let step = session.tick();
        if step.transition.resolution.is_some() {
            tracing::debug!(
                session = %session.id(),
                lives = session.state().lives(),
                "question timed out"
            );
        }
        self.persist(session, &step).await?;
        Ok(step)
    }

    /// Submit an answer and persist any resulting high score.
    ///
    /// # Errors
    ///
    /// Returns `GameServiceError` for rejected input or storage failures.
    pub async fn answer(
        &self,
        session: &mut GameSession,
        option: &str,
    ) -> Result<SessionStep, GameServiceError> {
        let step = session.submit_answer(option)?;
        if step.transition.bonus_life() {
            tracing::debug!(
                session = %session.id(),
                streak = session.state().consecutive_correct(),
                "bonus life granted"
            );
        }
        self.persist(session, &step).await?;
        Ok(step)
    }

    /// Store a finished session's new high score that an earlier write failed to save.
    ///
    /// Returns whether a write happened.
    ///
    /// # Errors
    ///
    /// Returns `GameServiceError::Storage` if the write fails again.
    pub async fn retry_persist(&self, session: &mut GameSession) -> Result<bool, GameServiceError> {
        self.save_high_score(session).await
    }

    async fn persist(
        &self,
        session: &mut GameSession,
        step: &SessionStep,
    ) -> Result<(), GameServiceError> {
        let Some(result) = step.finalization.as_ref() else {
            return Ok(());
        };
        tracing::info!(
            session = %session.id(),
            score = result.stats().final_score(),
            correct = result.stats().correct_answers(),
            tier = %result.stats().performance_tier(),
            "session finished"
        );
        self.save_high_score(session).await?;
        Ok(())
    }

    async fn save_high_score(&self, session: &mut GameSession) -> Result<bool, GameServiceError> {
        let Some(result) = session.unsaved_high_score().copied() else {
            return Ok(false);
        };
        if let Err(err) = self.high_scores.record(&result).await {
            tracing::warn!(session = %session.id(), error = %err, "high score not saved");
            return Err(err.into());
        }
        session.mark_high_score_saved();
        Ok(true)
    }
}
