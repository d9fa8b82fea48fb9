use std::sync::Arc;

use quiz_core::GameRules;
use storage::repository::{QuestionSource, Storage};

use crate::Clock;
use crate::error::AppServicesError;
use crate::high_score_service::HighScoreService;
use crate::question_service::QuestionService;
use crate::sessions::GameLoopService;

/// Assembles app-facing services over one storage backend and question source.
#[derive(Clone)]
pub struct AppServices {
    questions: Arc<QuestionService>,
    high_scores: Arc<HighScoreService>,
    game_loop: Arc<GameLoopService>,
}

impl AppServices {
    #[must_use]
    pub fn new(
        storage: &Storage,
        source: Arc<dyn QuestionSource>,
        clock: Clock,
        rules: GameRules,
    ) -> Self {
        let high_scores = HighScoreService::new(Arc::clone(&storage.high_scores));
        let game_loop = GameLoopService::new(clock, rules, Arc::clone(&storage.high_scores))
            .with_high_score_service(high_scores.clone());

        Self {
            questions: Arc::new(QuestionService::new(source)),
            high_scores: Arc::new(high_scores),
            game_loop: Arc::new(game_loop),
        }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        source: Arc<dyn QuestionSource>,
        clock: Clock,
        rules: GameRules,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(&storage, source, clock, rules))
    }

    #[must_use]
    pub fn questions(&self) -> Arc<QuestionService> {
        Arc::clone(&self.questions)
    }

    #[must_use]
    pub fn high_scores(&self) -> Arc<HighScoreService> {
        Arc::clone(&self.high_scores)
    }

    #[must_use]
    pub fn game_loop(&self) -> Arc<GameLoopService> {
        Arc::clone(&self.game_loop)
    }
}
