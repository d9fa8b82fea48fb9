use std::sync::Arc;

use quiz_core::Finalization;
use storage::repository::{HIGH_SCORE_KEY, HighScoreRepository, StorageError};

/// Reads the best score at startup and writes it when a session beats it.
#[derive(Clone)]
pub struct HighScoreService {
    repo: Arc<dyn HighScoreRepository>,
    key: String,
}

impl HighScoreService {
    #[must_use]
    pub fn new(repo: Arc<dyn HighScoreRepository>) -> Self {
        Self {
            repo,
            key: HIGH_SCORE_KEY.to_owned(),
        }
    }

    /// Load the persisted score, 0 if none was stored yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    pub async fn load(&self) -> Result<u32, StorageError> {
        Ok(self.repo.get_high_score(&self.key).await?.unwrap_or(0))
    }

    /// Persist the session score if the finalization flagged a new record.
    ///
    /// Returns whether a write happened.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn record(&self, result: &Finalization) -> Result<bool, StorageError> {
        if !result.is_new_high_score() {
            return Ok(false);
        }
        let score = result.stats().final_score();
        self.repo.set_high_score(&self.key, score).await?;
        tracing::info!(
            score,
            previous = result.previous_high_score(),
            "new high score"
        );
        Ok(true)
    }
}
