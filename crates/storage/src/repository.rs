use async_trait::async_trait;
use quiz_core::model::QuestionDraft;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Fixed key under which the best score is persisted.
pub const HIGH_SCORE_KEY: &str = "quizHighScore";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors surfaced while reading the question collection.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionSourceError {
    #[error("question source unavailable: {0}")]
    Unavailable(String),

    #[error("question data is malformed: {0}")]
    Malformed(String),
}

/// Get/set of a single integer keyed by name.
#[async_trait]
pub trait HighScoreRepository: Send + Sync {
    /// Read the stored value, `None` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_high_score(&self, key: &str) -> Result<Option<u32>, StorageError>;

    /// Overwrite the stored value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set_high_score(&self, key: &str, value: u32) -> Result<(), StorageError>;
}

/// Supplies the ordered question collection, read once at startup.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch every question record.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError` if the source is unreachable or malformed.
    async fn load_questions(&self) -> Result<Vec<QuestionDraft>, QuestionSourceError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    scores: Arc<Mutex<HashMap<String, u32>>>,
    questions: Arc<Mutex<Vec<QuestionDraft>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-filled with the given question records.
    #[must_use]
    pub fn with_questions(questions: Vec<QuestionDraft>) -> Self {
        Self {
            scores: Arc::new(Mutex::new(HashMap::new())),
            questions: Arc::new(Mutex::new(questions)),
        }
    }
}

#[async_trait]
impl HighScoreRepository for InMemoryRepository {
    async fn get_high_score(&self, key: &str) -> Result<Option<u32>, StorageError> {
        let guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).copied())
    }

    async fn set_high_score(&self, key: &str, value: u32) -> Result<(), StorageError> {
        let mut guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value);
        Ok(())
    }
}

#[async_trait]
impl QuestionSource for InMemoryRepository {
    async fn load_questions(&self) -> Result<Vec<QuestionDraft>, QuestionSourceError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| QuestionSourceError::Unavailable(e.to_string()))?;
        Ok(guard.clone())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub high_scores: Arc<dyn HighScoreRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let high_scores: Arc<dyn HighScoreRepository> = Arc::new(repo);
        Self { high_scores }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn high_score_starts_unset() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.get_high_score(HIGH_SCORE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn high_score_round_trips_per_key() {
        let repo = InMemoryRepository::new();
        repo.set_high_score(HIGH_SCORE_KEY, 120).await.unwrap();
        repo.set_high_score("other", 7).await.unwrap();
        assert_eq!(repo.get_high_score(HIGH_SCORE_KEY).await.unwrap(), Some(120));

        repo.set_high_score(HIGH_SCORE_KEY, 150).await.unwrap();
        assert_eq!(repo.get_high_score(HIGH_SCORE_KEY).await.unwrap(), Some(150));
        assert_eq!(repo.get_high_score("other").await.unwrap(), Some(7));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let repo = InMemoryRepository::new();
        let storage = Storage {
            high_scores: Arc::new(repo.clone()),
        };
        storage
            .high_scores
            .set_high_score(HIGH_SCORE_KEY, 42)
            .await
            .unwrap();
        assert_eq!(repo.get_high_score(HIGH_SCORE_KEY).await.unwrap(), Some(42));
    }

    #[tokio::test]
    async fn serves_seeded_questions() {
        let draft = QuestionDraft {
            id: "q1".into(),
            prompt: "Which port does HTTPS use by default?".into(),
            options: vec!["443".into(), "80".into(), "22".into(), "8080".into()],
            correct_answer: "443".into(),
            category: "Networking".into(),
            difficulty: None,
        };
        let repo = InMemoryRepository::with_questions(vec![draft.clone()]);
        assert_eq!(repo.load_questions().await.unwrap(), vec![draft]);
    }
}
