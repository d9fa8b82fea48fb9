use std::collections::HashSet;
use std::sync::Arc;

use quiz_core::model::Question;
use storage::repository::QuestionSource;

use crate::error::LoadError;

/// Loads and validates the question pool.
#[derive(Clone)]
pub struct QuestionService {
    source: Arc<dyn QuestionSource>,
}

impl QuestionService {
    #[must_use]
    pub fn new(source: Arc<dyn QuestionSource>) -> Self {
        Self { source }
    }

    /// Fetch every question, in source order.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the source fails, any record is invalid, ids repeat,
    /// or the collection is empty.
    pub async fn load(&self) -> Result<Vec<Question>, LoadError> {
        let drafts = self.source.load_questions().await.map_err(|err| {
            tracing::error!(error = %err, "question source failed");
            LoadError::from(err)
        })?;

        let mut seen = HashSet::with_capacity(drafts.len());
        let mut questions = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let id = draft.id.clone();
            let question = draft
                .validate()
                .map_err(|source| LoadError::Invalid { id, source })?;
            if !seen.insert(question.id().clone()) {
                return Err(LoadError::DuplicateId(question.id().to_string()));
            }
            questions.push(question);
        }

        if questions.is_empty() {
            return Err(LoadError::Empty);
        }
        tracing::debug!(count = questions.len(), "question pool ready");
        Ok(questions)
    }
}
