use std::path::{Path, PathBuf};

use async_trait::async_trait;
use quiz_core::model::QuestionDraft;

use crate::repository::{QuestionSource, QuestionSourceError};

/// Question collection stored as a JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonQuestionFile {
    path: PathBuf,
}

impl JsonQuestionFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a JSON array of question records.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError::Malformed` if the text is not a valid array of records.
    pub fn parse(raw: &str) -> Result<Vec<QuestionDraft>, QuestionSourceError> {
        serde_json::from_str(raw).map_err(|err| QuestionSourceError::Malformed(err.to_string()))
    }
}

#[async_trait]
impl QuestionSource for JsonQuestionFile {
    async fn load_questions(&self) -> Result<Vec<QuestionDraft>, QuestionSourceError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|err| {
            QuestionSourceError::Unavailable(format!("{}: {err}", self.path.display()))
        })?;
        let drafts = Self::parse(&raw)?;
        tracing::debug!(path = %self.path.display(), count = drafts.len(), "loaded question file");
        Ok(drafts)
    }
}
