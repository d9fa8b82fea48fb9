//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::SessionError;
use quiz_core::model::QuestionError;
use storage::repository::{QuestionSourceError, StorageError};
use storage::sqlite::SqliteInitError;

/// Reasons a question collection could not be turned into a playable pool.
///
/// Any of these blocks session construction; there is no automatic retry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("questions could not be fetched: {0}")]
    Unavailable(String),
    #[error("question data is malformed: {0}")]
    Malformed(String),
    #[error("question `{id}` is invalid: {source}")]
    Invalid {
        id: String,
        #[source]
        source: QuestionError,
    },
    #[error("question id `{0}` appears more than once")]
    DuplicateId(String),
    #[error("no questions available")]
    Empty,
}

impl LoadError {
    /// Guidance to show alongside the error.
    #[must_use]
    pub fn remediation(&self) -> &'static str {
        match self {
            LoadError::Unavailable(_) => {
                "Check that the question file exists and is readable, then try again."
            }
            LoadError::Malformed(_) | LoadError::Invalid { .. } | LoadError::DuplicateId(_) => {
                "Fix the question data and reload."
            }
            LoadError::Empty => "Add at least one question and reload.",
        }
    }
}

impl From<QuestionSourceError> for LoadError {
    fn from(err: QuestionSourceError) -> Self {
        match err {
            QuestionSourceError::Malformed(msg) => LoadError::Malformed(msg),
            QuestionSourceError::Unavailable(msg) => LoadError::Unavailable(msg),
            other => LoadError::Unavailable(other.to_string()),
        }
    }
}

/// Errors emitted by game session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GameServiceError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
