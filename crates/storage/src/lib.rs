#![forbid(unsafe_code)]

pub mod question_file;
pub mod repository;
pub mod sqlite;

pub use question_file::JsonQuestionFile;
pub use repository::{
    HIGH_SCORE_KEY, HighScoreRepository, InMemoryRepository, QuestionSource, QuestionSourceError,
    Storage, StorageError,
};
