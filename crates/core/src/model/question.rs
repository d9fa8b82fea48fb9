use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Every question offers exactly this many options.
pub const OPTION_COUNT: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question id is empty")]
    EmptyId,

    #[error("question prompt is empty")]
    EmptyPrompt,

    #[error("expected 4 options, got {0}")]
    OptionCount(usize),

    #[error("option `{0}` appears more than once")]
    DuplicateOption(String),

    #[error("correct answer `{0}` is not one of the options")]
    AnswerNotAnOption(String),
}

/// Raw question record as it arrives from a question source.
///
/// Accepts both `prompt`/`correctAnswer` and the shorter `question`/`answer` keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub id: String,
    #[serde(alias = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(alias = "answer")]
    pub correct_answer: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

/// Immutable multiple-choice question whose correct answer is one of its options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct_answer: String,
    category: String,
    difficulty: Option<String>,
}

impl QuestionDraft {
    /// Validate the draft into a `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the id or prompt is blank, the option count is not
    /// exactly four, options repeat, or the correct answer is not an option.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(QuestionError::EmptyId);
        }
        let prompt = self.prompt.trim();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if self.options.len() != OPTION_COUNT {
            return Err(QuestionError::OptionCount(self.options.len()));
        }
        for (idx, option) in self.options.iter().enumerate() {
            if self.options[..idx].contains(option) {
                return Err(QuestionError::DuplicateOption(option.clone()));
            }
        }
        if !self.options.contains(&self.correct_answer) {
            return Err(QuestionError::AnswerNotAnOption(self.correct_answer));
        }

        Ok(Question {
            id: QuestionId::new(id),
            prompt: prompt.to_owned(),
            options: self.options,
            correct_answer: self.correct_answer,
            category: self.category.trim().to_owned(),
            difficulty: self
                .difficulty
                .map(|val| val.trim().to_owned())
                .filter(|val| !val.is_empty()),
        })
    }
}

impl Question {
    /// Build a question directly, validating like `QuestionDraft::validate`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` on invalid input.
    pub fn new(
        id: impl Into<String>,
        prompt: impl Into<String>,
        options: [&str; OPTION_COUNT],
        correct_answer: impl Into<String>,
        category: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        QuestionDraft {
            id: id.into(),
            prompt: prompt.into(),
            options: options.iter().map(|opt| (*opt).to_owned()).collect(),
            correct_answer: correct_answer.into(),
            category: category.into(),
            difficulty: None,
        }
        .validate()
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Option<&str> {
        self.difficulty.as_deref()
    }

    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|opt| opt == option)
    }

    #[must_use]
    pub fn is_correct(&self, option: &str) -> bool {
        self.correct_answer == option
    }
}
