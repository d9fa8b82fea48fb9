use crate::model::Question;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Questions have not been shuffled yet.
    Ready,
    Active,
    /// Terminal; only a restart leaves this phase.
    Over,
}

/// How close the current question is to timing out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUrgency {
    Calm,
    Warning,
    Critical,
}

impl TimeUrgency {
    #[must_use]
    pub fn classify(time_remaining: u32, low_threshold: u32, critical_threshold: u32) -> Self {
        if time_remaining <= critical_threshold {
            Self::Critical
        } else if time_remaining <= low_threshold {
            Self::Warning
        } else {
            Self::Calm
        }
    }
}

/// Mutable session record. Only `SessionMachine` writes to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub(crate) question_order: Vec<Question>,
    pub(crate) current_index: usize,
    pub(crate) lives: u32,
    pub(crate) score: u32,
    pub(crate) questions_answered: u32,
    pub(crate) consecutive_correct: u32,
    pub(crate) time_remaining: u32,
    pub(crate) is_over: bool,
}

impl SessionState {
    pub(crate) fn initial(question_order: Vec<Question>, lives: u32, time_limit: u32) -> Self {
        Self {
            question_order,
            current_index: 0,
            lives,
            score: 0,
            questions_answered: 0,
            consecutive_correct: 0,
            time_remaining: time_limit,
            is_over: false,
        }
    }

    #[must_use]
    pub fn question_order(&self) -> &[Question] {
        &self.question_order
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The question being asked, if any.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.question_order.get(self.current_index)
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.question_order.len()
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.question_order.len()
    }

    #[must_use]
    pub fn lives(&self) -> u32 {
        self.lives
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Resolved questions, timeouts included.
    #[must_use]
    pub fn questions_answered(&self) -> u32 {
        self.questions_answered
    }

    #[must_use]
    pub fn consecutive_correct(&self) -> u32 {
        self.consecutive_correct
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.is_over
    }
}
