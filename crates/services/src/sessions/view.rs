use quiz_core::SignalKind;
use quiz_core::model::{Question, SessionId, SessionPhase, TimeUrgency};

/// Presentation-agnostic picture of a session after a transition.
///
/// Carries no formatted strings; the presentation layer decides how to render
/// urgency, signals, and the question itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub phase: SessionPhase,
    pub question: Option<Question>,
    /// 1-based position of the current question.
    pub question_number: usize,
    pub total_questions: usize,
    pub lives: u32,
    pub score: u32,
    pub streak: u32,
    pub time_remaining: u32,
    pub urgency: TimeUrgency,
    pub signals: Vec<SignalKind>,
    pub feedback_pending: bool,
    pub high_score: u32,
}

impl SessionSnapshot {
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase == SessionPhase::Over
    }

    #[must_use]
    pub fn has_signal(&self, kind: SignalKind) -> bool {
        self.signals.contains(&kind)
    }
}
