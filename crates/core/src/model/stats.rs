use std::fmt;

/// Rank awarded from the share of correct answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PerformanceTier {
    Legend,
    Expert,
    Pro,
    Ninja,
    Survivor,
    TrainingRequired,
}

impl PerformanceTier {
    /// Threshold the ratio `correct / total`. Zero answered questions rank lowest.
    #[must_use]
    pub fn from_counts(correct: u32, total: u32) -> Self {
        if total == 0 {
            return Self::TrainingRequired;
        }
        let correct = u64::from(correct) * 100;
        let total = u64::from(total);
        if correct >= 90 * total {
            Self::Legend
        } else if correct >= 80 * total {
            Self::Expert
        } else if correct >= 70 * total {
            Self::Pro
        } else if correct >= 60 * total {
            Self::Ninja
        } else if correct >= 50 * total {
            Self::Survivor
        } else {
            Self::TrainingRequired
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Legend => "Legend",
            Self::Expert => "Expert",
            Self::Pro => "Pro",
            Self::Ninja => "Ninja",
            Self::Survivor => "Survivor",
            Self::TrainingRequired => "Training Required",
        }
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// End-of-session statistics. Immutable once computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    total_questions: u32,
    correct_answers: u32,
    wrong_answers: u32,
    final_score: u32,
    performance_tier: PerformanceTier,
}

impl SessionStats {
    /// `total_questions` counts resolved questions, so timeouts land in `wrong_answers`.
    #[must_use]
    pub fn new(total_questions: u32, correct_answers: u32, final_score: u32) -> Self {
        Self {
            total_questions,
            correct_answers,
            wrong_answers: total_questions.saturating_sub(correct_answers),
            final_score,
            performance_tier: PerformanceTier::from_counts(correct_answers, total_questions),
        }
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn wrong_answers(&self) -> u32 {
        self.wrong_answers
    }

    #[must_use]
    pub fn final_score(&self) -> u32 {
        self.final_score
    }

    #[must_use]
    pub fn performance_tier(&self) -> PerformanceTier {
        self.performance_tier
    }

    /// Rounded percentage of correct answers, half up.
    #[must_use]
    pub fn accuracy_percent(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        let correct = u64::from(self.correct_answers) * 100;
        let total = u64::from(self.total_questions);
        u32::try_from((correct + total / 2) / total).unwrap_or(100)
    }
}
