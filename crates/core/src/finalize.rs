use crate::model::{SessionState, SessionStats};

/// Outcome of finishing a session: statistics plus the high-score decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finalization {
    stats: SessionStats,
    previous_high_score: u32,
    is_new_high_score: bool,
}

impl Finalization {
    #[must_use]
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    #[must_use]
    pub fn previous_high_score(&self) -> u32 {
        self.previous_high_score
    }

    #[must_use]
    pub fn is_new_high_score(&self) -> bool {
        self.is_new_high_score
    }

    /// The best score after this session.
    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.previous_high_score.max(self.stats.final_score())
    }

    /// Points by which the previous record was beaten.
    #[must_use]
    pub fn margin(&self) -> Option<u32> {
        self.is_new_high_score
            .then(|| self.stats.final_score() - self.previous_high_score)
    }
}

/// Derive end-of-session statistics and decide whether the high score moves.
///
/// `correct_answers` is the running count of correct submissions kept alongside
/// the machine. Only a strictly greater score is a new high score.
#[must_use]
pub fn finalize(state: &SessionState, correct_answers: u32, previous_high_score: u32) -> Finalization {
    let stats = SessionStats::new(state.questions_answered(), correct_answers, state.score());
    Finalization {
        stats,
        previous_high_score,
        is_new_high_score: stats.final_score() > previous_high_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::SessionMachine;
    use crate::machine::tests::pool;
    use crate::model::PerformanceTier;
    use crate::rules::GameRules;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn finished_machine() -> SessionMachine {
        let mut machine = SessionMachine::new(pool(3), GameRules::default());
        machine.start(&mut StdRng::seed_from_u64(3)).unwrap();
        machine.answer_submitted("right").unwrap();
        machine.time_elapsed(30);
        machine.answer_submitted("right").unwrap();
        assert!(machine.state().is_over());
        machine
    }

    #[test]
    fn derives_stats_from_final_state() {
        let machine = finished_machine();
        let result = finalize(machine.state(), 2, 0);
        let stats = result.stats();
        assert_eq!(stats.total_questions(), 3);
        assert_eq!(stats.correct_answers(), 2);
        assert_eq!(stats.wrong_answers(), 1);
        assert_eq!(stats.final_score(), 80);
        assert_eq!(stats.performance_tier(), PerformanceTier::Ninja);
        assert!(result.is_new_high_score());
        assert_eq!(result.margin(), Some(80));
    }

    #[test]
    fn equal_score_is_not_a_new_high_score() {
        let machine = finished_machine();
        let result = finalize(machine.state(), 2, 80);
        assert!(!result.is_new_high_score());
        assert_eq!(result.high_score(), 80);
        assert_eq!(result.margin(), None);
    }

    #[test]
    fn lower_score_keeps_previous_record() {
        let machine = finished_machine();
        let result = finalize(machine.state(), 2, 500);
        assert!(!result.is_new_high_score());
        assert_eq!(result.high_score(), 500);
        assert_eq!(result.previous_high_score(), 500);
    }
}
