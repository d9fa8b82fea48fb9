use rand::Rng;

use crate::error::SessionError;
use crate::model::{Question, SessionPhase, SessionState, TimeUrgency};
use crate::rules::GameRules;
use crate::shuffle::shuffle_with;

//
// ─── TRANSITION OUTCOME ────────────────────────────────────────────────────────
//

/// How the current question was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Correct { awarded: u32, bonus_life: bool },
    Incorrect,
    TimedOut,
}

/// Result of applying one input to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transition {
    /// False when the input was ignored and nothing changed.
    pub applied: bool,
    pub resolution: Option<Resolution>,
    /// Remaining time moved from above the low-time threshold to at or below it.
    pub crossed_low_time: bool,
    /// The session entered `Over` on this transition.
    pub ended: bool,
}

impl Transition {
    #[must_use]
    pub fn ignored() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn bonus_life(&self) -> bool {
        matches!(
            self.resolution,
            Some(Resolution::Correct {
                bonus_life: true,
                ..
            })
        )
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        matches!(self.resolution, Some(Resolution::Correct { .. }))
    }
}

//
// ─── MACHINE ───────────────────────────────────────────────────────────────────
//

/// Pure state machine for one quiz session.
///
/// Owns the question pool and the `SessionState`; time and randomness are
/// supplied by the caller so every transition is deterministic under test.
#[derive(Debug, Clone)]
pub struct SessionMachine {
    rules: GameRules,
    pool: Vec<Question>,
    state: SessionState,
    phase: SessionPhase,
}

impl SessionMachine {
    /// Create a machine in `Ready`. An empty pool is allowed here but cannot be started.
    #[must_use]
    pub fn new(pool: Vec<Question>, rules: GameRules) -> Self {
        let state =
            SessionState::initial(Vec::new(), rules.starting_lives(), rules.time_limit_secs());
        Self {
            rules,
            pool,
            state,
            phase: SessionPhase::Ready,
        }
    }

    #[must_use]
    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn urgency(&self) -> TimeUrgency {
        TimeUrgency::classify(
            self.state.time_remaining,
            self.rules.low_time_threshold_secs(),
            self.rules.critical_time_threshold_secs(),
        )
    }

    /// Move `Ready` to `Active` with a fresh shuffle.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyPool` if there are no questions.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), SessionError> {
        self.restart(rng)
    }

    /// Re-initialize every field and reshuffle, from any phase.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyPool` if there are no questions.
    pub fn restart<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), SessionError> {
        if self.pool.is_empty() {
            return Err(SessionError::EmptyPool);
        }
        let order = shuffle_with(&self.pool, rng);
        self.state = SessionState::initial(
            order,
            self.rules.starting_lives(),
            self.rules.time_limit_secs(),
        );
        self.phase = SessionPhase::Active;
        Ok(())
    }

    /// Apply `elapsed_secs` of wall-clock time to the current question.
    ///
    /// Ignored unless `Active`. Reaching zero is a timeout: one life is lost, the
    /// streak is kept, and the session advances or ends.
    pub fn time_elapsed(&mut self, elapsed_secs: u32) -> Transition {
        if self.phase != SessionPhase::Active || elapsed_secs == 0 {
            return Transition::ignored();
        }

        let before = self.state.time_remaining;
        let after = before.saturating_sub(elapsed_secs);
        let threshold = self.rules.low_time_threshold_secs();
        let crossed_low_time = before > threshold && after <= threshold;

        if after > 0 {
            self.state.time_remaining = after;
            return Transition {
                applied: true,
                resolution: None,
                crossed_low_time,
                ended: false,
            };
        }

        // Timeouts intentionally leave `consecutive_correct` untouched.
        self.state.lives = self.state.lives.saturating_sub(1);
        self.state.questions_answered += 1;
        self.state.time_remaining = self.rules.time_limit_secs();
        let ended = self.advance_or_end();

        Transition {
            applied: true,
            resolution: Some(Resolution::TimedOut),
            crossed_low_time,
            ended,
        }
    }

    /// Resolve the current question with the selected option.
    ///
    /// A finished session ignores the call.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` before `start`, and
    /// `SessionError::UnknownOption` if `selected` is not an option of the current question.
    pub fn answer_submitted(&mut self, selected: &str) -> Result<Transition, SessionError> {
        match self.phase {
            SessionPhase::Ready => return Err(SessionError::NotActive),
            SessionPhase::Over => return Ok(Transition::ignored()),
            SessionPhase::Active => {}
        }

        let question = self
            .state
            .current_question()
            .ok_or(SessionError::NotActive)?;
        if !question.has_option(selected) {
            return Err(SessionError::UnknownOption(selected.to_owned()));
        }

        let resolution = if question.is_correct(selected) {
            let awarded = self.rules.points_per_correct() + self.state.time_remaining;
            self.state.score = self.state.score.saturating_add(awarded);
            self.state.consecutive_correct += 1;
            let bonus_life = self.rules.is_bonus_streak(self.state.consecutive_correct);
            if bonus_life {
                self.state.lives += 1;
            }
            Resolution::Correct {
                awarded,
                bonus_life,
            }
        } else {
            self.state.lives = self.state.lives.saturating_sub(1);
            self.state.consecutive_correct = 0;
            Resolution::Incorrect
        };

        self.state.questions_answered += 1;
        self.state.time_remaining = self.rules.time_limit_secs();
        let ended = self.advance_or_end();

        Ok(Transition {
            applied: true,
            resolution: Some(resolution),
            crossed_low_time: false,
            ended,
        })
    }

    /// Shared tail of every resolution. Returns true when the session ended.
    fn advance_or_end(&mut self) -> bool {
        if self.state.lives == 0 || self.state.is_last_question() {
            self.state.is_over = true;
            self.phase = SessionPhase::Over;
            true
        } else {
            self.state.current_index += 1;
            false
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    pub(crate) fn pool(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| {
                Question::new(
                    format!("q{i}"),
                    format!("Question {i}?"),
                    ["right", "wrong-a", "wrong-b", "wrong-c"],
                    "right",
                    "General",
                )
                .unwrap()
            })
            .collect()
    }

    fn started(n: usize) -> SessionMachine {
        let mut machine = SessionMachine::new(pool(n), GameRules::default());
        machine.start(&mut StdRng::seed_from_u64(1)).unwrap();
        machine
    }

    #[test]
    fn empty_pool_never_becomes_active() {
        let mut machine = SessionMachine::new(Vec::new(), GameRules::default());
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(machine.start(&mut rng), Err(SessionError::EmptyPool));
        assert_eq!(machine.phase(), SessionPhase::Ready);
        assert_eq!(machine.answer_submitted("right"), Err(SessionError::NotActive));
        assert!(!machine.time_elapsed(5).applied);
    }

    #[test]
    fn start_initializes_fields() {
        let machine = started(5);
        let state = machine.state();
        assert_eq!(machine.phase(), SessionPhase::Active);
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.lives(), 3);
        assert_eq!(state.score(), 0);
        assert_eq!(state.questions_answered(), 0);
        assert_eq!(state.consecutive_correct(), 0);
        assert_eq!(state.time_remaining(), 30);
        assert!(!state.is_over());
        assert_eq!(state.total_questions(), 5);
    }

    #[test]
    fn partial_tick_only_updates_time() {
        let mut machine = started(5);
        let t = machine.time_elapsed(4);
        assert!(t.applied);
        assert!(t.resolution.is_none());
        assert_eq!(machine.state().time_remaining(), 26);
        assert_eq!(machine.state().lives(), 3);
    }

    #[test]
    fn timeout_costs_a_life_and_advances() {
        let mut machine = started(5);
        machine.state.lives = 2;
        machine.state.time_remaining = 5;

        let t = machine.time_elapsed(5);

        assert_eq!(t.resolution, Some(Resolution::TimedOut));
        let state = machine.state();
        assert_eq!(state.lives(), 1);
        assert_eq!(state.time_remaining(), 30);
        assert_eq!(state.questions_answered(), 1);
        assert_eq!(state.current_index(), 1);
        assert!(!state.is_over());
    }

    #[test]
    fn oversized_elapsed_clamps_to_timeout() {
        let mut machine = started(5);
        let t = machine.time_elapsed(500);
        assert_eq!(t.resolution, Some(Resolution::TimedOut));
        assert_eq!(machine.state().lives(), 2);
        assert_eq!(machine.state().current_index(), 1);
    }

    #[test]
    fn timeout_keeps_streak() {
        let mut machine = started(5);
        machine.answer_submitted("right").unwrap();
        machine.answer_submitted("right").unwrap();
        machine.time_elapsed(30);
        assert_eq!(machine.state().consecutive_correct(), 2);
    }

    #[test]
    fn crossing_low_time_is_reported_once() {
        let mut machine = started(5);
        assert!(!machine.time_elapsed(19).crossed_low_time);
        assert_eq!(machine.state().time_remaining(), 11);
        assert!(machine.time_elapsed(1).crossed_low_time);
        assert!(!machine.time_elapsed(1).crossed_low_time);
    }

    #[test]
    fn wrong_answer_on_last_life_ends_session() {
        let mut machine = started(5);
        machine.state.lives = 1;
        let t = machine.answer_submitted("wrong-a").unwrap();
        assert!(t.ended);
        assert_eq!(t.resolution, Some(Resolution::Incorrect));
        assert_eq!(machine.state().lives(), 0);
        assert!(machine.state().is_over());
        assert_eq!(machine.phase(), SessionPhase::Over);
    }

    #[test]
    fn correct_answer_awards_time_bonus() {
        let mut machine = started(5);
        machine.time_elapsed(12);
        let before = machine.state().score();
        let t = machine.answer_submitted("right").unwrap();
        assert_eq!(
            t.resolution,
            Some(Resolution::Correct {
                awarded: 28,
                bonus_life: false
            })
        );
        assert_eq!(machine.state().score(), before + 10 + 18);
        assert_eq!(machine.state().time_remaining(), 30);
    }

    #[test]
    fn awarded_points_stay_within_bounds() {
        for elapsed in 0..=29 {
            let mut machine = started(3);
            machine.time_elapsed(elapsed);
            let remaining = machine.state().time_remaining();
            let t = machine.answer_submitted("right").unwrap();
            let Some(Resolution::Correct { awarded, .. }) = t.resolution else {
                panic!("expected a correct resolution");
            };
            assert_eq!(awarded, 10 + remaining);
            assert!((10..=40).contains(&awarded));
        }
    }

    #[test]
    fn streak_bonus_every_five() {
        let mut machine = started(12);
        let mut bonuses = Vec::new();
        for _ in 0..10 {
            let t = machine.answer_submitted("right").unwrap();
            bonuses.push(t.bonus_life());
        }
        let granted: Vec<usize> = bonuses
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.then_some(i + 1))
            .collect();
        assert_eq!(granted, vec![5, 10]);
        assert_eq!(machine.state().lives(), 5);
        assert_eq!(machine.state().consecutive_correct(), 10);
    }

    #[test]
    fn wrong_answer_resets_streak() {
        let mut machine = started(8);
        for _ in 0..4 {
            machine.answer_submitted("right").unwrap();
        }
        machine.answer_submitted("wrong-b").unwrap();
        assert_eq!(machine.state().consecutive_correct(), 0);
        let t = machine.answer_submitted("right").unwrap();
        assert!(!t.bonus_life());
        assert_eq!(machine.state().lives(), 2);
    }

    #[test]
    fn last_question_correct_still_ends() {
        let mut machine = started(2);
        machine.answer_submitted("right").unwrap();
        assert_eq!(machine.state().current_index(), 1);
        let t = machine.answer_submitted("right").unwrap();
        assert!(t.ended);
        assert_eq!(machine.state().current_index(), 1);
        assert!(machine.state().is_over());
        assert_eq!(machine.state().lives(), 3);
    }

    #[test]
    fn late_inputs_after_over_are_ignored() {
        let mut machine = started(1);
        machine.answer_submitted("wrong-c").unwrap();
        let frozen = machine.state().clone();

        assert_eq!(machine.time_elapsed(10), Transition::ignored());
        assert_eq!(
            machine.answer_submitted("right").unwrap(),
            Transition::ignored()
        );
        assert_eq!(machine.state(), &frozen);
    }

    #[test]
    fn unknown_option_is_refused() {
        let mut machine = started(3);
        assert_eq!(
            machine.answer_submitted("maybe"),
            Err(SessionError::UnknownOption("maybe".into()))
        );
        assert_eq!(machine.state().questions_answered(), 0);
    }

    #[test]
    fn restart_reinitializes_after_over() {
        let mut machine = started(2);
        machine.answer_submitted("right").unwrap();
        machine.answer_submitted("right").unwrap();
        assert_eq!(machine.phase(), SessionPhase::Over);

        machine.restart(&mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(machine.phase(), SessionPhase::Active);
        assert_eq!(machine.state().score(), 0);
        assert_eq!(machine.state().questions_answered(), 0);
        assert_eq!(machine.state().total_questions(), 2);
    }

    #[test]
    fn zero_elapsed_is_a_no_op() {
        let mut machine = started(3);
        assert!(!machine.time_elapsed(0).applied);
        assert_eq!(machine.state().time_remaining(), 30);
    }
}
