use std::fmt;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;

use quiz_core::model::{Question, SessionId, SessionPhase, SessionState};
use quiz_core::{
    Clock, Finalization, GameRules, SessionClock, SessionError, SessionMachine, SignalBoard,
    SignalKind, Transition, finalize,
};

use super::view::SessionSnapshot;

//
// ─── STEP ──────────────────────────────────────────────────────────────────────
//

/// What happened in response to one tick or answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStep {
    pub transition: Transition,
    /// Present only on the step that ended the session.
    pub finalization: Option<Finalization>,
}

impl SessionStep {
    fn idle() -> Self {
        Self {
            transition: Transition::ignored(),
            finalization: None,
        }
    }

    #[must_use]
    pub fn ended(&self) -> bool {
        self.transition.ended
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One play-through: the state machine plus everything wired around it.
///
/// Owns the wall-clock reconciliation, the running correct-answer count,
/// transient signals, the answer feedback gate, and the one-shot finalization.
pub struct GameSession {
    id: SessionId,
    machine: SessionMachine,
    clock: Clock,
    session_clock: SessionClock,
    signals: SignalBoard,
    rng: StdRng,
    correct_answers: u32,
    high_score: u32,
    finalization: Option<Finalization>,
    high_score_persisted: bool,
    feedback_until: Option<DateTime<Utc>>,
}

impl GameSession {
    /// Build a session in `Ready`. Call `start` before feeding it input.
    #[must_use]
    pub fn new(pool: Vec<Question>, rules: GameRules, clock: Clock, high_score: u32) -> Self {
        Self {
            id: SessionId::random(),
            machine: SessionMachine::new(pool, rules),
            clock,
            session_clock: SessionClock::stopped(),
            signals: SignalBoard::new(rules.signal_window()),
            rng: StdRng::from_os_rng(),
            correct_answers: 0,
            high_score,
            finalization: None,
            high_score_persisted: false,
            feedback_until: None,
        }
    }

    /// Use a seeded generator so question order is reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Shuffle the pool and begin the first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyPool` if there is nothing to ask.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.restart()
    }

    /// Discard all progress and stats, reshuffle, and restart the clock.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyPool` if there is nothing to ask.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        self.machine.restart(&mut self.rng)?;
        self.id = SessionId::random();
        self.correct_answers = 0;
        self.finalization = None;
        self.high_score_persisted = false;
        self.feedback_until = None;
        self.signals.clear();
        self.session_clock.reset(self.clock.now());
        Ok(())
    }

    /// Feed elapsed wall-clock time into the machine.
    ///
    /// Safe to call at any cadence and after the session ended.
    pub fn tick(&mut self) -> SessionStep {
        let now = self.clock.now();
        self.signals.prune(now);
        if self.machine.phase() != SessionPhase::Active {
            self.session_clock.stop();
            return SessionStep::idle();
        }

        let elapsed = self.session_clock.tick(now);
        let transition = self.machine.time_elapsed(elapsed);
        self.after_transition(transition, now)
    }

    /// Submit an answer for the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::FeedbackPending` while the previous answer's feedback
    /// window is open, and propagates machine contract violations.
    pub fn submit_answer(&mut self, option: &str) -> Result<SessionStep, SessionError> {
        let now = self.clock.now();
        self.signals.prune(now);
        if let Some(until) = self.feedback_until {
            if now < until {
                return Err(SessionError::FeedbackPending);
            }
            self.feedback_until = None;
        }

        let transition = self.machine.answer_submitted(option)?;
        if !transition.applied {
            return Ok(SessionStep::idle());
        }
        if transition.is_correct() {
            self.correct_answers += 1;
        }
        if !transition.ended {
            self.feedback_until = Some(now + self.machine.rules().feedback_delay());
        }
        Ok(self.after_transition(transition, now))
    }

    /// Close the feedback window early, e.g. once the UI finished showing it.
    pub fn acknowledge_feedback(&mut self) {
        self.feedback_until = None;
    }

    #[must_use]
    pub fn is_feedback_pending(&self) -> bool {
        self.feedback_until
            .is_some_and(|until| self.clock.now() < until)
    }

    fn after_transition(&mut self, transition: Transition, now: DateTime<Utc>) -> SessionStep {
        if transition.crossed_low_time {
            self.signals.raise(SignalKind::LowTime, now);
        }
        if transition.bonus_life() {
            self.signals.raise(SignalKind::BonusLife, now);
        }
        if transition.resolution.is_some() {
            self.session_clock.reset(now);
        }

        let finalization = if transition.ended {
            self.session_clock.stop();
            self.feedback_until = None;
            self.finalize()
        } else {
            None
        };

        SessionStep {
            transition,
            finalization,
        }
    }

    fn finalize(&mut self) -> Option<Finalization> {
        if self.finalization.is_some() {
            return None;
        }
        let result = finalize(self.machine.state(), self.correct_answers, self.high_score);
        self.finalization = Some(result);
        Some(result)
    }

    /// The finalization whose new high score has not been stored yet.
    #[must_use]
    pub fn unsaved_high_score(&self) -> Option<&Finalization> {
        self.finalization
            .as_ref()
            .filter(|result| result.is_new_high_score() && !self.high_score_persisted)
    }

    /// Adopt the finalized high score once storage accepted it.
    pub fn mark_high_score_saved(&mut self) {
        if let Some(result) = self.finalization {
            self.high_score = result.high_score();
            self.high_score_persisted = true;
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let now = self.clock.now();
        let state = self.machine.state();
        SessionSnapshot {
            session_id: self.id,
            phase: self.machine.phase(),
            question: state.current_question().cloned(),
            question_number: state.current_index() + 1,
            total_questions: state.total_questions(),
            lives: state.lives(),
            score: state.score(),
            streak: state.consecutive_correct(),
            time_remaining: state.time_remaining(),
            urgency: self.machine.urgency(),
            signals: self.signals.active(now),
            feedback_pending: self.is_feedback_pending(),
            high_score: self.high_score,
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        self.machine.state()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.machine.phase()
    }

    #[must_use]
    pub fn rules(&self) -> &GameRules {
        self.machine.rules()
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    #[must_use]
    pub fn finalization(&self) -> Option<&Finalization> {
        self.finalization.as_ref()
    }

    #[must_use]
    pub fn is_signal_active(&self, kind: SignalKind) -> bool {
        self.signals.is_active(kind, self.clock.now())
    }

    /// Mutable access to the time source, for driving a fixed clock.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("id", &self.id)
            .field("phase", &self.machine.phase())
            .field("current_index", &self.machine.state().current_index())
            .field("lives", &self.machine.state().lives())
            .field("score", &self.machine.state().score())
            .field("correct_answers", &self.correct_answers)
            .field("high_score", &self.high_score)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::TimeUrgency;
    use quiz_core::time::fixed_clock;
    use quiz_core::{GameRulesDraft, Resolution};

    fn pool(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| {
                Question::new(
                    format!("q{i}"),
                    format!("Question {i}?"),
                    ["yes", "no", "maybe", "never"],
                    "yes",
                    "General",
                )
                .unwrap()
            })
            .collect()
    }

    fn instant_feedback() -> GameRules {
        GameRulesDraft {
            feedback_delay: chrono::Duration::zero(),
            ..GameRulesDraft::default()
        }
        .validate()
        .unwrap()
    }

    fn session(n: usize, rules: GameRules, high_score: u32) -> GameSession {
        let mut session = GameSession::new(pool(n), rules, fixed_clock(), high_score).with_seed(11);
        session.start().unwrap();
        session
    }

    #[test]
    fn empty_pool_cannot_start() {
        let mut session = GameSession::new(Vec::new(), GameRules::default(), fixed_clock(), 0);
        assert_eq!(session.start(), Err(SessionError::EmptyPool));
        assert_eq!(session.phase(), SessionPhase::Ready);
        assert_eq!(session.tick(), SessionStep::idle());
    }

    #[test]
    fn tick_reconciles_wall_clock() {
        let mut session = session(3, GameRules::default(), 0);
        session.clock_mut().advance_secs(4);
        let step = session.tick();
        assert!(step.transition.applied);
        assert_eq!(session.state().time_remaining(), 26);

        // No time passed: nothing to apply.
        assert!(!session.tick().transition.applied);
    }

    #[test]
    fn suspended_host_times_out_in_one_tick() {
        let mut session = session(3, GameRules::default(), 0);
        session.clock_mut().advance_secs(90);
        let step = session.tick();
        assert_eq!(step.transition.resolution, Some(Resolution::TimedOut));
        assert_eq!(session.state().lives(), 2);
        assert_eq!(session.state().current_index(), 1);
        assert_eq!(session.state().time_remaining(), 30);
    }

    #[test]
    fn low_time_signal_raises_and_clears() {
        let mut session = session(3, GameRules::default(), 0);
        session.clock_mut().advance_secs(20);
        session.tick();
        assert!(session.is_signal_active(SignalKind::LowTime));
        assert_eq!(session.snapshot().urgency, TimeUrgency::Warning);

        session.clock_mut().advance(chrono::Duration::milliseconds(1_500));
        assert!(!session.is_signal_active(SignalKind::LowTime));
    }

    #[test]
    fn feedback_gate_serializes_answers() {
        let mut session = session(3, GameRules::default(), 0);
        session.submit_answer("yes").unwrap();
        assert!(session.is_feedback_pending());
        assert_eq!(
            session.submit_answer("yes"),
            Err(SessionError::FeedbackPending)
        );

        session.clock_mut().advance_secs(2);
        assert!(!session.is_feedback_pending());
        session.submit_answer("yes").unwrap();
        assert_eq!(session.state().questions_answered(), 2);
    }

    #[test]
    fn acknowledged_feedback_reopens_input() {
        let mut session = session(3, GameRules::default(), 0);
        session.submit_answer("no").unwrap();
        session.acknowledge_feedback();
        assert!(session.submit_answer("yes").is_ok());
    }

    #[test]
    fn bonus_life_signal_on_fifth_correct() {
        let mut session = session(8, instant_feedback(), 0);
        for _ in 0..4 {
            session.submit_answer("yes").unwrap();
        }
        assert!(!session.is_signal_active(SignalKind::BonusLife));
        let step = session.submit_answer("yes").unwrap();
        assert!(step.transition.bonus_life());
        assert!(session.is_signal_active(SignalKind::BonusLife));
        assert_eq!(session.state().lives(), 4);
    }

    #[test]
    fn finalizes_exactly_once() {
        let mut session = session(5, instant_feedback(), 0);
        let mut finalizations = 0;
        for _ in 0..3 {
            let step = session.submit_answer("no").unwrap();
            finalizations += usize::from(step.finalization.is_some());
        }
        assert_eq!(session.phase(), SessionPhase::Over);
        assert_eq!(session.state().lives(), 0);

        session.clock_mut().advance_secs(60);
        finalizations += usize::from(session.tick().finalization.is_some());
        finalizations += usize::from(session.submit_answer("yes").unwrap().finalization.is_some());
        assert_eq!(finalizations, 1);

        let result = session.finalization().unwrap();
        assert_eq!(result.stats().correct_answers(), 0);
        assert_eq!(result.stats().wrong_answers(), 3);
        assert!(!result.is_new_high_score());
    }

    #[test]
    fn correct_count_includes_answers_after_broken_streak() {
        let mut session = session(4, instant_feedback(), 0);
        session.submit_answer("yes").unwrap();
        session.submit_answer("no").unwrap();
        session.submit_answer("yes").unwrap();
        let step = session.submit_answer("yes").unwrap();

        let result = step.finalization.unwrap();
        assert_eq!(result.stats().correct_answers(), 3);
        assert_eq!(result.stats().total_questions(), 4);
        assert_eq!(result.stats().final_score(), 120);
        assert!(result.is_new_high_score());
        assert_eq!(session.unsaved_high_score(), Some(&result));
        assert_eq!(session.high_score(), 0);

        session.mark_high_score_saved();
        assert_eq!(session.high_score(), 120);
        assert!(session.unsaved_high_score().is_none());
    }

    #[test]
    fn equal_high_score_is_not_new() {
        let mut session = session(1, instant_feedback(), 40);
        let step = session.submit_answer("yes").unwrap();
        let result = step.finalization.unwrap();
        assert_eq!(result.stats().final_score(), 40);
        assert!(!result.is_new_high_score());
        assert!(session.unsaved_high_score().is_none());
        assert_eq!(session.high_score(), 40);
    }

    #[test]
    fn restart_discards_stats_and_resets_clock() {
        let mut session = session(1, instant_feedback(), 0);
        let first_id = session.id();
        session.submit_answer("yes").unwrap();
        assert!(session.finalization().is_some());

        session.clock_mut().advance_secs(100);
        session.restart().unwrap();
        assert!(session.finalization().is_none());
        assert_eq!(session.correct_answers(), 0);
        assert_ne!(session.id(), first_id);
        assert_eq!(session.phase(), SessionPhase::Active);

        // The long pause before restart must not count against the new question.
        assert!(!session.tick().transition.applied);
        assert_eq!(session.state().time_remaining(), 30);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut session = session(3, GameRules::default(), 15);
        session.clock_mut().advance_secs(3);
        session.tick();
        let snap = session.snapshot();
        assert_eq!(snap.phase, SessionPhase::Active);
        assert_eq!(snap.question_number, 1);
        assert_eq!(snap.total_questions, 3);
        assert_eq!(snap.lives, 3);
        assert_eq!(snap.time_remaining, 27);
        assert_eq!(snap.high_score, 15);
        assert!(snap.question.is_some());
        assert!(snap.signals.is_empty());
    }
}
