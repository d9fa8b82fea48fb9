use chrono::Duration;
use thiserror::Error;

/// Seconds allowed per question.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 30;
/// Lives at the start of every session.
pub const DEFAULT_STARTING_LIVES: u32 = 3;
/// A bonus life is granted every time the streak reaches a multiple of this.
pub const DEFAULT_STREAK_BONUS_EVERY: u32 = 5;
/// Base points for a correct answer; remaining seconds are added on top.
pub const DEFAULT_POINTS_PER_CORRECT: u32 = 10;
/// Crossing into this many remaining seconds raises the low-time warning.
pub const DEFAULT_LOW_TIME_THRESHOLD_SECS: u32 = 10;
/// Remaining seconds at which urgency becomes critical.
pub const DEFAULT_CRITICAL_TIME_THRESHOLD_SECS: u32 = 5;
/// How long transient signals stay visible.
pub const DEFAULT_SIGNAL_WINDOW_MS: i64 = 1_500;
/// How long answer feedback blocks the next submission.
pub const DEFAULT_FEEDBACK_DELAY_MS: i64 = 1_500;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameRulesError {
    #[error("time limit must be at least one second")]
    ZeroTimeLimit,

    #[error("starting lives must be at least one")]
    ZeroLives,

    #[error("streak bonus interval must be at least one")]
    ZeroStreakInterval,

    #[error("low-time threshold ({threshold}s) must be below the time limit ({limit}s)")]
    ThresholdNotBelowLimit { threshold: u32, limit: u32 },

    #[error("durations must not be negative")]
    NegativeDuration,
}

/// Validated rule set for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    time_limit_secs: u32,
    starting_lives: u32,
    streak_bonus_every: u32,
    points_per_correct: u32,
    low_time_threshold_secs: u32,
    critical_time_threshold_secs: u32,
    signal_window: Duration,
    feedback_delay: Duration,
}

/// Unvalidated rule overrides, e.g. from CLI flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRulesDraft {
    pub time_limit_secs: u32,
    pub starting_lives: u32,
    pub streak_bonus_every: u32,
    pub points_per_correct: u32,
    pub low_time_threshold_secs: u32,
    pub critical_time_threshold_secs: u32,
    pub signal_window: Duration,
    pub feedback_delay: Duration,
}

impl Default for GameRulesDraft {
    fn default() -> Self {
        Self {
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            starting_lives: DEFAULT_STARTING_LIVES,
            streak_bonus_every: DEFAULT_STREAK_BONUS_EVERY,
            points_per_correct: DEFAULT_POINTS_PER_CORRECT,
            low_time_threshold_secs: DEFAULT_LOW_TIME_THRESHOLD_SECS,
            critical_time_threshold_secs: DEFAULT_CRITICAL_TIME_THRESHOLD_SECS,
            signal_window: Duration::milliseconds(DEFAULT_SIGNAL_WINDOW_MS),
            feedback_delay: Duration::milliseconds(DEFAULT_FEEDBACK_DELAY_MS),
        }
    }
}

impl GameRulesDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft into a usable rule set.
    ///
    /// The critical threshold is clamped to the low-time threshold.
    ///
    /// # Errors
    ///
    /// Returns `GameRulesError` if any limit is zero, the low-time threshold is not
    /// below the time limit, or a duration is negative.
    pub fn validate(self) -> Result<GameRules, GameRulesError> {
        if self.time_limit_secs == 0 {
            return Err(GameRulesError::ZeroTimeLimit);
        }
        if self.starting_lives == 0 {
            return Err(GameRulesError::ZeroLives);
        }
        if self.streak_bonus_every == 0 {
            return Err(GameRulesError::ZeroStreakInterval);
        }
        if self.low_time_threshold_secs >= self.time_limit_secs {
            return Err(GameRulesError::ThresholdNotBelowLimit {
                threshold: self.low_time_threshold_secs,
                limit: self.time_limit_secs,
            });
        }
        if self.signal_window < Duration::zero() || self.feedback_delay < Duration::zero() {
            return Err(GameRulesError::NegativeDuration);
        }

        Ok(GameRules {
            time_limit_secs: self.time_limit_secs,
            starting_lives: self.starting_lives,
            streak_bonus_every: self.streak_bonus_every,
            points_per_correct: self.points_per_correct,
            low_time_threshold_secs: self.low_time_threshold_secs,
            critical_time_threshold_secs: self
                .critical_time_threshold_secs
                .min(self.low_time_threshold_secs),
            signal_window: self.signal_window,
            feedback_delay: self.feedback_delay,
        })
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            starting_lives: DEFAULT_STARTING_LIVES,
            streak_bonus_every: DEFAULT_STREAK_BONUS_EVERY,
            points_per_correct: DEFAULT_POINTS_PER_CORRECT,
            low_time_threshold_secs: DEFAULT_LOW_TIME_THRESHOLD_SECS,
            critical_time_threshold_secs: DEFAULT_CRITICAL_TIME_THRESHOLD_SECS,
            signal_window: Duration::milliseconds(DEFAULT_SIGNAL_WINDOW_MS),
            feedback_delay: Duration::milliseconds(DEFAULT_FEEDBACK_DELAY_MS),
        }
    }
}

impl GameRules {
    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    #[must_use]
    pub fn starting_lives(&self) -> u32 {
        self.starting_lives
    }

    #[must_use]
    pub fn streak_bonus_every(&self) -> u32 {
        self.streak_bonus_every
    }

    #[must_use]
    pub fn points_per_correct(&self) -> u32 {
        self.points_per_correct
    }

    #[must_use]
    pub fn low_time_threshold_secs(&self) -> u32 {
        self.low_time_threshold_secs
    }

    #[must_use]
    pub fn critical_time_threshold_secs(&self) -> u32 {
        self.critical_time_threshold_secs
    }

    #[must_use]
    pub fn signal_window(&self) -> Duration {
        self.signal_window
    }

    #[must_use]
    pub fn feedback_delay(&self) -> Duration {
        self.feedback_delay
    }

    /// True when a streak of this length earns a bonus life.
    #[must_use]
    pub fn is_bonus_streak(&self, streak: u32) -> bool {
        streak > 0 && streak % self.streak_bonus_every == 0
    }
}
