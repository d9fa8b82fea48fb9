use chrono::{DateTime, Duration, Utc};

/// Wall-clock reconciliation for the per-question countdown.
///
/// Each `tick` reports the whole seconds elapsed since the reference point, so a
/// suspended host catches up in one step instead of losing time. The sub-second
/// remainder stays on the reference and counts toward the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionClock {
    reference: Option<DateTime<Utc>>,
}

impl SessionClock {
    /// A clock that reports nothing until reset.
    #[must_use]
    pub fn stopped() -> Self {
        Self { reference: None }
    }

    #[must_use]
    pub fn started_at(now: DateTime<Utc>) -> Self {
        Self {
            reference: Some(now),
        }
    }

    /// Restart counting from `now`, discarding any partial second.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.reference = Some(now);
    }

    pub fn stop(&mut self) {
        self.reference = None;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.reference.is_some()
    }

    /// Whole seconds since the last consumed second.
    ///
    /// A stopped clock reports 0. If `now` is behind the reference (the system
    /// clock stepped backwards) the reference snaps to `now` and 0 is reported.
    pub fn tick(&mut self, now: DateTime<Utc>) -> u32 {
        let Some(reference) = self.reference else {
            return 0;
        };
        if now < reference {
            self.reference = Some(now);
            return 0;
        }

        let whole = (now - reference).num_seconds();
        if whole <= 0 {
            return 0;
        }
        self.reference = Some(reference + Duration::seconds(whole));
        u32::try_from(whole).unwrap_or(u32::MAX)
    }
}
