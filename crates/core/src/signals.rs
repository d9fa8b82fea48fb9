use chrono::{DateTime, Duration, Utc};

/// Transient notifications for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// Remaining time just dropped to the low-time threshold.
    LowTime,
    /// A streak earned an extra life.
    BonusLife,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Signal {
    kind: SignalKind,
    expires_at: DateTime<Utc>,
}

/// Holds raised signals until their display window passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalBoard {
    window: Duration,
    active: Vec<Signal>,
}

impl SignalBoard {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            active: Vec::new(),
        }
    }

    /// Raise `kind` at `now`. Raising an already visible signal restarts its window.
    pub fn raise(&mut self, kind: SignalKind, now: DateTime<Utc>) {
        let expires_at = now + self.window;
        if let Some(existing) = self.active.iter_mut().find(|s| s.kind == kind) {
            existing.expires_at = expires_at;
        } else {
            self.active.push(Signal { kind, expires_at });
        }
    }

    #[must_use]
    pub fn is_active(&self, kind: SignalKind, now: DateTime<Utc>) -> bool {
        self.active
            .iter()
            .any(|s| s.kind == kind && now < s.expires_at)
    }

    /// Signals still visible at `now`, in the order they were first raised.
    #[must_use]
    pub fn active(&self, now: DateTime<Utc>) -> Vec<SignalKind> {
        self.active
            .iter()
            .filter(|s| now < s.expires_at)
            .map(|s| s.kind)
            .collect()
    }

    /// Drop expired signals.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        self.active.retain(|s| now < s.expires_at);
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}
