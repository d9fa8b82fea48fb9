#![forbid(unsafe_code)]

pub mod error;
pub mod finalize;
pub mod machine;
pub mod model;
pub mod rules;
pub mod session_clock;
pub mod shuffle;
pub mod signals;
pub mod time;

pub use error::SessionError;
pub use finalize::{Finalization, finalize};
pub use machine::{Resolution, SessionMachine, Transition};
pub use rules::{GameRules, GameRulesDraft, GameRulesError};
pub use session_clock::SessionClock;
pub use signals::{SignalBoard, SignalKind};
pub use time::Clock;
