mod game;
mod ticker;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use game::{GameSession, SessionStep};
pub use ticker::run_ticker;
pub use view::SessionSnapshot;
pub use workflow::GameLoopService;
