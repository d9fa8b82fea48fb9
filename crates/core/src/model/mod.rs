mod ids;
mod question;
mod session;
mod stats;

pub use ids::{ParseIdError, QuestionId, SessionId};

pub use question::{OPTION_COUNT, Question, QuestionDraft, QuestionError};
pub use session::{SessionPhase, SessionState, TimeUrgency};
pub use stats::{PerformanceTier, SessionStats};
