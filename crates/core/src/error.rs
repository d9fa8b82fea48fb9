use thiserror::Error;

/// Contract violations rejected by the session state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    EmptyPool,

    #[error("session has not been started")]
    NotActive,

    #[error("answer `{0}` is not an option of the current question")]
    UnknownOption(String),

    #[error("previous answer feedback is still pending")]
    FeedbackPending,
}
