use thiserror::Error;

/// Errors surfaced by recognizer operations.
///
/// Precondition failures (`NotEnabled`, `NotInitialized`, `InvalidArgument`,
/// `OperationInProgress`) are reported as an immediately-failed operation,
/// before any engine work starts. `EngineFailure` only ever arrives through
/// an operation's terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognizerError {
    /// Operation attempted while the recognizer is disabled
    #[error("recognizer is disabled")]
    NotEnabled,

    /// Operation attempted before init() wired a site
    #[error("recognizer has no site; call init() first")]
    NotInitialized,

    /// A conflicting recognition mode is already active on the session
    #[error("another recognition operation is already in progress")]
    OperationInProgress,

    /// Caller passed a bad argument (e.g. an empty keyword)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Wrapped failure from the external recognition engine
    #[error("recognition engine failure: {0}")]
    EngineFailure(String),

    /// Operation was intentionally aborted
    #[error("operation cancelled")]
    Cancelled,
}
