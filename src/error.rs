use std::fmt;

/// Unified error type for the palaver crate.
#[derive(Debug, Clone)]
pub enum DispatchError {
    /// Construction-time registry error: duplicate intent names, a handler
    /// set without a default entry, or an empty classifier list. Fatal —
    /// dispatcher startup fails and the error is never recovered at runtime.
    Binding(String),
    /// Every configured classifier faulted for this turn.
    Classification(String),
    /// No classifier produced a usable result for this turn.
    UnresolvedIntent,
    /// The resolved action's fulfillment operation faulted.
    Fulfillment(String),
    /// No handler matched and no default handler exists. Unreachable when
    /// the registry invariant holds; seeing it means a registry bug.
    Dispatch(String),
    /// The conversation's cancellation signal fired mid-turn.
    Cancelled,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Binding(msg) => write!(f, "binding error: {msg}"),
            DispatchError::Classification(msg) => write!(f, "classification failed: {msg}"),
            DispatchError::UnresolvedIntent => write!(f, "no winning intent selected"),
            DispatchError::Fulfillment(msg) => write!(f, "fulfillment failed: {msg}"),
            DispatchError::Dispatch(msg) => write!(f, "dispatch error: {msg}"),
            DispatchError::Cancelled => write!(f, "turn cancelled"),
        }
    }
}

impl std::error::Error for DispatchError {}

/// Result type alias using [`DispatchError`].
pub type DispatchResult<T> = Result<T, DispatchError>;
