use thiserror::Error;

use super::state::State;

/// Errors raised by the engine's lifecycle operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// `add` was called once shutdown had begun.
    #[error("cannot enqueue commands: engine is {state}")]
    Closed { state: State },

    /// `start` was called while the engine was already running.
    #[error("cannot start engine: it has been started already")]
    AlreadyStarted,

    /// `start` was called after shutdown had begun. Engines are not reusable.
    #[error("cannot start engine: it is {state}")]
    Terminated { state: State },

    /// The operation needs a state the engine is not in.
    #[error("cannot {operation}: engine is {state}")]
    InvalidState {
        operation: &'static str,
        state: State,
    },

    /// A blocking wait lost its counterpart, e.g. the dispatch thread died.
    #[error("interrupted while waiting for {0}")]
    Interrupted(&'static str),
}

impl EngineError {
    /// Whether this error was raised because of the engine's current lifecycle state.
    pub fn is_invalid_state(&self) -> bool {
        !matches!(self, EngineError::Interrupted(_))
    }
}
