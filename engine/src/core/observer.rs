use super::state::State;

/// Receives every lifecycle transition of an [`Engine`](super::Engine).
///
/// Called synchronously on the thread that caused the transition, right after the new state is
/// stored and before that thread continues with the operation. The engine's state lock is held
/// during the call, so notifications arrive in transition order and implementations must not call
/// back into the engine: doing so deadlocks, and panics instead in debug builds.
pub trait StateObserver: Send + Sync {
    fn on_state_change(&self, state: State);
}

impl<F> StateObserver for F
where
    F: Fn(State) + Send + Sync,
{
    fn on_state_change(&self, state: State) {
        self(state)
    }
}
