use std::fmt;

/// Enumeration of possible states the engine can be in.
///
/// States only ever move forward, in declaration order. `Created -> Running` is the only way in and
/// `ShuttingDown -> ShutDown` the only way out.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
#[derive(Debug)]
#[derive(Copy, Clone)]
pub enum State {
    /// The engine has never been started
    Created,
    /// The engine is running its dispatch loop
    Running,
    /// Shutdown was requested and the queue is being drained
    ShuttingDown,
    /// The engine has stopped and handed its workers the shutdown request
    ShutDown,
}

impl State {
    /// The single state this one may advance to, if any.
    pub fn next(self) -> Option<State> {
        match self {
            State::Created => Some(State::Running),
            State::Running => Some(State::ShuttingDown),
            State::ShuttingDown => Some(State::ShutDown),
            State::ShutDown => None,
        }
    }

    /// Whether moving from `self` to `to` is a legal single step forward.
    pub fn can_advance_to(self, to: State) -> bool {
        self.next() == Some(to)
    }

    /// Whether the dispatch loop should keep consuming the queue.
    pub fn is_active(self) -> bool {
        matches!(self, State::Running | State::ShuttingDown)
    }

    /// Whether new commands may still be enqueued.
    pub fn accepts_commands(self) -> bool {
        matches!(self, State::Created | State::Running)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Created => "created",
            State::Running => "running",
            State::ShuttingDown => "shutting down",
            State::ShutDown => "shut down",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_advance_one_step_at_a_time() {
        assert!(State::Created.can_advance_to(State::Running));
        assert!(State::Running.can_advance_to(State::ShuttingDown));
        assert!(State::ShuttingDown.can_advance_to(State::ShutDown));

        assert!(!State::Created.can_advance_to(State::ShuttingDown));
        assert!(!State::Created.can_advance_to(State::ShutDown));
        assert!(!State::ShutDown.can_advance_to(State::Created));
        assert!(!State::Running.can_advance_to(State::Running));
        assert_eq!(State::ShutDown.next(), None);
    }

    #[test]
    fn test_states_are_ordered() {
        assert!(State::Created < State::Running);
        assert!(State::Running < State::ShuttingDown);
        assert!(State::ShuttingDown < State::ShutDown);
    }

    #[test]
    fn test_active_and_accepting_states() {
        assert!(!State::Created.is_active());
        assert!(State::Running.is_active());
        assert!(State::ShuttingDown.is_active());
        assert!(!State::ShutDown.is_active());

        assert!(State::Created.accepts_commands());
        assert!(State::Running.accepts_commands());
        assert!(!State::ShuttingDown.accepts_commands());
        assert!(!State::ShutDown.accepts_commands());
    }

    #[test]
    fn test_display() {
        assert_eq!(State::ShuttingDown.to_string(), "shutting down");
        assert_eq!(State::ShutDown.to_string(), "shut down");
    }
}
