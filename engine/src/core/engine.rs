use log::{debug, info, warn};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use super::{
    command::Command,
    error::EngineError,
    observer::StateObserver,
    queue::{Message, Queue},
    signal,
    state::State,
    tasks::Executor,
};

/// The engine's core structure. Commands are queued with [`add`](Engine::add), pulled off the
/// queue in FIFO order by a single dispatch loop running inside [`start`](Engine::start) and handed
/// to an [`Executor`] for asynchronous execution.
///
/// An engine is single use: it moves through `Created -> Running -> ShuttingDown -> ShutDown`
/// exactly once. Share it behind an `Arc`; every operation takes `&self`.
pub struct Engine {
    state: Mutex<State>,
    queue: Queue,
    executor: Executor,
    observer: Option<Box<dyn StateObserver>>,
    /// Thread currently inside the observer, if any.
    notifying: Mutex<Option<ThreadId>>,
}

impl Engine {
    /// Engine executing commands one at a time, in the order they were added.
    pub fn sequential() -> Self {
        Self::with_executor(Executor::single_threaded())
    }

    /// Engine executing commands concurrently on one worker per hardware thread.
    pub fn parallel() -> Self {
        Self::with_executor(Executor::parallel())
    }

    fn with_executor(executor: Executor) -> Self {
        Self {
            state: Mutex::new(State::Created),
            queue: Queue::new(),
            executor,
            observer: None,
            notifying: Mutex::new(None),
        }
    }

    /// Register the observer notified of every state transition.
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: StateObserver + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        *self.lock_state()
    }

    /// Number of worker threads commands are executed on.
    pub fn workers(&self) -> usize {
        self.executor.size()
    }

    /// Number of queued items not yet taken by the dispatch loop.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queue a command. Allowed before `start`; rejected once shutdown has begun.
    pub fn add<C>(&self, command: C) -> Result<(), EngineError>
    where
        C: Command,
    {
        self.add_boxed(Box::new(command))
    }

    /// Queue an already boxed command. See [`add`](Self::add).
    pub fn add_boxed(&self, command: Box<dyn Command>) -> Result<(), EngineError> {
        // Held across the put so no command can land behind the drain marker.
        let state = self.lock_state();
        if !state.accepts_commands() {
            return Err(EngineError::Closed { state: *state });
        }
        self.queue.put(Message::Command(command))
    }

    /// Run the dispatch loop on the calling thread. Blocks until the engine has been shut down.
    pub fn start(&self) -> Result<(), EngineError> {
        {
            let mut state = self.lock_state();
            let current = *state;
            match current {
                State::Created => self.advance(&mut state, State::Running),
                State::Running => return Err(EngineError::AlreadyStarted),
                State::ShuttingDown | State::ShutDown => {
                    return Err(EngineError::Terminated { state: current });
                }
            }
        }
        info!("Engine running on {} workers", self.executor.size());

        let result = self.dispatch();
        info!("Dispatch loop finished");
        result
    }

    fn dispatch(&self) -> Result<(), EngineError> {
        while self.state().is_active() {
            match self.queue.take()? {
                Message::Command(command) => {
                    if let Err(err) = self.executor.execute(move || command.execute()) {
                        warn!("Command could not be dispatched: {}", err);
                    }
                }
                Message::Drain(release) => {
                    debug!("Drain marker reached");
                    release.release();
                }
                Message::Halt => debug!("Dispatch loop halted"),
            }
        }
        Ok(())
    }

    /// Drain and stop the engine.
    ///
    /// Returns once every command added before this call has been handed to a worker and the
    /// workers have been told to stop. Commands still executing keep running; see
    /// [`await_termination`](Self::await_termination).
    pub fn shutdown(&self) -> Result<(), EngineError> {
        let released = {
            let mut state = self.lock_state();
            if *state != State::Running {
                return Err(EngineError::InvalidState {
                    operation: "shut down",
                    state: *state,
                });
            }
            self.advance(&mut state, State::ShuttingDown);
            let (release, released) = signal::one_shot();
            self.queue.put(Message::Drain(release))?;
            released
        };
        info!("Engine shutting down");

        released.wait()?;
        self.executor.shutdown();

        let mut state = self.lock_state();
        self.advance(&mut state, State::ShutDown);
        // Wake the dispatch loop so `start` can return.
        self.queue.put(Message::Halt)?;
        info!("Engine shut down");
        Ok(())
    }

    /// Block until every dispatched command has finished and the workers have exited.
    pub fn await_termination(&self) -> Result<(), EngineError> {
        let state = self.state();
        if state != State::ShutDown {
            return Err(EngineError::InvalidState {
                operation: "await termination",
                state,
            });
        }
        self.executor.join();
        Ok(())
    }

    fn advance(&self, state: &mut MutexGuard<'_, State>, to: State) {
        debug_assert!(state.can_advance_to(to), "{} -> {}", **state, to);
        **state = to;
        debug!("Engine state changed to {}", to);
        if let Some(observer) = &self.observer {
            let _notifying = Notifying::enter(&self.notifying);
            observer.on_state_change(to);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        debug_assert!(
            !Notifying::is_current(&self.notifying),
            "state observer called back into the engine"
        );
        lock(&self.state)
    }
}

/// Marks the calling thread as inside the observer until dropped.
struct Notifying<'a>(&'a Mutex<Option<ThreadId>>);

impl<'a> Notifying<'a> {
    fn enter(slot: &'a Mutex<Option<ThreadId>>) -> Self {
        *lock(slot) = Some(thread::current().id());
        Notifying(slot)
    }

    fn is_current(slot: &Mutex<Option<ThreadId>>) -> bool {
        *lock(slot) == Some(thread::current().id())
    }
}

impl Drop for Notifying<'_> {
    fn drop(&mut self) {
        *lock(self.0) = None;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
