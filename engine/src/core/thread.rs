use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::{engine::Engine, error::EngineError};

/// Managed thread running an engine's dispatch loop. [`Engine::start`] blocks for the whole active
/// lifetime of the engine, so hosts run it here and keep the engine itself for `add`/`shutdown`.
pub struct EngineThread {
    handle: JoinHandle<Result<(), EngineError>>,
}

impl EngineThread {
    /// Spawn the dispatch thread and call `start` on it.
    pub fn spawn(engine: Arc<Engine>) -> std::io::Result<Self> {
        let handle = thread::Builder::new()
            .name("dispatch".into())
            .spawn(move || engine.start())?;
        Ok(Self { handle })
    }

    /// Whether `start` has returned.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Join the calling thread to the dispatch thread, yielding what `start` returned.
    pub fn join(self) -> Result<(), EngineError> {
        self.handle
            .join()
            .unwrap_or(Err(EngineError::Interrupted("the dispatch thread")))
    }
}
