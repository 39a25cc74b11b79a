//! One-shot release signal used by the shutdown handshake.
//!
//! Built on a single-slot crossbeam channel, the same way the executor hands task results back:
//! the releasing side can fire before anyone waits without the signal being lost.

use crossbeam::channel::{Receiver, Sender, bounded};

use super::error::EngineError;

/// Fires the signal. Consumed on use.
#[derive(Debug)]
pub struct Release {
    sender: Sender<()>,
}

/// Waits for the matching [`Release`].
#[derive(Debug)]
pub struct Released {
    receiver: Receiver<()>,
}

/// Create a connected release/wait pair.
pub fn one_shot() -> (Release, Released) {
    let (sender, receiver) = bounded(1);
    (Release { sender }, Released { receiver })
}

impl Release {
    pub fn release(self) {
        // The waiter may have gone away; nothing left to tell.
        let _ = self.sender.send(());
    }
}

impl Released {
    /// Block until released. Fails if the `Release` was dropped without firing.
    pub fn wait(self) -> Result<(), EngineError> {
        self.receiver
            .recv()
            .map_err(|_| EngineError::Interrupted("the release signal"))
    }
}
