use crossbeam::channel::{Receiver, Sender, unbounded};

use super::{command::Command, error::EngineError, signal::Release};

/// Items travelling through the engine's pending queue.
///
/// User commands and the engine's own control messages share one FIFO channel so that control
/// messages are ordered relative to every command enqueued before them.
pub enum Message {
    /// A user command waiting to be handed to the workers.
    Command(Box<dyn Command>),
    /// Drain marker. Everything ahead of it has been dispatched once it is taken.
    Drain(Release),
    /// Final wake-up for the dispatch loop once the engine is shut down.
    Halt,
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::Command(_) => f.write_str("Command"),
            Message::Drain(_) => f.write_str("Drain"),
            Message::Halt => f.write_str("Halt"),
        }
    }
}

/// Unbounded, multi-producer FIFO of pending [`Message`]s with a single blocking consumer.
pub struct Queue {
    sender: Sender<Message>,
    receiver: Receiver<Message>,
}

impl Queue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Append a message. Never blocks.
    pub fn put(&self, message: Message) -> Result<(), EngineError> {
        self.sender
            .send(message)
            .map_err(|_| EngineError::Interrupted("the pending queue"))
    }

    /// Take the oldest message, blocking while the queue is empty.
    pub fn take(&self) -> Result<Message, EngineError> {
        self.receiver
            .recv()
            .map_err(|_| EngineError::Interrupted("the pending queue"))
    }

    /// Number of messages waiting to be taken.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}
