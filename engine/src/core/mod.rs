pub mod command;
pub mod engine;
pub mod error;
pub mod log;
pub mod observer;
pub mod state;
pub mod tasks;
pub mod thread;
mod queue;
mod signal;

pub use command::Command;
pub use engine::Engine;
pub use error::EngineError;
pub use observer::StateObserver;
pub use state::State;
pub use thread::EngineThread;
