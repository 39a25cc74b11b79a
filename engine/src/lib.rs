//! A command dispatch engine.
//!
//! Commands are queued on an [`Engine`](core::Engine) from any number of threads, taken off the
//! queue in FIFO order by a single dispatch loop and executed on a worker pool, either one at a
//! time ([`Engine::sequential`](core::Engine::sequential)) or concurrently
//! ([`Engine::parallel`](core::Engine::parallel)).
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use dispatch_engine::core::{Engine, EngineThread};
//!
//! let engine = Arc::new(Engine::sequential());
//! engine.add(|| println!("hello"))?;
//!
//! let thread = EngineThread::spawn(Arc::clone(&engine))?;
//! engine.shutdown()?;
//! thread.join()?;
//! engine.await_termination()?;
//! ```

pub mod core;
