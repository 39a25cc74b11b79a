//! Dispatch a batch of slow commands through a sequential and a parallel engine and compare
//! wall-clock time.
//!
//! ```bash
//! cargo run -p dispatch_engine --example counting
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::bounded;
use dispatch_engine::core::{Engine, EngineThread, State};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const COMMANDS: usize = 64;
const DELAY: Duration = Duration::from_millis(10);

fn run(name: &str, engine: Engine) -> Result<()> {
    let (running, is_running) = bounded(1);
    let engine = Arc::new(engine.with_observer(move |state: State| {
        if state == State::Running {
            let _ = running.try_send(());
        }
    }));
    let executed = Arc::new(AtomicUsize::new(0));
    let started = Instant::now();

    for _ in 0..COMMANDS {
        let executed = Arc::clone(&executed);
        engine.add(move || {
            thread::sleep(DELAY);
            executed.fetch_add(1, Ordering::SeqCst);
        })?;
    }

    let dispatcher = EngineThread::spawn(Arc::clone(&engine))?;
    is_running.recv()?;
    engine.shutdown()?;
    dispatcher.join()?;
    engine.await_termination()?;

    println!(
        "{:<10} {:>2} workers  {:>4} commands  {:?}",
        name,
        engine.workers(),
        executed.load(Ordering::SeqCst),
        started.elapsed()
    );
    Ok(())
}

fn main() -> Result<()> {
    run("sequential", Engine::sequential())?;
    run("parallel", Engine::parallel())?;
    Ok(())
}
