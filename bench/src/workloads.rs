//! Command workloads and a helper running one full engine lifecycle over them.

use std::hint::black_box;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::bounded;
use dispatch_engine::core::{Engine, EngineError, EngineThread, State};

/// What each benchmark command does when executed.
#[derive(Debug, Clone, Copy)]
pub enum Work {
    /// Return immediately.
    Noop,
    /// Busy loop for the given number of iterations.
    Spin(u32),
    /// Sleep, like a command waiting on I/O.
    Sleep(Duration),
}

impl Work {
    fn run(self) {
        match self {
            Work::Noop => {}
            Work::Spin(iterations) => {
                let mut acc = 0u64;
                for i in 0..iterations {
                    acc = acc.wrapping_add(black_box(i as u64));
                }
                black_box(acc);
            }
            Work::Sleep(duration) => thread::sleep(duration),
        }
    }
}

/// Outcome of [`run_batch`].
#[derive(Debug, Clone, Copy)]
pub struct BatchReport {
    pub executed: usize,
    pub elapsed: Duration,
}

/// Queue `commands` commands on `engine`, run it to shutdown and wait for every command to finish.
pub fn run_batch(engine: Engine, commands: usize, work: Work) -> Result<BatchReport, EngineError> {
    let (running, is_running) = bounded(1);
    let engine = Arc::new(engine.with_observer(move |state: State| {
        if state == State::Running {
            let _ = running.try_send(());
        }
    }));
    let executed = Arc::new(AtomicUsize::new(0));
    let started = Instant::now();

    for _ in 0..commands {
        let executed = Arc::clone(&executed);
        engine.add(move || {
            work.run();
            executed.fetch_add(1, Ordering::Relaxed);
        })?;
    }

    let dispatcher = EngineThread::spawn(Arc::clone(&engine))
        .map_err(|_| EngineError::Interrupted("the dispatch thread to spawn"))?;
    is_running
        .recv()
        .map_err(|_| EngineError::Interrupted("the engine to start"))?;
    engine.shutdown()?;
    dispatcher.join()?;
    engine.await_termination()?;

    Ok(BatchReport {
        executed: executed.load(Ordering::Relaxed),
        elapsed: started.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_executes_everything() {
        let report = run_batch(Engine::sequential(), 50, Work::Spin(100)).unwrap();
        assert_eq!(report.executed, 50);

        let report = run_batch(Engine::parallel(), 50, Work::Noop).unwrap();
        assert_eq!(report.executed, 50);
    }

    #[test]
    fn test_parallel_overlaps_sleeping_commands() {
        let engine = Engine::parallel();
        if engine.workers() < 2 {
            return;
        }
        let workers = engine.workers();
        let report = run_batch(engine, workers * 4, Work::Sleep(Duration::from_millis(20))).unwrap();
        assert_eq!(report.executed, workers * 4);
        // Sequential would need workers * 80ms
        assert!(report.elapsed < Duration::from_millis(20) * (workers as u32) * 4);
    }
}
