use crossbeam::channel::{Receiver, Sender, unbounded};
use log::{debug, warn};
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;

type Task = Box<dyn FnOnce() + Send + 'static>;

/// A concurrent task executor based on a thread pool pattern.
/// Tasks can be submitted from any thread and will be executed by worker threads.
///
/// Shutting the executor down closes its submission channel: already accepted tasks still run,
/// new ones are rejected, and every worker exits once the channel is drained.
pub struct Executor {
    sender: Mutex<Option<Sender<Task>>>,
    workers: Mutex<Vec<Worker>>,
    size: usize,
}

struct Worker {
    id: usize,
    handle: Option<thread::JoinHandle<()>>,
}

/// Error type for task submission failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// The executor no longer accepts tasks.
    #[error("executor has been shut down")]
    Rejected,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Executor {
    /// Creates a new executor with the specified number of worker threads.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "Thread pool size must be greater than 0");

        let (sender, receiver) = unbounded();
        let mut workers = Vec::with_capacity(size);

        for id in 0..size {
            workers.push(Worker::new(id, receiver.clone()));
        }

        Executor {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            size,
        }
    }

    /// Creates a single-threaded executor. Tasks run one at a time in submission order.
    pub fn single_threaded() -> Self {
        Self::new(1)
    }

    /// Creates an executor with one worker per unit of available hardware parallelism.
    pub fn parallel() -> Self {
        let size = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self::new(size)
    }

    /// Executes a task on the thread pool.
    /// Tasks are started in FIFO order, but completion order is non-deterministic.
    pub fn execute<F>(&self, f: F) -> Result<(), TaskError>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = lock(&self.sender);
        let sender = sender.as_ref().ok_or(TaskError::Rejected)?;
        sender.send(Box::new(f)).map_err(|_| TaskError::Rejected)
    }

    /// Stops accepting tasks. Returns immediately; workers finish every accepted task and exit.
    pub fn shutdown(&self) {
        if lock(&self.sender).take().is_some() {
            debug!("Executor shutdown requested ({} workers)", self.size);
        }
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_shutdown(&self) -> bool {
        lock(&self.sender).is_none()
    }

    /// Blocks until every worker has exited. Only returns once [`shutdown`](Self::shutdown) has
    /// been requested and all accepted tasks have finished.
    ///
    /// Concurrent callers all wait for the same workers. Called from a worker thread (for example
    /// when a task drops the last handle to the executor), that worker is skipped.
    pub fn join(&self) {
        let current = thread::current().id();
        // Held until every handle is joined so later callers block too.
        let mut workers = lock(&self.workers);
        for worker in workers.iter_mut() {
            let Some(handle) = worker
                .handle
                .take_if(|handle| handle.thread().id() != current)
            else {
                continue;
            };
            if handle.join().is_err() {
                warn!("Worker {} terminated abnormally", worker.id);
            }
        }
    }

    /// Returns the number of worker threads in the pool.
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Drop for Executor {
    fn drop(&mut self) {
        self.shutdown();
        self.join();
    }
}

impl Worker {
    fn new(id: usize, receiver: Receiver<Task>) -> Self {
        let handle = thread::spawn(move || {
            // recv keeps yielding buffered tasks after the sender is gone
            while let Ok(task) = receiver.recv() {
                if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                    warn!("Task panicked on worker {}", id);
                }
            }
            debug!("Worker {} exiting", id);
        });

        Worker {
            id,
            handle: Some(handle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_executor_executes_tasks() {
        let executor = Executor::new(4);
        let counter = Arc::new(Mutex::new(0));

        for _ in 0..10 {
            let counter = Arc::clone(&counter);
            executor
                .execute(move || {
                    let mut num = counter.lock().unwrap();
                    *num += 1;
                })
                .unwrap();
        }

        executor.shutdown();
        executor.join();

        assert_eq!(*counter.lock().unwrap(), 10);
    }

    #[test]
    fn test_executor_from_multiple_threads() {
        let executor = Arc::new(Executor::new(2));
        let counter = Arc::new(AtomicUsize::new(0));

        let submitters: Vec<_> = (0..2)
            .map(|_| {
                let executor = Arc::clone(&executor);
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..5 {
                        let counter = Arc::clone(&counter);
                        executor
                            .execute(move || {
                                counter.fetch_add(1, Ordering::SeqCst);
                            })
                            .unwrap();
                    }
                })
            })
            .collect();

        for submitter in submitters {
            submitter.join().unwrap();
        }

        executor.shutdown();
        executor.join();

        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_executor_graceful_shutdown() {
        let executor = Executor::new(2);
        let completed = Arc::new(Mutex::new(false));

        let completed_clone = Arc::clone(&completed);
        executor
            .execute(move || {
                thread::sleep(Duration::from_millis(50));
                let mut done = completed_clone.lock().unwrap();
                *done = true;
            })
            .unwrap();

        // Drop executor to trigger shutdown
        drop(executor);

        // Task should have completed before shutdown
        assert!(*completed.lock().unwrap());
    }

    #[test]
    fn test_shutdown_does_not_wait_for_tasks() {
        let executor = Executor::single_threaded();
        let (tx, rx) = crossbeam::channel::bounded::<()>(0);

        executor
            .execute(move || {
                let _ = rx.recv();
            })
            .unwrap();

        // Returns although the only worker is still blocked
        executor.shutdown();
        assert!(executor.is_shutdown());

        tx.send(()).unwrap();
        executor.join();
    }

    #[test]
    fn test_rejects_tasks_after_shutdown() {
        let executor = Executor::new(2);
        executor.shutdown();

        let ran = Arc::new(AtomicUsize::new(0));
        let ran_clone = Arc::clone(&ran);
        let result = executor.execute(move || {
            ran_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(result, Err(TaskError::Rejected));
        executor.join();
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_single_threaded_runs_in_order() {
        let executor = Executor::single_threaded();
        let order = Arc::new(Mutex::new(vec![]));

        for i in 0..20 {
            let order = Arc::clone(&order);
            executor
                .execute(move || {
                    order.lock().unwrap().push(i);
                })
                .unwrap();
        }

        executor.shutdown();
        executor.join();

        assert_eq!(*order.lock().unwrap(), (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_panicking_task_does_not_kill_worker() {
        let executor = Executor::single_threaded();
        let counter = Arc::new(AtomicUsize::new(0));

        executor.execute(|| {
            panic!("boom");
        }).unwrap();
        let counter_clone = Arc::clone(&counter);
        executor
            .execute(move || {
                counter_clone.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        executor.shutdown();
        executor.join();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_every_join_waits_for_running_tasks() {
        let executor = Arc::new(Executor::single_threaded());
        let finished = Arc::new(AtomicBool::new(false));
        let (go, wait) = crossbeam::channel::bounded::<()>(0);

        let finished_clone = Arc::clone(&finished);
        executor
            .execute(move || {
                let _ = wait.recv();
                finished_clone.store(true, Ordering::SeqCst);
            })
            .unwrap();
        executor.shutdown();

        let joiners: Vec<_> = (0..2)
            .map(|_| {
                let executor = Arc::clone(&executor);
                let finished = Arc::clone(&finished);
                thread::spawn(move || {
                    executor.join();
                    finished.load(Ordering::SeqCst)
                })
            })
            .collect();

        // Give both joiners time to block on the running task
        thread::sleep(Duration::from_millis(50));
        go.send(()).unwrap();

        for joiner in joiners {
            assert!(joiner.join().unwrap());
        }
    }

    #[test]
    fn test_dropped_from_its_own_worker() {
        let executor = Arc::new(Executor::new(2));
        let (go, wait) = crossbeam::channel::bounded::<()>(0);
        let (done, dropped) = crossbeam::channel::bounded::<()>(1);

        let last = Arc::clone(&executor);
        executor
            .execute(move || {
                let _ = wait.recv();
                // Runs Drop, and with it join, on this worker
                drop(last);
                let _ = done.send(());
            })
            .unwrap();
        executor.shutdown();
        drop(executor);

        go.send(()).unwrap();
        assert_eq!(dropped.recv_timeout(Duration::from_secs(5)), Ok(()));
    }

    #[test]
    fn test_parallel_size_matches_hardware() {
        let executor = Executor::parallel();
        let expected = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        assert_eq!(executor.size(), expected);
        assert_eq!(Executor::single_threaded().size(), 1);
    }
}
