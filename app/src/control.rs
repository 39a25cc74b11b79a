use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use crossbeam::channel::{Receiver, bounded};
use log::info;

use dispatch_engine::core::{Engine, EngineThread, State};

/// A line typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum Request {
    Add(usize),
    Start,
    Shutdown,
    State,
    Wait,
    Help,
    Exit,
}

impl FromStr for Request {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let request = match words.next() {
            Some("add") => {
                let count = match words.next() {
                    Some(n) => n.parse().with_context(|| format!("not a count: {}", n))?,
                    None => 1,
                };
                Request::Add(count)
            }
            Some("start") => Request::Start,
            Some("shutdown") | Some("stop") => Request::Shutdown,
            Some("state") => Request::State,
            Some("wait") => Request::Wait,
            Some("help") => Request::Help,
            Some("exit") | Some("quit") => Request::Exit,
            Some(other) => bail!("unknown command: {}", other),
            None => bail!("empty command"),
        };
        if let Some(extra) = words.next() {
            bail!("unexpected argument: {}", extra);
        }
        Ok(request)
    }
}

pub const HELP: &str = "\
add [n]    queue n demo commands (default 1)
start      start the engine on its dispatch thread
shutdown   drain the queue and stop the engine
state      print the engine state and counters
wait       block until every dispatched command has finished
exit       shut down if running, wait, and leave";

/// Drives one engine from the REPL.
pub struct Control {
    engine: Arc<Engine>,
    dispatcher: Option<EngineThread>,
    running: Receiver<()>,
    delay: Duration,
    submitted: usize,
    executed: Arc<AtomicUsize>,
}

impl Control {
    pub fn new(engine: Engine, delay: Duration) -> Self {
        let (started, running) = bounded(1);
        let engine = engine.with_observer(move |state: State| {
            if state == State::Running {
                let _ = started.try_send(());
            }
        });
        Self {
            engine: Arc::new(engine),
            dispatcher: None,
            running,
            delay,
            submitted: 0,
            executed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle one request. Returns `false` once the REPL should exit.
    pub fn handle(&mut self, request: Request) -> Result<bool> {
        match request {
            Request::Add(count) => self.add(count)?,
            Request::Start => self.start()?,
            Request::Shutdown => self.shutdown()?,
            Request::State => println!("{}", self.status()),
            Request::Wait => self.wait()?,
            Request::Help => println!("{}", HELP),
            Request::Exit => {
                if self.engine.state() == State::Running {
                    self.shutdown()?;
                }
                if self.engine.state() == State::ShutDown {
                    self.wait()?;
                }
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn status(&self) -> String {
        format!(
            "{} | {} workers | {} pending | {}/{} executed",
            self.engine.state(),
            self.engine.workers(),
            self.engine.pending(),
            self.executed.load(Ordering::SeqCst),
            self.submitted
        )
    }

    fn add(&mut self, count: usize) -> Result<()> {
        for _ in 0..count {
            let id = self.submitted;
            let delay = self.delay;
            let executed = Arc::clone(&self.executed);
            self.engine.add(move || {
                thread::sleep(delay);
                executed.fetch_add(1, Ordering::SeqCst);
                info!("Command {} done", id);
            })?;
            self.submitted += 1;
        }
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        if self.dispatcher.is_some() {
            bail!("engine is {}, it can only be started once", self.engine.state());
        }
        self.dispatcher = Some(EngineThread::spawn(Arc::clone(&self.engine))?);
        self.running
            .recv()
            .map_err(|_| anyhow!("dispatch thread exited before running"))?;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.engine.shutdown()?;
        if let Some(dispatcher) = self.dispatcher.take() {
            dispatcher.join()?;
        }
        Ok(())
    }

    fn wait(&self) -> Result<()> {
        self.engine.await_termination()?;
        println!("{}", self.status());
        Ok(())
    }

    pub fn executed(&self) -> usize {
        self.executed.load(Ordering::SeqCst)
    }
}
