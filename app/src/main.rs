mod control;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossbeam::channel::Receiver;
use log::LevelFilter;
use rustyline::Editor;
use rustyline::error::ReadlineError;

use dispatch_engine::core::{
    Engine,
    log::{ChannelLogger, LogMessage},
};

use control::{Control, HELP, Request};

/// Interactive driver for a dispatch engine.
#[derive(Parser, Debug)]
#[command(name = "dispatch", version)]
struct Args {
    /// Execute commands on one worker per hardware thread instead of a single worker
    #[arg(long)]
    parallel: bool,

    /// How long each demo command sleeps, in milliseconds
    #[arg(long, default_value_t = 100)]
    delay_ms: u64,

    /// Most verbose log level shown between prompts
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

fn flush(log_recv: &Receiver<LogMessage>) {
    for msg in log_recv.try_iter() {
        println!("{:<5} {}: {}", msg.level, msg.target, msg.message);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let (logger, log_recv) = ChannelLogger::with_receiver(args.log_level);
    logger.init()?;

    let engine = if args.parallel {
        Engine::parallel()
    } else {
        Engine::sequential()
    };
    let mut control = Control::new(engine, Duration::from_millis(args.delay_ms));

    println!("{}", HELP);
    let mut editor = Editor::<()>::new();
    loop {
        flush(&log_recv);
        let line = match editor.readline("dispatch> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => "exit".to_string(),
            Err(err) => return Err(err.into()),
        };
        if line.trim().is_empty() {
            continue;
        }
        editor.add_history_entry(line.as_str());

        let keep_going = match line.parse::<Request>() {
            Ok(request) => control.handle(request).unwrap_or_else(|err| {
                println!("error: {:#}", err);
                true
            }),
            Err(err) => {
                println!("error: {:#}", err);
                true
            }
        };
        if !keep_going {
            break;
        }
    }
    flush(&log_recv);
    Ok(())
}
