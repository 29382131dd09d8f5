//! Commands produced by the reactive core and the scheduler that runs them.

use crate::event::Msg;
use jqlive_core::Error;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// Side effects requested by [`App::update`](crate::app::App::update).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  /// Deliver one `Msg::Tick` after the delay
  ScheduleTick(Duration),
  /// Print a line above the live view
  Print(String),
  /// Write `contents` to `path`, answering with `Msg::Saved`
  Save { path: PathBuf, contents: String },
  /// Stop the event loop
  Quit,
}

/// What the runtime has to do itself after a batch of commands ran.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Outcome {
  pub printed: Vec<String>,
  pub quit: bool,
}

/// Runs commands on the tokio runtime and feeds their results back into
/// the message queue.
///
/// Timers and file writes are spawned, so `execute` never blocks.
#[derive(Debug, Clone)]
pub struct Scheduler {
  tx: UnboundedSender<Msg>,
}

impl Scheduler {
  pub fn new(tx: UnboundedSender<Msg>) -> Self {
    Self { tx }
  }

  pub fn execute(&self, commands: Vec<Command>) -> Outcome {
    let mut outcome = Outcome::default();

    for command in commands {
      match command {
        Command::ScheduleTick(delay) => {
          let tx = self.tx.clone();
          tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Closed channel means the loop already exited
            let _ = tx.send(Msg::Tick);
          });
        }
        Command::Print(line) => outcome.printed.push(line),
        Command::Save { path, contents } => {
          let tx = self.tx.clone();
          tokio::spawn(async move {
            let result = write_output(path, contents).await;
            let _ = tx.send(Msg::Saved(result));
          });
        }
        Command::Quit => {
          debug!("Quit requested");
          outcome.quit = true;
        }
      }
    }

    outcome
  }
}

async fn write_output(path: PathBuf, contents: String) -> Result<PathBuf, Error> {
  match tokio::fs::write(&path, contents.as_bytes()).await {
    Ok(()) => {
      info!(path = %path.display(), bytes = contents.len(), "Saved output");
      Ok(path)
    }
    Err(source) => {
      warn!(path = %path.display(), "Failed to save output: {}", source);
      Err(Error::Save { path, source })
    }
  }
}
