//! Out-of-process evaluation.
//!
//! [`ProcessEngine`] re-runs the current executable with [`WORKER_FLAG`],
//! sends one request over stdin and reads one reply from stdout. A query
//! that overflows the stack or runs away only takes the child down, and
//! cancelling kills it.

use crate::engine::{CancelToken, JaqEngine, QueryEngine};
use crate::error::{Error, EvalError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Hidden command-line flag that turns the binary into an evaluation worker.
pub const WORKER_FLAG: &str = "--eval-worker";

const POLL_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Debug, Serialize, Deserialize)]
struct Request<'a> {
  query: Cow<'a, str>,
  compact: bool,
  input: Cow<'a, str>,
}

type Reply = std::result::Result<String, EvalError>;

/// Engine that evaluates each query in a fresh worker process.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
  program: PathBuf,
}

impl ProcessEngine {
  /// `program` must call [`serve`] when started with [`WORKER_FLAG`].
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
    }
  }

  /// Engine backed by the running executable.
  pub fn current_exe() -> Result<Self> {
    let exe =
      std::env::current_exe().map_err(|e| Error::Startup(format!("Failed to get executable path: {}", e)))?;
    Ok(Self::new(exe))
  }

  fn spawn(&self) -> std::io::Result<Child> {
    Command::new(&self.program)
      .arg(WORKER_FLAG)
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::null())
      .spawn()
  }
}

impl QueryEngine for ProcessEngine {
  fn run(&self, input: &str, query: &str, compact: bool, cancel: &CancelToken) -> Reply {
    let request = serde_json::to_vec(&Request {
      query: Cow::Borrowed(query),
      compact,
      input: Cow::Borrowed(input),
    })
    .map_err(|e| EvalError::Crashed(format!("failed to encode request: {}", e)))?;

    let mut child = self
      .spawn()
      .map_err(|e| EvalError::Crashed(format!("failed to start worker: {}", e)))?;
    debug!(pid = child.id(), "Spawned evaluation worker");

    // Both pipes are pumped on their own threads so a large request or
    // reply never blocks the cancellation check.
    let writer = child.stdin.take().map(|mut stdin| {
      thread::spawn(move || {
        // Broken pipe means the worker already died; its exit status says why
        let _ = stdin.write_all(&request);
      })
    });
    let (tx, rx) = mpsc::channel();
    if let Some(mut stdout) = child.stdout.take() {
      thread::spawn(move || {
        let mut reply = Vec::new();
        let _ = tx.send(stdout.read_to_end(&mut reply).map(|_| reply));
      });
    }

    let reply = loop {
      if cancel.is_cancelled() {
        kill(&mut child);
        return Err(EvalError::Cancelled);
      }
      match rx.recv_timeout(POLL_INTERVAL) {
        Ok(reply) => break reply,
        Err(RecvTimeoutError::Timeout) => continue,
        Err(RecvTimeoutError::Disconnected) => break Ok(Vec::new()),
      }
    };

    let status = child
      .wait()
      .map_err(|e| EvalError::Crashed(format!("failed to wait for worker: {}", e)))?;
    if let Some(writer) = writer {
      let _ = writer.join();
    }
    let reply = reply.map_err(|e| EvalError::Crashed(format!("failed to read worker reply: {}", e)))?;

    if !status.success() {
      warn!(%status, query, "Evaluation worker died");
      return Err(EvalError::Crashed(status.to_string()));
    }
    serde_json::from_slice::<Reply>(&reply)
      .map_err(|e| EvalError::Crashed(format!("unreadable worker reply: {}", e)))?
  }
}

fn kill(child: &mut Child) {
  if let Err(e) = child.kill() {
    debug!("Worker already gone: {}", e);
  }
  let _ = child.wait();
}

/// Worker side: read one request, evaluate it with [`JaqEngine`] and write
/// the reply.
pub fn serve(reader: impl Read, mut writer: impl Write) -> Result<()> {
  let reply: Reply = match serde_json::from_reader::<_, Request<'static>>(reader) {
    Ok(request) => JaqEngine::new().run(&request.input, &request.query, request.compact, &CancelToken::new()),
    Err(e) => Err(EvalError::Crashed(format!("malformed request: {}", e))),
  };
  serde_json::to_writer(&mut writer, &reply).map_err(std::io::Error::from)?;
  writer.flush()?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn serve_request(request: &Request) -> Reply {
    let mut out = Vec::new();
    serve(&serde_json::to_vec(request).unwrap()[..], &mut out).unwrap();
    serde_json::from_slice(&out).unwrap()
  }

  #[test]
  fn test_serve_evaluates() {
    let reply = serve_request(&Request {
      query: ".d".into(),
      compact: true,
      input: r#"{"d":["e","f"]}"#.into(),
    });
    assert_eq!(reply, Ok("[\"e\",\"f\"]\n".to_string()));
  }

  #[test]
  fn test_serve_reports_errors() {
    let reply = serve_request(&Request {
      query: ".a |".into(),
      compact: false,
      input: "{}".into(),
    });
    assert!(matches!(reply, Err(EvalError::Syntax(_))));
  }

  #[test]
  fn test_serve_rejects_garbage() {
    let mut out = Vec::new();
    serve(&b"not json"[..], &mut out).unwrap();
    let reply: Reply = serde_json::from_slice(&out).unwrap();
    assert!(matches!(reply, Err(EvalError::Crashed(_))));
  }

  struct ClosedPipe;

  impl Write for ClosedPipe {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
      Err(std::io::ErrorKind::BrokenPipe.into())
    }

    fn flush(&mut self) -> std::io::Result<()> {
      Ok(())
    }
  }

  #[test]
  fn test_serve_write_failure_is_io_error() {
    let request = serde_json::to_vec(&Request {
      query: ".".into(),
      compact: true,
      input: "1".into(),
    })
    .unwrap();
    assert!(matches!(serve(&request[..], ClosedPipe), Err(Error::Io(_))));
  }

  #[test]
  fn test_missing_program() {
    let engine = ProcessEngine::new("/nonexistent/jqlive-worker");
    assert!(matches!(
      engine.run("{}", ".", false, &CancelToken::new()),
      Err(EvalError::Crashed(msg)) if msg.starts_with("failed to start worker")
    ));
  }
}
