use crate::engine::{CancelToken, QueryEngine};
use crate::error::EvalError;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Rendering of a `null` result; treated as a failure.
pub const NULL_RENDER: &str = "null\n";

/// Default evaluation deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Boundary around the query engine.
///
/// Every evaluation runs on a worker thread so that panics and runaway
/// queries surface as [`EvalError`]s instead of reaching the event loop.
/// When the deadline passes the engine's [`CancelToken`] fires. Faults that
/// no thread survives (stack overflow) need an out-of-process engine such
/// as [`ProcessEngine`](crate::worker::ProcessEngine).
#[derive(Clone)]
pub struct Evaluator {
  engine: Arc<dyn QueryEngine>,
  timeout: Duration,
}

impl Evaluator {
  pub fn new(engine: Arc<dyn QueryEngine>) -> Self {
    Self {
      engine,
      timeout: DEFAULT_TIMEOUT,
    }
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn evaluate(&self, input: &Arc<str>, query: &str, compact: bool) -> Result<String, EvalError> {
    debug!(query, compact, "Evaluating query");

    let (tx, rx) = mpsc::sync_channel(1);
    let engine = Arc::clone(&self.engine);
    let input = Arc::clone(input);
    let query_owned = query.to_string();
    let cancel = CancelToken::new();
    let worker_cancel = cancel.clone();

    let spawned = thread::Builder::new().name("jq-eval".to_string()).spawn(move || {
      let result = catch_unwind(AssertUnwindSafe(|| engine.run(&input, &query_owned, compact, &worker_cancel)))
        .unwrap_or_else(|payload| Err(EvalError::Panicked(panic_message(payload.as_ref()))));
      // The receiver is gone once the deadline passed.
      let _ = tx.send(result);
    });
    if let Err(e) = spawned {
      return Err(EvalError::Panicked(format!("failed to start evaluation: {}", e)));
    }

    let text = match rx.recv_timeout(self.timeout) {
      Ok(result) => result?,
      Err(mpsc::RecvTimeoutError::Timeout) => {
        warn!(query, timeout_ms = self.timeout.as_millis() as u64, "Query evaluation timed out");
        cancel.cancel();
        return Err(EvalError::Timeout(self.timeout));
      }
      Err(mpsc::RecvTimeoutError::Disconnected) => {
        return Err(EvalError::Panicked("evaluation worker exited".to_string()));
      }
    };

    check_output(text)
  }
}

/// Null and empty renders are failures even when the engine reported none.
pub fn check_output(text: String) -> Result<String, EvalError> {
  if text == NULL_RENDER {
    Err(EvalError::NullOutput)
  } else if text.is_empty() {
    Err(EvalError::EmptyOutput)
  } else {
    Ok(text)
  }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
  if let Some(s) = payload.downcast_ref::<&str>() {
    s.to_string()
  } else if let Some(s) = payload.downcast_ref::<String>() {
    s.clone()
  } else {
    "unknown panic".to_string()
  }
}
