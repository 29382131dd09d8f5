//! Integration tests for out-of-process evaluation.
//!
//! Runs queries through the built `jqlive` binary acting as an evaluation
//! worker, including queries that would take the whole process down or
//! never finish.

use jqlive_core::{CancelToken, EvalError, Evaluator, ProcessEngine, QueryEngine, SAMPLE_DOCUMENT};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn engine() -> ProcessEngine {
  ProcessEngine::new(env!("CARGO_BIN_EXE_jqlive"))
}

fn evaluator(timeout: Duration) -> Evaluator {
  Evaluator::new(Arc::new(engine())).with_timeout(timeout)
}

fn sample() -> Arc<str> {
  Arc::from(SAMPLE_DOCUMENT)
}

/// Queries evaluate in the worker the same as in-process
#[test]
fn test_worker_evaluates() {
  let evaluator = evaluator(Duration::from_secs(10));
  assert_eq!(evaluator.evaluate(&sample(), ".a", false).unwrap(), "5\n");
  assert_eq!(evaluator.evaluate(&sample(), ".d", true).unwrap(), "[\"e\",\"f\"]\n");
  assert_eq!(evaluator.evaluate(&sample(), ".z", false), Err(EvalError::NullOutput));
}

/// Engine errors come back as the same variants
#[test]
fn test_worker_reports_errors() {
  let evaluator = evaluator(Duration::from_secs(10));
  assert!(matches!(
    evaluator.evaluate(&sample(), ".a |", false),
    Err(EvalError::Syntax(_))
  ));
  assert!(matches!(
    evaluator.evaluate(&sample(), ".a.b", false),
    Err(EvalError::Runtime(_))
  ));
}

/// Unbounded recursion overflows the worker's stack, not ours
#[test]
fn test_stack_overflow_is_an_error() {
  let evaluator = evaluator(Duration::from_secs(10));
  let result = evaluator.evaluate(&sample(), "def f: 1 + f; f", false);
  assert!(matches!(result, Err(EvalError::Crashed(_))), "{:?}", result);

  // The session carries on afterwards
  assert_eq!(evaluator.evaluate(&sample(), ".b", false).unwrap(), "\"c\"\n");
}

/// Endless queries time out and the worker is killed
#[test]
fn test_runaway_queries_time_out() {
  let timeout = Duration::from_millis(300);
  let evaluator = evaluator(timeout);

  for query in ["repeat(1)", "[repeat(1)]"] {
    let started = Instant::now();
    assert_eq!(
      evaluator.evaluate(&sample(), query, false),
      Err(EvalError::Timeout(timeout)),
      "{}",
      query
    );
    assert!(started.elapsed() < Duration::from_secs(5), "{}", query);
  }
}

/// Cancelling kills the worker and returns as soon as it is gone
#[test]
fn test_cancel_stops_the_worker() {
  let engine = engine();
  let cancel = CancelToken::new();
  let trigger = cancel.clone();
  let canceller = thread::spawn(move || {
    thread::sleep(Duration::from_millis(200));
    trigger.cancel();
  });

  let started = Instant::now();
  let result = engine.run(SAMPLE_DOCUMENT, "[repeat(1)]", false, &cancel);
  canceller.join().unwrap();

  assert_eq!(result, Err(EvalError::Cancelled));
  assert!(started.elapsed() < Duration::from_secs(5));
}
