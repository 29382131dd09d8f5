use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Why a query evaluation produced no usable output.
///
/// Serializable so an evaluation worker process can report it back.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvalError {
  #[error("syntax error: {0}")]
  Syntax(String),

  #[error("compile error: {0}")]
  Compile(String),

  #[error("error: {0}")]
  Runtime(String),

  #[error("invalid input document: {0}")]
  InvalidInput(String),

  #[error("error: query returned null")]
  NullOutput,

  #[error("error: query returned no output")]
  EmptyOutput,

  #[error("error: query timed out after {}ms", .0.as_millis())]
  Timeout(Duration),

  #[error("error: query engine panicked: {0}")]
  Panicked(String),

  #[error("error: query engine crashed: {0}")]
  Crashed(String),

  #[error("error: output exceeds {0} bytes")]
  OutputTooLarge(usize),

  #[error("error: evaluation cancelled")]
  Cancelled,
}

#[derive(Error, Debug)]
pub enum Error {
  #[error("{0}")]
  Evaluation(#[from] EvalError),

  #[error("Save to {}: {source}", path.display())]
  Save {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Startup: {0}")]
  Startup(String),

  #[error("Config: {0}")]
  Config(String),

  #[error("IO: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_eval_error_messages() {
    assert_eq!(EvalError::NullOutput.to_string(), "error: query returned null");
    assert_eq!(
      EvalError::Timeout(Duration::from_millis(250)).to_string(),
      "error: query timed out after 250ms"
    );
  }

  #[test]
  fn test_error_messages() {
    assert_eq!(Error::from(EvalError::EmptyOutput).to_string(), "error: query returned no output");
    let save = Error::Save {
      path: PathBuf::from("/nope/out.txt"),
      source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
    };
    assert!(save.to_string().starts_with("Save to /nope/out.txt"));
    assert_eq!(
      EvalError::Crashed("signal: 6 (SIGABRT)".into()).to_string(),
      "error: query engine crashed: signal: 6 (SIGABRT)"
    );
  }

  #[test]
  fn test_eval_error_survives_json() {
    let err = EvalError::Timeout(Duration::from_millis(300));
    let json = serde_json::to_string(&err).unwrap();
    assert_eq!(serde_json::from_str::<EvalError>(&json).unwrap(), err);
  }
}
