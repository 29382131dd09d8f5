//! jq engine binding.
//!
//! The rest of the crate only sees [`QueryEngine`]; [`JaqEngine`] is the
//! production implementation backed by the `jaq` crates.

use crate::error::EvalError;
use jaq_interpret::{Ctx, FilterT, ParseCtx, RcIter, Val};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Largest rendering an engine may produce.
pub const MAX_OUTPUT_BYTES: usize = 32 * 1024 * 1024;

/// Runs a query against an input document and renders the results as text.
///
/// Implementations render each output value on its own line, terminated
/// by a newline, dense when `compact` is set and indented otherwise. Once
/// `cancel` fires the result is discarded, so implementations should stop
/// as soon as they notice.
pub trait QueryEngine: Send + Sync {
  fn run(&self, input: &str, query: &str, compact: bool, cancel: &CancelToken) -> Result<String, EvalError>;
}

/// Shared flag telling an engine to give up.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn cancel(&self) {
    self.0.store(true, Ordering::Relaxed);
  }

  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::Relaxed)
  }
}

/// jq-compatible engine with the jaq core and standard library loaded.
#[derive(Debug, Clone, Copy)]
pub struct JaqEngine {
  max_output: usize,
}

impl Default for JaqEngine {
  fn default() -> Self {
    Self::new()
  }
}

impl JaqEngine {
  pub fn new() -> Self {
    Self {
      max_output: MAX_OUTPUT_BYTES,
    }
  }

  pub fn with_max_output(mut self, bytes: usize) -> Self {
    self.max_output = bytes;
    self
  }
}

impl QueryEngine for JaqEngine {
  fn run(&self, input: &str, query: &str, compact: bool, cancel: &CancelToken) -> Result<String, EvalError> {
    let documents = parse_input(input)?;

    let (main, errs) = jaq_parse::parse(query, jaq_parse::main());
    if let Some(err) = errs.first() {
      return Err(EvalError::Syntax(err.to_string()));
    }
    let Some(main) = main else {
      return Err(EvalError::Syntax("empty query".to_string()));
    };

    let mut defs = ParseCtx::new(Vec::new());
    defs.insert_natives(jaq_core::core());
    defs.insert_defs(jaq_std::std());
    let filter = defs.compile(main);
    if !defs.errs.is_empty() {
      return Err(EvalError::Compile(format!(
        "{} undefined filter or variable reference(s)",
        defs.errs.len()
      )));
    }

    let mut rendered = String::new();
    for document in documents {
      let inputs = RcIter::new(core::iter::empty());
      for out in filter.run((Ctx::new([], &inputs), Val::from(document))) {
        if cancel.is_cancelled() {
          return Err(EvalError::Cancelled);
        }
        let val = out.map_err(|e| EvalError::Runtime(e.to_string()))?;
        rendered.push_str(&render_value(&val, compact));
        rendered.push('\n');
        if rendered.len() > self.max_output {
          return Err(EvalError::OutputTooLarge(self.max_output));
        }
      }
    }

    Ok(rendered)
  }
}

/// Check that `query` parses, without compiling or running it.
pub fn parse_check(query: &str) -> Result<(), EvalError> {
  let (main, errs) = jaq_parse::parse(query, jaq_parse::main());
  if let Some(err) = errs.first() {
    return Err(EvalError::Syntax(err.to_string()));
  }
  match main {
    Some(_) => Ok(()),
    None => Err(EvalError::Syntax("empty query".to_string())),
  }
}

/// Split the input text into its JSON values, in document order.
fn parse_input(input: &str) -> Result<Vec<Value>, EvalError> {
  serde_json::Deserializer::from_str(input)
    .into_iter::<Value>()
    .collect::<Result<Vec<_>, _>>()
    .map_err(|e| EvalError::InvalidInput(e.to_string()))
}

/// jaq prints values as dense JSON; reformat through serde_json so both
/// modes share one printer. Falls back to jaq's text if it is not JSON.
fn render_value(val: &Val, compact: bool) -> String {
  let text = val.to_string();
  let Ok(value) = serde_json::from_str::<Value>(&text) else {
    return text;
  };
  let formatted = if compact {
    serde_json::to_string(&value)
  } else {
    serde_json::to_string_pretty(&value)
  };
  formatted.unwrap_or(text)
}

#[cfg(test)]
mod tests {
  use super::*;

  const SAMPLE: &str = r#"{"a":5,"b":"c","d":["e","f"],"g":{"h":"i","j":"k"}}"#;

  fn run(input: &str, query: &str, compact: bool) -> Result<String, EvalError> {
    JaqEngine::new().run(input, query, compact, &CancelToken::new())
  }

  #[test]
  fn test_field_access() {
    assert_eq!(run(SAMPLE, ".a", false).unwrap(), "5\n");
    assert_eq!(run(SAMPLE, ".b", true).unwrap(), "\"c\"\n");
  }

  #[test]
  fn test_pretty_and_compact() {
    assert_eq!(run(SAMPLE, ".d", false).unwrap(), "[\n  \"e\",\n  \"f\"\n]\n");
    assert_eq!(run(SAMPLE, ".d", true).unwrap(), "[\"e\",\"f\"]\n");
  }

  #[test]
  fn test_preserves_key_order() {
    assert_eq!(run(SAMPLE, ".g", true).unwrap(), "{\"h\":\"i\",\"j\":\"k\"}\n");
  }

  #[test]
  fn test_multiple_outputs() {
    assert_eq!(run(SAMPLE, ".d[]", false).unwrap(), "\"e\"\n\"f\"\n");
  }

  #[test]
  fn test_multiple_documents() {
    assert_eq!(run("1 2 3", ". * 2", true).unwrap(), "2\n4\n6\n");
  }

  #[test]
  fn test_std_filters_available() {
    assert_eq!(run(SAMPLE, ".d | map(ascii_upcase)", true).unwrap(), "[\"E\",\"F\"]\n");
  }

  #[test]
  fn test_missing_key_renders_null() {
    assert_eq!(run(SAMPLE, ".z", false).unwrap(), "null\n");
  }

  #[test]
  fn test_errors() {
    assert!(matches!(run(SAMPLE, ".a |", false), Err(EvalError::Syntax(_))));
    assert!(matches!(
      run(SAMPLE, "no_such_filter", false),
      Err(EvalError::Compile(_))
    ));
    assert!(matches!(run(SAMPLE, ".a.b", false), Err(EvalError::Runtime(_))));
    assert!(matches!(run("{", ".", false), Err(EvalError::InvalidInput(_))));
  }

  #[test]
  fn test_cancelled_run_stops() {
    let cancel = CancelToken::new();
    cancel.cancel();
    assert_eq!(
      JaqEngine::new().run(SAMPLE, "repeat(1)", true, &cancel),
      Err(EvalError::Cancelled)
    );
  }

  #[test]
  fn test_output_is_capped() {
    let engine = JaqEngine::new().with_max_output(64);
    assert_eq!(
      engine.run("null", "repeat(\"xxxxxxxx\")", true, &CancelToken::new()),
      Err(EvalError::OutputTooLarge(64))
    );
    assert_eq!(engine.run(SAMPLE, ".a", true, &CancelToken::new()).unwrap(), "5\n");
  }

  #[test]
  fn test_parse_check() {
    assert!(parse_check(".a | .b").is_ok());
    assert!(parse_check("[.a").is_err());
  }
}
