use std::sync::Arc;

/// Built-in input used when nothing is piped in.
pub const SAMPLE_DOCUMENT: &str = r#"{"a":5,"b":"c","d":["e","f"],"g":{"h":"i","j":"k"}}"#;

/// The input being queried and the last good rendering of it.
///
/// `output` is only ever replaced wholesale by a successful evaluation.
#[derive(Debug, Clone)]
pub struct Document {
  input: Arc<str>,
  output: String,
  pub compact: bool,
}

impl Document {
  pub fn new(input: impl Into<Arc<str>>) -> Self {
    Self {
      input: input.into(),
      output: String::new(),
      compact: false,
    }
  }

  pub fn sample() -> Self {
    Self::new(SAMPLE_DOCUMENT)
  }

  pub fn with_compact(mut self, compact: bool) -> Self {
    self.compact = compact;
    self
  }

  pub fn input(&self) -> &Arc<str> {
    &self.input
  }

  pub fn output(&self) -> &str {
    &self.output
  }

  pub fn replace_output(&mut self, output: String) {
    self.output = output;
  }

  pub fn toggle_compact(&mut self) -> bool {
    self.compact = !self.compact;
    self.compact
  }
}
