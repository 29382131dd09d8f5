use std::collections::HashSet;

/// Canonical queries already announced this session.
///
/// Append-only: a query is announced at most once per process.
#[derive(Debug, Default)]
pub struct DedupLog {
  seen: HashSet<String>,
}

impl DedupLog {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record `canonical` and return the line to print, or `None` if it was
  /// announced before.
  pub fn announce(&mut self, canonical: &str) -> Option<String> {
    if self.seen.contains(canonical) {
      return None;
    }
    self.seen.insert(canonical.to_string());
    Some(format!("    '{}'", canonical))
  }

  pub fn len(&self) -> usize {
    self.seen.len()
  }

  pub fn is_empty(&self) -> bool {
    self.seen.is_empty()
  }
}
