//! Where saved output goes.

use std::path::{Path, PathBuf};

pub const DEFAULT_FILE_PREFIX: &str = "jq.out";

/// Directory for saved output: explicit override, then `XDG_RUNTIME_DIR`,
/// then `/tmp`.
pub fn default_save_dir(configured: Option<&Path>) -> PathBuf {
  if let Some(dir) = configured {
    return dir.to_path_buf();
  }
  if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR")
    && !runtime_dir.is_empty()
  {
    return PathBuf::from(runtime_dir);
  }
  PathBuf::from("/tmp")
}

/// Hands out a fresh path for every save.
///
/// Names carry the session id (the process id in practice) and a counter,
/// so neither concurrent sessions nor repeated saves overwrite each other.
#[derive(Debug, Clone)]
pub struct SaveTarget {
  dir: PathBuf,
  prefix: String,
  session: u32,
  saves: u64,
}

impl SaveTarget {
  pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, session: u32) -> Self {
    Self {
      dir: dir.into(),
      prefix: prefix.into(),
      session,
      saves: 0,
    }
  }

  /// Target for the current process.
  pub fn for_process(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
    Self::new(dir, prefix, std::process::id())
  }

  pub fn next_path(&mut self) -> PathBuf {
    self.saves += 1;
    self
      .dir
      .join(format!("{}.{}.{}.txt", self.prefix, self.session, self.saves))
  }
}

/// Confirmation line shown after a successful save.
pub fn confirmation(path: &Path) -> String {
  format!("    saved file://{}", path.display())
}
