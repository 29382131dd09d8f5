//! `--init-config`: write a commented config template.

use anyhow::{Context, Result, bail};
use jqlive_core::Config;
use std::path::Path;
use tracing::info;

/// Write the default config template to `path`, creating parent
/// directories. An existing file is never overwritten.
pub fn write_template(path: &Path) -> Result<()> {
  if path.exists() {
    bail!(
      "Config file already exists: {}\nDelete it first if you want to regenerate",
      path.display()
    );
  }

  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
  }
  std::fs::write(path, Config::generate_template()).with_context(|| format!("Failed to write {}", path.display()))?;

  info!(path = %path.display(), "Wrote config template");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_write_template_loads_as_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested/jqlive/config.toml");

    write_template(&path).unwrap();
    let config = Config::load_from(&path).unwrap();
    assert_eq!(config, Config::default());
  }

  #[test]
  fn test_write_template_keeps_existing_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "[ui]\nmargin = 2\n").unwrap();

    let err = write_template(&path).unwrap_err();
    assert!(err.to_string().contains("already exists"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[ui]\nmargin = 2\n");
  }
}
