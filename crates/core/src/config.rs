//! Configuration for jqlive.
//!
//! Config priority: `--config` path > user (~/.config/jqlive/config.toml) > defaults

use crate::error::{Error, Result};
use crate::save::DEFAULT_FILE_PREFIX;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// UI Configuration
// ============================================================================

/// Layout and animation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
  /// Interval between animation ticks in milliseconds (default: 1000)
  pub tick_ms: u64,

  /// Horizontal margin on each side of the panes (default: 8)
  pub margin: u16,

  /// Visible rows of the query editor (default: 3)
  pub editor_rows: u16,

  /// Lines moved per mouse wheel notch (default: 3)
  pub scroll_lines: u16,

  /// Hint shown in the empty editor
  pub placeholder: String,
}

impl Default for UiConfig {
  fn default() -> Self {
    Self {
      tick_ms: 1000,
      margin: 8,
      editor_rows: 3,
      scroll_lines: 3,
      placeholder: "jq...".to_string(),
    }
  }
}

impl UiConfig {
  pub fn tick_interval(&self) -> Duration {
    Duration::from_millis(self.tick_ms.max(1))
  }
}

// ============================================================================
// Query Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
  /// Evaluation deadline in milliseconds (default: 2000)
  pub timeout_ms: u64,

  /// Start in compact output mode (default: false)
  pub compact: bool,
}

impl Default for QueryConfig {
  fn default() -> Self {
    Self {
      timeout_ms: 2000,
      compact: false,
    }
  }
}

impl QueryConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_millis(self.timeout_ms.max(1))
  }
}

// ============================================================================
// Save Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
  /// Directory for saved output. If not set, uses XDG_RUNTIME_DIR or /tmp
  #[serde(skip_serializing_if = "Option::is_none")]
  pub directory: Option<PathBuf>,

  /// File name prefix (default: "jq.out")
  pub file_prefix: String,
}

impl Default for SaveConfig {
  fn default() -> Self {
    Self {
      directory: None,
      file_prefix: DEFAULT_FILE_PREFIX.to_string(),
    }
  }
}

// ============================================================================
// Log Configuration
// ============================================================================

/// Log file rotation options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
  #[default]
  Daily,
  Hourly,
  Never,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
  /// off, error, warn, info, debug or trace (default: warn)
  pub level: String,

  /// Log file rotation (default: daily)
  pub rotation: LogRotation,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: "warn".to_string(),
      rotation: LogRotation::Daily,
    }
  }
}

// ============================================================================
// Main Configuration
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  #[serde(default)]
  pub ui: UiConfig,

  #[serde(default)]
  pub query: QueryConfig,

  #[serde(default)]
  pub save: SaveConfig,

  #[serde(default)]
  pub log: LogConfig,
}

impl Config {
  /// Load from an explicit path. Unlike [`Config::load`], a missing or
  /// malformed file is an error.
  pub fn load_from(path: &Path) -> Result<Self> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
  }

  /// Load the user config, falling back to defaults
  pub fn load() -> Self {
    if let Some(user_config_path) = Self::user_config_path()
      && user_config_path.exists()
      && let Ok(content) = std::fs::read_to_string(&user_config_path)
      && let Ok(config) = toml::from_str(&content)
    {
      return config;
    }

    Self::default()
  }

  /// Get the user-level config path
  pub fn user_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("JQLIVE_CONFIG_DIR") {
      return Some(PathBuf::from(path).join("config.toml"));
    }

    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
      return Some(PathBuf::from(path).join("jqlive").join("config.toml"));
    }

    dirs::config_dir().map(|p: PathBuf| p.join("jqlive").join("config.toml"))
  }

  pub fn to_toml(&self) -> Result<String> {
    toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
  }

  /// Generate a default config file as a string
  pub fn generate_template() -> String {
    let defaults = Self::default();
    format!(
      r#"# jqlive Configuration
# Place in ~/.config/jqlive/config.toml or pass --config <path>

# ============================================================================
# UI
# ============================================================================

[ui]
# Animation tick interval (milliseconds)
tick_ms = {tick_ms}

# Horizontal margin around the panes (cells)
margin = {margin}

# Visible editor rows
editor_rows = {editor_rows}

# Lines scrolled per mouse wheel notch
scroll_lines = {scroll_lines}

# Hint shown in the empty editor
placeholder = "{placeholder}"

# ============================================================================
# Query Evaluation
# ============================================================================

[query]
# Give up on a query after this long (milliseconds)
timeout_ms = {timeout_ms}

# Start in compact output mode (Tab toggles)
compact = {compact}

# ============================================================================
# Saving (Ctrl+S)
# ============================================================================

[save]
# Directory for saved output (default: $XDG_RUNTIME_DIR, then /tmp)
# directory = "/tmp"

# File name prefix; files are named <prefix>.<pid>.<n>.txt
file_prefix = "{file_prefix}"

# ============================================================================
# Logging
# ============================================================================

[log]
# off, error, warn, info, debug, trace (RUST_LOG overrides)
level = "{level}"

# daily, hourly, or never
rotation = "daily"
"#,
      tick_ms = defaults.ui.tick_ms,
      margin = defaults.ui.margin,
      editor_rows = defaults.ui.editor_rows,
      scroll_lines = defaults.ui.scroll_lines,
      placeholder = defaults.ui.placeholder,
      timeout_ms = defaults.query.timeout_ms,
      compact = defaults.query.compact,
      file_prefix = defaults.save.file_prefix,
      level = defaults.log.level,
    )
  }
}
