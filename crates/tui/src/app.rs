//! The reactive core.
//!
//! [`App::update`] is the only place state changes. It takes one message,
//! mutates the app and returns the commands the scheduler should run.

use crate::editor::EditBuffer;
use crate::effects::Command;
use crate::event::Msg;
use crate::viewport::Viewport;
use jqlive_core::{
  Config, DedupLog, Document, Error, Evaluator, QueryEngine, SaveTarget, UiConfig, canonicalize, confirmation,
  default_save_dir, normalize,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Normalized queries never contain a comment, so this never matches one.
const PLACEHOLDER_QUERY: &str = "#placeholder";

/// Lifecycle of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
  #[default]
  Running,
  /// Absorbing: every message is ignored from here on
  Quitting,
}

/// The query as last handed to the evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
  pub normalized: String,
  pub compact: bool,
}

/// Main application state
pub struct App {
  document: Document,
  editor: EditBuffer,
  viewport: Viewport,
  query: QueryState,
  ticks: u64,
  error: Option<Error>,
  dedup: DedupLog,
  phase: Phase,
  evaluator: Evaluator,
  saves: SaveTarget,
  ui: UiConfig,
  /// Rows the output pane may take; the terminal viewport cannot grow.
  max_pane_height: u16,
}

impl App {
  pub fn new(document: Document, evaluator: Evaluator, saves: SaveTarget, ui: UiConfig) -> Self {
    let query = QueryState {
      normalized: PLACEHOLDER_QUERY.to_string(),
      compact: document.compact,
    };

    Self {
      editor: EditBuffer::new().with_height(ui.editor_rows),
      viewport: Viewport::new(10, 10),
      document,
      query,
      ticks: 0,
      error: None,
      dedup: DedupLog::new(),
      phase: Phase::Running,
      evaluator,
      saves,
      ui,
      max_pane_height: u16::MAX,
    }
  }

  /// Cap the output pane to `rows` no matter how tall the terminal gets.
  pub fn with_max_pane_height(mut self, rows: u16) -> Self {
    self.max_pane_height = rows;
    self
  }

  /// App wired to `engine`, with settings and save location from `config`
  pub fn from_config(document: Document, config: &Config, engine: Arc<dyn QueryEngine>) -> Self {
    let evaluator = Evaluator::new(engine).with_timeout(config.query.timeout());
    let save_dir = default_save_dir(config.save.directory.as_deref());
    let saves = SaveTarget::for_process(save_dir, config.save.file_prefix.clone());
    let document = document.with_compact(config.query.compact);
    Self::new(document, evaluator, saves, config.ui.clone())
  }

  /// Commands to run at startup: the first evaluation and the tick chain
  pub fn init(&mut self) -> Vec<Command> {
    let mut commands = self.reevaluate();
    commands.push(Command::ScheduleTick(self.ui.tick_interval()));
    commands
  }

  pub fn update(&mut self, msg: Msg) -> Vec<Command> {
    if self.phase == Phase::Quitting {
      debug!(?msg, "Ignoring message while quitting");
      return Vec::new();
    }

    match msg {
      Msg::Resize { width, height } => {
        self.resize(width, height);
        return Vec::new();
      }
      Msg::Scroll(delta) => {
        self.viewport.scroll(delta);
        return Vec::new();
      }
      Msg::ScrollPage(pages) => {
        self.viewport.scroll_pages(pages);
        return Vec::new();
      }
      Msg::Tick => {
        self.ticks += 1;
        return vec![Command::ScheduleTick(self.ui.tick_interval())];
      }
      Msg::Save => return self.save(),
      Msg::Saved(result) => return self.saved(result),
      Msg::Quit => {
        info!("Quitting");
        self.phase = Phase::Quitting;
        return vec![Command::Quit];
      }
      Msg::ToggleCompact => {
        let compact = self.document.toggle_compact();
        debug!(compact, "Toggled compact output");
      }
      Msg::Key(key) => {
        self.editor.handle_key(key);
      }
      Msg::Paste(text) => self.editor.insert_str(&text),
    }

    self.reevaluate()
  }

  /// Evaluate only if the normalized query or output mode changed since
  /// the last evaluation. Failures keep the previous output on screen.
  fn reevaluate(&mut self) -> Vec<Command> {
    let next = QueryState {
      normalized: normalize(&self.editor.value()),
      compact: self.document.compact,
    };
    if next == self.query {
      return Vec::new();
    }
    self.query = next;

    let query = self.query.normalized.as_str();
    match self.evaluator.evaluate(self.document.input(), query, self.query.compact) {
      Ok(text) => {
        self.viewport.set_content(&text);
        self.document.replace_output(text);
        self.error = None;

        match canonicalize(query) {
          Ok(canonical) => self.dedup.announce(&canonical).map(Command::Print).into_iter().collect(),
          Err(e) => {
            warn!(query, "Could not canonicalize evaluated query: {}", e);
            Vec::new()
          }
        }
      }
      Err(e) => {
        debug!(query, "Evaluation failed: {}", e);
        self.error = Some(Error::Evaluation(e));
        Vec::new()
      }
    }
  }

  fn resize(&mut self, width: u16, height: u16) {
    let width = width.saturating_sub(self.ui.margin.saturating_mul(2));
    let editor_width = u32::from(width) * 3 / 4;
    self.editor.set_width(u16::try_from(editor_width).unwrap_or(width));
    self.viewport.set_size(width, (height / 2).min(self.max_pane_height));
  }

  fn save(&mut self) -> Vec<Command> {
    let path = self.saves.next_path();
    debug!(path = %path.display(), "Saving output");
    vec![Command::Save {
      path,
      contents: self.document.output().to_string(),
    }]
  }

  fn saved(&mut self, result: Result<PathBuf, Error>) -> Vec<Command> {
    match result {
      Ok(path) => {
        if matches!(self.error, Some(Error::Save { .. })) {
          self.error = None;
        }
        vec![Command::Print(confirmation(&path))]
      }
      Err(e) => {
        self.error = Some(e);
        Vec::new()
      }
    }
  }

  pub fn document(&self) -> &Document {
    &self.document
  }

  pub fn editor(&self) -> &EditBuffer {
    &self.editor
  }

  pub fn viewport(&self) -> &Viewport {
    &self.viewport
  }

  pub fn query(&self) -> &QueryState {
    &self.query
  }

  pub fn ticks(&self) -> u64 {
    self.ticks
  }

  pub fn error(&self) -> Option<&Error> {
    self.error.as_ref()
  }

  pub fn is_quitting(&self) -> bool {
    self.phase == Phase::Quitting
  }

  pub fn ui(&self) -> &UiConfig {
    &self.ui
  }

  pub fn dedup(&self) -> &DedupLog {
    &self.dedup
  }
}
