//! Common test utilities for previewer integration tests
//!
//! Everything here runs the real jaq engine against the sample document.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use jqlive_core::{Document, Evaluator, JaqEngine, SaveTarget, UiConfig};
use std::path::Path;
use std::sync::Arc;
use tui::{App, Command, Msg};

/// Create an app over the sample document that saves into `save_dir`
#[allow(dead_code)]
pub fn create_test_app(save_dir: &Path) -> App {
  let evaluator = Evaluator::new(Arc::new(JaqEngine::new()));
  let saves = SaveTarget::new(save_dir, "jq.out", 1);
  let mut app = App::new(Document::sample(), evaluator, saves, UiConfig::default());
  app.update(Msg::Resize { width: 96, height: 40 });
  app.init();
  app
}

/// Replace the whole (single-line) query
#[allow(dead_code)]
pub fn set_query(app: &mut App, query: &str) -> Vec<Command> {
  app.update(Msg::Key(KeyEvent::new(KeyCode::End, KeyModifiers::NONE)));
  let mut commands = app.update(Msg::Key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)));
  commands.extend(app.update(Msg::Paste(query.to_string())));
  commands
}

/// Lines printed above the live view
#[allow(dead_code)]
pub fn printed(commands: &[Command]) -> Vec<String> {
  commands
    .iter()
    .filter_map(|c| match c {
      Command::Print(line) => Some(line.clone()),
      _ => None,
    })
    .collect()
}
