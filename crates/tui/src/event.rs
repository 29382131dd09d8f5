use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use jqlive_core::Error;
use std::path::PathBuf;

/// Everything the reactive core reacts to
#[derive(Debug)]
pub enum Msg {
  /// Terminal resized to (width, height)
  Resize { width: u16, height: u16 },
  /// Scroll the output by a number of lines (negative is up)
  Scroll(i32),
  /// Scroll the output by whole pages (negative is up)
  ScrollPage(i32),
  /// Key for the query editor
  Key(KeyEvent),
  /// Pasted text for the query editor
  Paste(String),
  /// Flip compact/pretty output
  ToggleCompact,
  /// Write the current output to a file
  Save,
  /// Leave the application
  Quit,
  /// Animation tick
  Tick,
  /// A save finished, with the path written or the failure
  Saved(Result<PathBuf, Error>),
}

/// Translate a terminal event into a message.
///
/// Quit, save and compact keys are intercepted here so the editor never
/// sees them. Returns `None` for events nothing reacts to.
pub fn filter(event: CrosstermEvent, scroll_lines: u16) -> Option<Msg> {
  match event {
    CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => Some(filter_key(key)),
    CrosstermEvent::Mouse(mouse) => match mouse.kind {
      MouseEventKind::ScrollUp => Some(Msg::Scroll(-i32::from(scroll_lines))),
      MouseEventKind::ScrollDown => Some(Msg::Scroll(i32::from(scroll_lines))),
      _ => None,
    },
    CrosstermEvent::Paste(text) => Some(Msg::Paste(text)),
    CrosstermEvent::Resize(width, height) => Some(Msg::Resize { width, height }),
    _ => None,
  }
}

fn filter_key(key: KeyEvent) -> Msg {
  let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
  match key.code {
    KeyCode::Esc => Msg::Quit,
    KeyCode::Char('c') | KeyCode::Char('q') if ctrl => Msg::Quit,
    KeyCode::Char('s') if ctrl => Msg::Save,
    KeyCode::Tab => Msg::ToggleCompact,
    KeyCode::PageUp => Msg::ScrollPage(-1),
    KeyCode::PageDown => Msg::ScrollPage(1),
    _ => Msg::Key(key),
  }
}
