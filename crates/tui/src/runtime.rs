//! Terminal plumbing: raw mode, the inline viewport and the event loop.

use crate::app::App;
use crate::effects::{Outcome, Scheduler};
use crate::event::{Msg, filter};
use crate::theme::Theme;
use crate::view::view;
use anyhow::Result;
use crossterm::event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture, EventStream};
use crossterm::execute;
use crossterm::terminal::{self, disable_raw_mode, enable_raw_mode};
use futures::StreamExt;
use jqlive_core::{Config, Document, QueryEngine};
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::{Paragraph, Widget};
use ratatui::{Frame, Terminal, TerminalOptions, Viewport as TerminalViewport};
use std::io::{self, Stdout};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Rows around the output pane and editor: header, two separators and the
/// error line.
const CHROME_ROWS: u16 = 4;

/// Run the previewer until the user quits.
///
/// The live view is drawn inline below the shell prompt; announced queries
/// and save confirmations scroll up above it and stay in the scrollback.
pub async fn run(document: Document, config: &Config, engine: Arc<dyn QueryEngine>) -> Result<()> {
  let (width, height) = terminal::size()?;
  info!(width, height, compact = document.compact, "Starting previewer");

  enable_raw_mode()?;
  let mut stdout = io::stdout();
  execute!(stdout, EnableMouseCapture, EnableBracketedPaste)?;
  let rows = inline_height(height, config.ui.editor_rows);
  let options = TerminalOptions {
    viewport: TerminalViewport::Inline(rows),
  };
  let mut terminal = Terminal::with_options(CrosstermBackend::new(stdout), options)?;

  let app = App::from_config(document, config, engine).with_max_pane_height(pane_budget(rows, config.ui.editor_rows));
  let result = event_loop(&mut terminal, app, config, width, height).await;
  let restored = restore(&mut terminal);
  result?;
  restored
}

/// Rows taken by the live view: half the terminal for output plus the
/// editor and chrome. Fixed for the whole session.
fn inline_height(height: u16, editor_rows: u16) -> u16 {
  (height / 2)
    .saturating_add(editor_rows.max(1))
    .saturating_add(CHROME_ROWS)
    .min(height)
}

/// Output pane rows that fit in an inline viewport of `rows`.
fn pane_budget(rows: u16, editor_rows: u16) -> u16 {
  rows.saturating_sub(editor_rows.max(1).saturating_add(CHROME_ROWS))
}

fn render(frame: &mut Frame, app: &App) {
  frame.render_widget(Paragraph::new(view(app)), frame.area());
}

async fn event_loop(terminal: &mut Term, mut app: App, config: &Config, width: u16, height: u16) -> Result<()> {
  let (tx, mut rx) = mpsc::unbounded_channel();
  let scheduler = Scheduler::new(tx);
  let mut events = EventStream::new();

  let mut commands = app.update(Msg::Resize { width, height });
  commands.extend(app.init());
  let mut outcome = scheduler.execute(commands);

  loop {
    print_above(terminal, &outcome.printed)?;
    if outcome.quit {
      break;
    }
    terminal.draw(|frame| render(frame, &app))?;

    let msg = tokio::select! {
      Some(msg) = rx.recv() => Some(msg),
      event = events.next() => match event {
        Some(event) => filter(event?, config.ui.scroll_lines),
        None => {
          debug!("Terminal event stream ended");
          break;
        }
      },
    };

    outcome = match msg {
      Some(msg) => scheduler.execute(app.update(msg)),
      None => Outcome::default(),
    };
  }

  Ok(())
}

fn print_above(terminal: &mut Term, lines: &[String]) -> Result<()> {
  for line in lines {
    terminal.insert_before(1, |buf| {
      Paragraph::new(line.as_str()).style(Theme::subtle()).render(buf.area, buf);
    })?;
  }
  Ok(())
}

fn restore(terminal: &mut Term) -> Result<()> {
  terminal.clear()?;
  disable_raw_mode()?;
  execute!(terminal.backend_mut(), DisableMouseCapture, DisableBracketedPaste)?;
  terminal.show_cursor()?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use jqlive_core::JaqEngine;
  use ratatui::backend::{Backend, TestBackend};
  use ratatui::layout::Rect;

  fn screen(terminal: &Terminal<TestBackend>) -> Vec<String> {
    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;
    buffer
      .content()
      .chunks(width)
      .map(|row| row.iter().map(|cell| cell.symbol()).collect())
      .collect()
  }

  #[test]
  fn test_inline_height() {
    assert_eq!(inline_height(40, 3), 27);
    assert_eq!(inline_height(6, 3), 6);
    assert_eq!(inline_height(0, 3), 0);
    assert_eq!(inline_height(u16::MAX, u16::MAX), u16::MAX);
  }

  #[test]
  fn test_pane_budget() {
    assert_eq!(pane_budget(27, 3), 20);
    assert_eq!(pane_budget(27, 0), 22);
    assert_eq!(pane_budget(6, 3), 0);
    assert_eq!(pane_budget(10, u16::MAX), 0);
  }

  #[test]
  fn test_growing_terminal_keeps_editor_visible() {
    let config = Config::default();
    let editor_rows = config.ui.editor_rows;
    let rows = inline_height(40, editor_rows);
    let options = TerminalOptions {
      viewport: TerminalViewport::Inline(rows),
    };
    let mut terminal = Terminal::with_options(TestBackend::new(80, 40), options).unwrap();
    let mut app = App::from_config(Document::sample(), &config, Arc::new(JaqEngine::new()))
      .with_max_pane_height(pane_budget(rows, editor_rows));

    app.update(Msg::Resize { width: 80, height: 40 });
    app.init();
    app.update(Msg::Paste(".zz".into()));
    terminal.draw(|frame| render(frame, &app)).unwrap();

    terminal.backend_mut().resize(80, 60);
    app.update(Msg::Resize { width: 80, height: 60 });
    assert_eq!(app.viewport().height(), pane_budget(rows, editor_rows));

    let mut area = Rect::default();
    terminal
      .draw(|frame| {
        area = frame.area();
        render(frame, &app);
      })
      .unwrap();
    assert_eq!(terminal.backend().size().unwrap().height, 60);
    assert_eq!(area.height, rows);

    let screen = screen(&terminal);
    assert!(screen.iter().any(|line| line.contains("┃ .zz")), "{:#?}", screen);
    assert!(
      screen.iter().any(|line| line.contains("error: query returned null")),
      "{:#?}",
      screen
    );
  }
}
