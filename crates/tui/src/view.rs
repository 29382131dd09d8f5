//! State to screen. Nothing here mutates the app.

use crate::app::App;
use crate::theme::Theme;
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};
use unicode_width::UnicodeWidthStr;

const SEPARATOR: &str = "────";
const FRAME: &str = "│";
const PROMPT: &str = "┃ ";

/// Compose the whole screen: header, framed output pane, editor and the
/// error line (blank when there is no error). Empty once quitting.
pub fn view(app: &App) -> Text<'static> {
  if app.is_quitting() {
    return Text::default();
  }

  let margin = " ".repeat(app.ui().margin.saturating_sub(1) as usize);
  let pane_width = app.viewport().width() as usize;
  let total_width = pane_width + 2 * FRAME.width();
  let mut lines = Vec::new();

  let label = if app.ticks() % 2 == 1 { "Tock" } else { "Tick" };
  lines.push(centered(&margin, format!("{} #{}", label, app.ticks()), total_width, Theme::header()));
  lines.push(centered(&margin, SEPARATOR.to_string(), total_width, Theme::subtle()));
  lines.extend(output_pane(app, &margin, pane_width));
  lines.push(centered(&margin, SEPARATOR.to_string(), total_width, Theme::subtle()));
  lines.extend(editor_pane(app, &margin, total_width));

  let error = app.error().map(|e| e.to_string()).unwrap_or_default();
  lines.push(Line::from(Span::styled(error, Theme::error())));

  Text::from(lines)
}

/// The view as unstyled text, one line per row
pub fn view_plain(app: &App) -> String {
  let text = view(app);
  text
    .lines
    .iter()
    .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect::<String>())
    .collect::<Vec<_>>()
    .join("\n")
}

fn output_pane(app: &App, margin: &str, width: usize) -> Vec<Line<'static>> {
  let visible = app.viewport().visible();
  (0..app.viewport().height() as usize)
    .map(|row| {
      let text = visible.get(row).map(String::as_str).unwrap_or("");
      Line::from(vec![
        Span::raw(margin.to_string()),
        Span::styled(FRAME, Theme::subtle()),
        Span::styled(pad(text, width), Theme::text()),
        Span::styled(FRAME, Theme::subtle()),
      ])
    })
    .collect()
}

fn editor_pane(app: &App, margin: &str, total_width: usize) -> Vec<Line<'static>> {
  let editor = app.editor();
  let editor_width = editor.width() as usize + PROMPT.width() + 1;
  let indent = format!("{}{}", margin, " ".repeat(total_width.saturating_sub(editor_width) / 2));

  let mut rows: Vec<Line<'static>> = if editor.is_empty() {
    let placeholder: String = app.ui().placeholder.chars().skip(1).collect();
    let first = app.ui().placeholder.chars().next().map(String::from).unwrap_or_else(|| " ".to_string());
    vec![Line::from(vec![
      Span::raw(indent.clone()),
      Span::styled(PROMPT, Theme::prompt()),
      Span::styled(first, Theme::cursor().patch(Theme::placeholder())),
      Span::styled(placeholder, Theme::placeholder()),
    ])]
  } else {
    editor
      .visible_rows()
      .into_iter()
      .map(|(_, text, cursor)| {
        let mut spans = vec![Span::raw(indent.clone()), Span::styled(PROMPT, Theme::prompt())];
        match cursor {
          Some(col) => spans.extend(with_cursor(&text, col)),
          None => spans.push(Span::styled(text, Theme::text())),
        }
        Line::from(spans)
      })
      .collect()
  };

  while rows.len() < editor.height() as usize {
    rows.push(Line::from(vec![
      Span::raw(indent.clone()),
      Span::styled(PROMPT, Theme::prompt()),
    ]));
  }
  rows
}

fn with_cursor(text: &str, col: usize) -> Vec<Span<'static>> {
  let before: String = text.chars().take(col).collect();
  let at: String = text.chars().nth(col).map(String::from).unwrap_or_else(|| " ".to_string());
  let after: String = text.chars().skip(col + 1).collect();
  vec![
    Span::styled(before, Theme::text()),
    Span::styled(at, Theme::cursor()),
    Span::styled(after, Theme::text()),
  ]
}

fn centered(margin: &str, text: String, width: usize, style: Style) -> Line<'static> {
  let left = width.saturating_sub(text.width()) / 2;
  Line::from(vec![
    Span::raw(format!("{}{}", margin, " ".repeat(left))),
    Span::styled(text, style),
  ])
}

fn pad(text: &str, width: usize) -> String {
  let fill = width.saturating_sub(text.width());
  format!("{}{}", text, " ".repeat(fill))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::event::Msg;
  use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
  use jqlive_core::{CancelToken, Document, EvalError, Evaluator, QueryEngine, SaveTarget, UiConfig};
  use std::sync::Arc;

  struct Echo;

  impl QueryEngine for Echo {
    fn run(&self, _input: &str, query: &str, _compact: bool, _cancel: &CancelToken) -> Result<String, EvalError> {
      match query {
        ".z" => Ok("null\n".to_string()),
        q => Ok(format!("{}\nline two\n", q)),
      }
    }
  }

  fn app() -> App {
    let ui = UiConfig {
      margin: 2,
      ..Default::default()
    };
    let mut app = App::new(
      Document::sample(),
      Evaluator::new(Arc::new(Echo)),
      SaveTarget::new("/tmp", "jq.out", 1),
      ui,
    );
    app.init();
    app.update(Msg::Resize { width: 16, height: 6 });
    app
  }

  #[test]
  fn test_layout() {
    let app = app();
    let screen = view_plain(&app);
    let lines: Vec<&str> = screen.split('\n').collect();

    // header, separator, 3 pane rows, separator, 3 editor rows, error line
    assert_eq!(lines.len(), 10);
    assert_eq!(lines[0].trim(), "Tick #0");
    assert_eq!(lines[1].trim(), SEPARATOR);
    assert_eq!(lines[2], " │.           │");
    assert_eq!(lines[3], " │line two    │");
    assert_eq!(lines[4], " │            │");
    assert!(lines[6].contains("┃ jq..."));
    assert_eq!(lines[9], "");
  }

  #[test]
  fn test_tock_on_odd_ticks() {
    let mut app = app();
    app.update(Msg::Tick);
    assert!(view_plain(&app).starts_with(" ") && view_plain(&app).contains("Tock #1"));
    app.update(Msg::Tick);
    assert!(view_plain(&app).contains("Tick #2"));
  }

  #[test]
  fn test_error_line_and_stale_output() {
    let mut app = app();
    app.update(Msg::Paste(".z".into()));
    let screen = view_plain(&app);
    assert!(screen.ends_with("error: query returned null"));
    assert!(screen.contains("│.           │"));
    assert!(screen.contains("┃ .z"));
  }

  #[test]
  fn test_quitting_renders_nothing() {
    let mut app = app();
    app.update(Msg::Quit);
    assert_eq!(view(&app), Text::default());
    assert_eq!(view_plain(&app), "");
  }

  #[test]
  fn test_cursor_is_highlighted() {
    let mut app = app();
    app.update(Msg::Paste(".ab".into()));
    app.update(Msg::Key(KeyEvent::new(KeyCode::Left, KeyModifiers::NONE)));
    let text = view(&app);
    let cursor = text
      .lines
      .iter()
      .flat_map(|line| line.spans.iter())
      .find(|span| span.style == Theme::cursor())
      .expect("cursor span");
    assert_eq!(cursor.content, "b");
  }

  #[test]
  fn test_view_does_not_mutate() {
    let app = app();
    let before = (app.ticks(), app.viewport().offset(), app.editor().value());
    let _ = view(&app);
    let _ = view(&app);
    assert_eq!(before, (app.ticks(), app.viewport().offset(), app.editor().value()));
  }
}
