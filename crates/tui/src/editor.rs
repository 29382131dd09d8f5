use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_width::UnicodeWidthChar;

/// Multi-line query editor with a single cursor.
///
/// The cursor column counts chars, not bytes. Lines never contain '\n'.
#[derive(Debug, Clone)]
pub struct EditBuffer {
  lines: Vec<String>,
  row: usize,
  col: usize,
  width: u16,
  height: u16,
}

impl Default for EditBuffer {
  fn default() -> Self {
    Self::new()
  }
}

impl EditBuffer {
  pub fn new() -> Self {
    Self {
      lines: vec![String::new()],
      row: 0,
      col: 0,
      width: 40,
      height: 3,
    }
  }

  pub fn with_height(mut self, height: u16) -> Self {
    self.height = height.max(1);
    self
  }

  pub fn set_width(&mut self, width: u16) {
    self.width = width.max(1);
  }

  pub fn width(&self) -> u16 {
    self.width
  }

  pub fn height(&self) -> u16 {
    self.height
  }

  /// Raw text, lines joined with '\n'
  pub fn value(&self) -> String {
    self.lines.join("\n")
  }

  pub fn is_empty(&self) -> bool {
    self.lines.len() == 1 && self.lines[0].is_empty()
  }

  pub fn cursor(&self) -> (usize, usize) {
    (self.row, self.col)
  }

  pub fn lines(&self) -> &[String] {
    &self.lines
  }

  /// Apply an editing key. Returns true if the text changed.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
      KeyCode::Char('a') if ctrl => self.home(),
      KeyCode::Char('e') if ctrl => self.end(),
      KeyCode::Char('k') if ctrl => return self.kill_to_end(),
      KeyCode::Char('u') if ctrl => return self.kill_to_start(),
      KeyCode::Char('w') if ctrl => return self.delete_word_back(),
      KeyCode::Backspace if alt || ctrl => return self.delete_word_back(),
      KeyCode::Char(_) if ctrl || alt => {}
      KeyCode::Char(c) => {
        self.insert_char(c);
        return true;
      }
      KeyCode::Enter => {
        self.newline();
        return true;
      }
      KeyCode::Backspace => return self.backspace(),
      KeyCode::Delete => return self.delete(),
      KeyCode::Left => self.left(),
      KeyCode::Right => self.right(),
      KeyCode::Up => self.up(),
      KeyCode::Down => self.down(),
      KeyCode::Home => self.home(),
      KeyCode::End => self.end(),
      _ => {}
    }
    false
  }

  /// Insert text at the cursor, splitting on newlines.
  pub fn insert_str(&mut self, text: &str) {
    for (i, part) in text.split('\n').enumerate() {
      if i > 0 {
        self.newline();
      }
      for c in part.chars().filter(|c| *c != '\r') {
        self.insert_char(c);
      }
    }
  }

  fn line_len(&self, row: usize) -> usize {
    self.lines[row].chars().count()
  }

  fn byte_index(&self, row: usize, col: usize) -> usize {
    let line = &self.lines[row];
    line.char_indices().nth(col).map(|(i, _)| i).unwrap_or(line.len())
  }

  fn insert_char(&mut self, c: char) {
    let idx = self.byte_index(self.row, self.col);
    self.lines[self.row].insert(idx, c);
    self.col += 1;
  }

  fn newline(&mut self) {
    let idx = self.byte_index(self.row, self.col);
    let rest = self.lines[self.row].split_off(idx);
    self.row += 1;
    self.col = 0;
    self.lines.insert(self.row, rest);
  }

  fn backspace(&mut self) -> bool {
    if self.col > 0 {
      let idx = self.byte_index(self.row, self.col - 1);
      self.lines[self.row].remove(idx);
      self.col -= 1;
      true
    } else if self.row > 0 {
      let line = self.lines.remove(self.row);
      self.row -= 1;
      self.col = self.line_len(self.row);
      self.lines[self.row].push_str(&line);
      true
    } else {
      false
    }
  }

  fn delete(&mut self) -> bool {
    if self.col < self.line_len(self.row) {
      let idx = self.byte_index(self.row, self.col);
      self.lines[self.row].remove(idx);
      true
    } else if self.row + 1 < self.lines.len() {
      let next = self.lines.remove(self.row + 1);
      self.lines[self.row].push_str(&next);
      true
    } else {
      false
    }
  }

  fn kill_to_end(&mut self) -> bool {
    let idx = self.byte_index(self.row, self.col);
    if idx == self.lines[self.row].len() {
      return false;
    }
    self.lines[self.row].truncate(idx);
    true
  }

  fn kill_to_start(&mut self) -> bool {
    if self.col == 0 {
      return false;
    }
    let idx = self.byte_index(self.row, self.col);
    self.lines[self.row].replace_range(..idx, "");
    self.col = 0;
    true
  }

  fn delete_word_back(&mut self) -> bool {
    if self.col == 0 {
      return self.backspace();
    }
    let chars: Vec<char> = self.lines[self.row].chars().collect();
    let mut start = self.col;
    while start > 0 && chars[start - 1].is_whitespace() {
      start -= 1;
    }
    while start > 0 && !chars[start - 1].is_whitespace() {
      start -= 1;
    }
    let from = self.byte_index(self.row, start);
    let to = self.byte_index(self.row, self.col);
    self.lines[self.row].replace_range(from..to, "");
    self.col = start;
    true
  }

  fn left(&mut self) {
    if self.col > 0 {
      self.col -= 1;
    } else if self.row > 0 {
      self.row -= 1;
      self.col = self.line_len(self.row);
    }
  }

  fn right(&mut self) {
    if self.col < self.line_len(self.row) {
      self.col += 1;
    } else if self.row + 1 < self.lines.len() {
      self.row += 1;
      self.col = 0;
    }
  }

  fn up(&mut self) {
    if self.row > 0 {
      self.row -= 1;
      self.col = self.col.min(self.line_len(self.row));
    }
  }

  fn down(&mut self) {
    if self.row + 1 < self.lines.len() {
      self.row += 1;
      self.col = self.col.min(self.line_len(self.row));
    }
  }

  fn home(&mut self) {
    self.col = 0;
  }

  fn end(&mut self) {
    self.col = self.line_len(self.row);
  }

  /// Rows to display: `(row index, visible text, cursor column within the text)`.
  ///
  /// The window follows the cursor vertically; the cursor line scrolls
  /// horizontally to keep the cursor in view. Widths are terminal cells,
  /// the returned cursor column counts chars.
  pub fn visible_rows(&self) -> Vec<(usize, String, Option<usize>)> {
    let height = self.height as usize;
    let width = self.width as usize;
    let top = (self.row + 1).saturating_sub(height);

    self
      .lines
      .iter()
      .enumerate()
      .skip(top)
      .take(height)
      .map(|(i, line)| {
        if i == self.row {
          let chars: Vec<char> = line.chars().collect();
          let cursor_cells = chars.get(self.col).map_or(1, |c| cell_width(*c).max(1));
          let mut used: usize = chars[..self.col].iter().map(|c| cell_width(*c)).sum::<usize>() + cursor_cells;
          let mut start = 0;
          while used > width && start < self.col {
            used -= cell_width(chars[start]);
            start += 1;
          }
          (i, fit(chars[start..].iter().copied(), width), Some(self.col - start))
        } else {
          (i, fit(line.chars(), width), None)
        }
      })
      .collect()
  }
}

fn cell_width(c: char) -> usize {
  c.width().unwrap_or(0)
}

/// Leading chars that fit in `width` cells.
fn fit(chars: impl Iterator<Item = char>, width: usize) -> String {
  let mut used = 0;
  chars
    .take_while(|c| {
      used += cell_width(*c);
      used <= width
    })
    .collect()
}
