use unicode_width::UnicodeWidthChar;

/// Scrollable window over the rendered query output.
///
/// Content is wrapped to `width` display cells. The offset is clamped to
/// `[0, lines - height]` after every mutation.
#[derive(Debug, Clone)]
pub struct Viewport {
  width: u16,
  height: u16,
  offset: usize,
  content: String,
  lines: Vec<String>,
}

impl Viewport {
  pub fn new(width: u16, height: u16) -> Self {
    Self {
      width,
      height,
      offset: 0,
      content: String::new(),
      lines: Vec::new(),
    }
  }

  pub fn width(&self) -> u16 {
    self.width
  }

  pub fn height(&self) -> u16 {
    self.height
  }

  pub fn offset(&self) -> usize {
    self.offset
  }

  pub fn lines(&self) -> &[String] {
    &self.lines
  }

  pub fn set_size(&mut self, width: u16, height: u16) {
    let rewrap = width != self.width;
    self.width = width;
    self.height = height;
    if rewrap {
      self.lines = wrap(&self.content, width);
    }
    self.clamp();
  }

  pub fn set_content(&mut self, content: &str) {
    self.content = content.to_string();
    self.lines = wrap(content, self.width);
    self.clamp();
  }

  pub fn scroll(&mut self, delta: i32) {
    let magnitude = delta.unsigned_abs() as usize;
    self.offset = if delta < 0 {
      self.offset.saturating_sub(magnitude)
    } else {
      self.offset.saturating_add(magnitude)
    };
    self.clamp();
  }

  pub fn scroll_pages(&mut self, pages: i32) {
    self.scroll(pages.saturating_mul(i32::from(self.height.max(1))));
  }

  pub fn max_offset(&self) -> usize {
    self.lines.len().saturating_sub(self.height as usize)
  }

  /// Lines currently in view
  pub fn visible(&self) -> &[String] {
    let end = (self.offset + self.height as usize).min(self.lines.len());
    &self.lines[self.offset.min(end)..end]
  }

  fn clamp(&mut self) {
    self.offset = self.offset.min(self.max_offset());
  }
}

/// Break `text` into lines no wider than `width` cells.
///
/// A trailing newline does not produce an extra empty line.
pub fn wrap(text: &str, width: u16) -> Vec<String> {
  let width = width.max(1) as usize;
  let mut out = Vec::new();

  for line in text.lines() {
    let mut current = String::new();
    let mut used = 0;
    for c in line.chars() {
      let w = if c == '\t' { 1 } else { c.width().unwrap_or(0) };
      if used + w > width && !current.is_empty() {
        out.push(std::mem::take(&mut current));
        used = 0;
      }
      current.push(if c == '\t' { ' ' } else { c });
      used += w;
    }
    out.push(current);
  }

  out
}
