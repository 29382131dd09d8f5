use ratatui::style::{Color, Modifier, Style};

/// Catppuccin-inspired theme colors
pub struct Theme;

impl Theme {
  // Base colors
  pub const TEXT: Color = Color::Rgb(205, 214, 244); // Text
  pub const SUBTEXT: Color = Color::Rgb(166, 173, 200); // Subtext0
  pub const MUTED: Color = Color::Rgb(108, 112, 134); // Overlay1

  // Accent colors
  pub const ACCENT: Color = Color::Rgb(137, 180, 250); // Blue
  pub const ERROR: Color = Color::Rgb(243, 139, 168); // Red

  /// Tick/Tock header
  pub fn header() -> Style {
    Style::default().fg(Self::ACCENT).add_modifier(Modifier::BOLD)
  }

  /// Frame lines and printed log lines
  pub fn subtle() -> Style {
    Style::default().fg(Self::SUBTEXT)
  }

  pub fn text() -> Style {
    Style::default().fg(Self::TEXT)
  }

  pub fn placeholder() -> Style {
    Style::default().fg(Self::MUTED)
  }

  pub fn prompt() -> Style {
    Style::default().fg(Self::ACCENT)
  }

  pub fn cursor() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
  }

  pub fn error() -> Style {
    Style::default().fg(Self::ERROR).add_modifier(Modifier::BOLD)
  }
}
