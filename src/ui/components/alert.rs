use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

/// How an alert is styled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
  Info,
  Error,
}

/// Modal message box, dismissed with Enter, Esc or space
#[derive(Debug, Clone, Default)]
pub struct Alert {
  message: Option<(AlertKind, String)>,
}

impl Alert {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.message.is_some()
  }

  #[cfg(test)]
  pub fn message(&self) -> Option<&str> {
    self.message.as_ref().map(|(_, m)| m.as_str())
  }

  pub fn show(&mut self, kind: AlertKind, message: impl Into<String>) {
    self.message = Some((kind, message.into()));
  }

  /// While shown, the alert swallows every key.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<()> {
    if !self.is_active() {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => {
        self.message = None;
        KeyResult::Event(())
      }
      _ => KeyResult::Handled,
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    let Some((kind, message)) = &self.message else {
      return;
    };

    let color = match kind {
      AlertKind::Info => Color::Green,
      AlertKind::Error => Color::Red,
    };

    let width = (message.chars().count() as u16 + 6)
      .max(24)
      .min(area.width.saturating_sub(4));
    let overlay_area = centered(area, width, 5);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(color))
      .title(" Notice ");

    let text = vec![
      Line::from(Span::styled(message.as_str(), Style::default().fg(color))),
      Line::from(""),
      Line::from(Span::styled(
        "<enter> ok",
        Style::default().fg(Color::DarkGray),
      )),
    ];
    let paragraph = Paragraph::new(text)
      .block(block)
      .alignment(Alignment::Center)
      .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, overlay_area);
  }
}

/// Rect of the given size centered in `area`, clipped to it
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  let x = area.x + (area.width.saturating_sub(width)) / 2;
  let y = area.y + (area.height.saturating_sub(height)) / 2;
  Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_inactive_passes_keys() {
    let mut alert = Alert::new();
    assert_eq!(alert.handle_key(key(KeyCode::Enter)), KeyResult::NotHandled);
  }

  #[test]
  fn test_swallows_keys_until_dismissed() {
    let mut alert = Alert::new();
    alert.show(AlertKind::Info, "Post added successfully!");

    assert_eq!(alert.handle_key(key(KeyCode::Char('d'))), KeyResult::Handled);
    assert_eq!(alert.message(), Some("Post added successfully!"));

    assert_eq!(alert.handle_key(key(KeyCode::Enter)), KeyResult::Event(()));
    assert!(!alert.is_active());
  }

  #[test]
  fn test_centered_clips_to_area() {
    let area = Rect::new(0, 0, 10, 4);
    assert_eq!(centered(area, 20, 2), Rect::new(0, 1, 10, 2));
    assert_eq!(centered(area, 4, 2), Rect::new(3, 1, 4, 2));
  }
}
