use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::ui::view::Shortcut;

/// Draw the footer bar with the current view's key hints
pub fn draw_footer(frame: &mut Frame, area: Rect, shortcuts: &[Shortcut]) {
  let mut spans = vec![Span::raw(" ")];

  for (i, shortcut) in shortcuts.iter().enumerate() {
    if i > 0 {
      spans.push(Span::raw("   "));
    }
    // Keys and brackets highlighted, descriptions dimmed
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}
