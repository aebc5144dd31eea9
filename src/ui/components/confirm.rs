use super::alert::centered;
use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

/// Events emitted by the confirm dialog that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmEvent<T> {
  /// User accepted; carries the value the dialog was opened with
  Accepted(T),
  /// User declined
  Declined,
}

/// Yes/no dialog guarding a destructive action
#[derive(Debug, Clone)]
pub struct ConfirmDialog<T> {
  pending: Option<(String, T)>,
}

impl<T> Default for ConfirmDialog<T> {
  fn default() -> Self {
    Self { pending: None }
  }
}

impl<T> ConfirmDialog<T> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.pending.is_some()
  }

  /// Ask `question` about `value`
  pub fn show(&mut self, question: impl Into<String>, value: T) {
    self.pending = Some((question.into(), value));
  }

  /// While shown, the dialog swallows every key.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<ConfirmEvent<T>> {
    if !self.is_active() {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => match self.pending.take() {
        Some((_, value)) => KeyResult::Event(ConfirmEvent::Accepted(value)),
        None => KeyResult::Handled,
      },
      KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
        self.pending = None;
        KeyResult::Event(ConfirmEvent::Declined)
      }
      _ => KeyResult::Handled,
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    let Some((question, _)) = &self.pending else {
      return;
    };

    let width = (question.chars().count() as u16 + 6)
      .max(30)
      .min(area.width.saturating_sub(4));
    let overlay_area = centered(area, width, 5);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Confirm ");

    let text = vec![
      Line::from(question.as_str()),
      Line::from(""),
      Line::from(vec![
        Span::styled("<y>", Style::default().fg(Color::Cyan)),
        Span::styled(" yes   ", Style::default().fg(Color::DarkGray)),
        Span::styled("<n>", Style::default().fg(Color::Cyan)),
        Span::styled(" no", Style::default().fg(Color::DarkGray)),
      ]),
    ];
    let paragraph = Paragraph::new(text)
      .block(block)
      .alignment(Alignment::Center)
      .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, overlay_area);
  }
}
