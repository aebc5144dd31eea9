//! Create/update form for a post.
//!
//! The form is a small state machine over (title, body, edit_id):
//! - Create: no edit_id, submitting yields `Submission::Create`
//! - Edit: edit_id set by `begin_edit`, submitting yields `Submission::Update`
//!
//! `reset` returns to Create with empty fields.

use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::api::{NewPost, Post, PostId, PostUpdate};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Position;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use thiserror::Error;

/// Which input has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
  #[default]
  Title,
  Body,
}

/// Events emitted by the form that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
  /// Enter pressed in the body field
  Submit,
  /// Esc pressed, focus should leave the form
  Leave,
}

/// A validated write request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
  Create(NewPost),
  Update(PostUpdate),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
  #[error("Please fill all fields.")]
  MissingFields,
}

#[derive(Debug, Clone, Default)]
pub struct PostForm {
  title: TextInput,
  body: TextInput,
  edit_id: Option<PostId>,
  focus: FormField,
}

impl PostForm {
  pub fn new() -> Self {
    Self::default()
  }

  #[cfg(test)]
  pub fn title(&self) -> &str {
    self.title.value()
  }

  #[cfg(test)]
  pub fn body(&self) -> &str {
    self.body.value()
  }

  pub fn edit_id(&self) -> Option<&PostId> {
    self.edit_id.as_ref()
  }

  pub fn is_editing(&self) -> bool {
    self.edit_id.is_some()
  }

  pub fn focus(&self) -> FormField {
    self.focus
  }

  pub fn set_focus(&mut self, field: FormField) {
    self.focus = field;
  }

  /// Switch to Edit for `post`, pre-filling both fields
  pub fn begin_edit(&mut self, post: &Post) {
    self.edit_id = Some(post.id.clone());
    self.title.set_value(&post.title);
    self.body.set_value(&post.body);
    self.focus = FormField::Title;
  }

  /// Back to Create with empty fields
  pub fn reset(&mut self) {
    self.edit_id = None;
    self.title.clear();
    self.body.clear();
    self.focus = FormField::Title;
  }

  /// Validate the fields and build the request for the current mode.
  ///
  /// Fields are checked trimmed but sent as typed.
  pub fn submission(&self) -> Result<Submission, FormError> {
    let title = self.title.value();
    let body = self.body.value();
    if title.trim().is_empty() || body.trim().is_empty() {
      return Err(FormError::MissingFields);
    }

    let submission = match &self.edit_id {
      Some(id) => Submission::Update(PostUpdate {
        id: id.clone(),
        title: title.to_string(),
        body: body.to_string(),
      }),
      None => Submission::Create(NewPost {
        title: title.to_string(),
        body: body.to_string(),
      }),
    };
    Ok(submission)
  }

  fn toggle_focus(&mut self) {
    self.focus = match self.focus {
      FormField::Title => FormField::Body,
      FormField::Body => FormField::Title,
    };
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FormEvent> {
    if matches!(
      key.code,
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down
    ) {
      self.toggle_focus();
      return KeyResult::Handled;
    }

    let input = match self.focus {
      FormField::Title => &mut self.title,
      FormField::Body => &mut self.body,
    };

    match input.handle_key(key) {
      InputResult::Submitted(_) => match self.focus {
        FormField::Title => {
          self.focus = FormField::Body;
          KeyResult::Handled
        }
        FormField::Body => KeyResult::Event(FormEvent::Submit),
      },
      InputResult::Cancelled => KeyResult::Event(FormEvent::Leave),
      InputResult::Consumed => KeyResult::Handled,
      InputResult::NotHandled => KeyResult::NotHandled,
    }
  }

  /// Render the form. `busy` replaces the submit label while a write runs.
  pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool, busy: bool) {
    let border = if focused { Color::Yellow } else { Color::Blue };
    let block = Block::default()
      .title(" Create / Update Post ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Title
        Constraint::Length(1), // Body
        Constraint::Length(1), // Spacer
        Constraint::Length(1), // Submit
      ])
      .split(inner);

    self.render_field(frame, rows[0], FormField::Title, focused);
    self.render_field(frame, rows[1], FormField::Body, focused);

    let (label, color) = match (self.is_editing(), busy) {
      (true, true) => ("Updating...", Color::DarkGray),
      (true, false) => ("[ Update Post ]", Color::Yellow),
      (false, true) => ("Adding...", Color::DarkGray),
      (false, false) => ("[ Add Post ]", Color::Cyan),
    };
    let mut submit = vec![Span::styled(label, Style::default().fg(color).bold())];
    if self.is_editing() {
      submit.push(Span::styled(
        "  <esc> cancel edit",
        Style::default().fg(Color::DarkGray),
      ));
    }
    frame.render_widget(Paragraph::new(Line::from(submit)), rows[3]);
  }

  fn render_field(&self, frame: &mut Frame, area: Rect, field: FormField, focused: bool) {
    const LABEL_WIDTH: u16 = 8;

    let (label, placeholder, input) = match field {
      FormField::Title => ("Title", "Title", &self.title),
      FormField::Body => ("Body", "Body", &self.body),
    };
    let active = focused && self.focus == field;

    let label_style = if active {
      Style::default().fg(Color::Yellow).bold()
    } else {
      Style::default().fg(Color::DarkGray)
    };

    let value = if input.value().is_empty() {
      Span::styled(placeholder, Style::default().fg(Color::DarkGray).italic())
    } else {
      Span::raw(input.value())
    };

    let line = Line::from(vec![
      Span::styled(format!("{:<width$}", label, width = LABEL_WIDTH as usize), label_style),
      value,
    ]);
    frame.render_widget(Paragraph::new(line), area);

    if active {
      let x = area
        .x
        .saturating_add(LABEL_WIDTH)
        .saturating_add(input.cursor_position() as u16)
        .min(area.right().saturating_sub(1));
      frame.set_cursor_position(Position::new(x, area.y));
    }
  }
}
