use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Result of handling a key event in an input component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
  /// Key was handled, continue input mode
  Consumed,
  /// Enter pressed, here's the submitted value
  Submitted(String),
  /// Escape pressed, input cancelled
  Cancelled,
  /// Key not handled, pass to next handler
  NotHandled,
}

/// Reusable single-line text input.
///
/// The cursor is a char index, so multi-byte input edits cleanly.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
  buffer: String,
  cursor: usize,
}

impl TextInput {
  /// Get the current input value
  pub fn value(&self) -> &str {
    &self.buffer
  }

  /// Replace the value and move the cursor to the end
  pub fn set_value(&mut self, value: &str) {
    self.buffer = value.to_string();
    self.cursor = self.char_len();
  }

  /// Clear the input
  pub fn clear(&mut self) {
    self.buffer.clear();
    self.cursor = 0;
  }

  fn char_len(&self) -> usize {
    self.buffer.chars().count()
  }

  /// Byte offset of a char index
  fn byte_index(&self, char_idx: usize) -> usize {
    self
      .buffer
      .char_indices()
      .nth(char_idx)
      .map(|(i, _)| i)
      .unwrap_or(self.buffer.len())
  }

  /// Handle a key event, returning the result
  pub fn handle_key(&mut self, key: KeyEvent) -> InputResult {
    match key.code {
      KeyCode::Esc => InputResult::Cancelled,
      KeyCode::Enter => InputResult::Submitted(self.buffer.clone()),
      KeyCode::Backspace => {
        if self.cursor > 0 {
          self.cursor -= 1;
          let idx = self.byte_index(self.cursor);
          self.buffer.remove(idx);
        }
        InputResult::Consumed
      }
      KeyCode::Delete => {
        if self.cursor < self.char_len() {
          let idx = self.byte_index(self.cursor);
          self.buffer.remove(idx);
        }
        InputResult::Consumed
      }
      KeyCode::Left => {
        self.cursor = self.cursor.saturating_sub(1);
        InputResult::Consumed
      }
      KeyCode::Right => {
        if self.cursor < self.char_len() {
          self.cursor += 1;
        }
        InputResult::Consumed
      }
      KeyCode::Home => {
        self.cursor = 0;
        InputResult::Consumed
      }
      KeyCode::End => {
        self.cursor = self.char_len();
        InputResult::Consumed
      }
      KeyCode::Char('a') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.cursor = 0;
        InputResult::Consumed
      }
      KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.cursor = self.char_len();
        InputResult::Consumed
      }
      KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        // Clear line before cursor
        let idx = self.byte_index(self.cursor);
        self.buffer = self.buffer[idx..].to_string();
        self.cursor = 0;
        InputResult::Consumed
      }
      KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        // Delete word before cursor
        if self.cursor > 0 {
          let idx = self.byte_index(self.cursor);
          let before = &self.buffer[..idx];
          let new_idx = before.trim_end().rfind(' ').map(|i| i + 1).unwrap_or(0);
          self.cursor = self.buffer[..new_idx].chars().count();
          self.buffer = format!("{}{}", &self.buffer[..new_idx], &self.buffer[idx..]);
        }
        InputResult::Consumed
      }
      KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => InputResult::NotHandled,
      KeyCode::Char(c) => {
        let idx = self.byte_index(self.cursor);
        self.buffer.insert(idx, c);
        self.cursor += 1;
        InputResult::Consumed
      }
      _ => InputResult::NotHandled,
    }
  }

  /// Get cursor position (in chars) for rendering
  pub fn cursor_position(&self) -> usize {
    self.cursor
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn ctrl_key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::CONTROL)
  }

  fn type_str(input: &mut TextInput, s: &str) {
    for c in s.chars() {
      input.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[test]
  fn test_basic_input() {
    let mut input = TextInput::default();
    assert!(input.value().is_empty());

    type_str(&mut input, "hi");
    assert_eq!(input.value(), "hi");
  }

  #[test]
  fn test_submit() {
    let mut input = TextInput::default();
    type_str(&mut input, "test");

    let result = input.handle_key(key(KeyCode::Enter));
    assert_eq!(result, InputResult::Submitted("test".to_string()));
  }

  #[test]
  fn test_cancel() {
    let mut input = TextInput::default();
    input.handle_key(key(KeyCode::Char('x')));

    let result = input.handle_key(key(KeyCode::Esc));
    assert_eq!(result, InputResult::Cancelled);
  }

  #[test]
  fn test_backspace() {
    let mut input = TextInput::default();
    type_str(&mut input, "abc");
    input.handle_key(key(KeyCode::Backspace));
    assert_eq!(input.value(), "ab");
  }

  #[test]
  fn test_cursor_movement() {
    let mut input = TextInput::default();
    type_str(&mut input, "ac");
    input.handle_key(key(KeyCode::Left));
    input.handle_key(key(KeyCode::Char('b')));
    assert_eq!(input.value(), "abc");
  }

  #[test]
  fn test_ctrl_u_clear_before_cursor() {
    let mut input = TextInput::default();
    type_str(&mut input, "hello world");
    for _ in 0..5 {
      input.handle_key(key(KeyCode::Left));
    }
    input.handle_key(ctrl_key(KeyCode::Char('u')));
    assert_eq!(input.value(), "world");
  }

  #[test]
  fn test_ctrl_w_deletes_word() {
    let mut input = TextInput::default();
    type_str(&mut input, "hello world");
    input.handle_key(ctrl_key(KeyCode::Char('w')));
    assert_eq!(input.value(), "hello ");
    assert_eq!(input.cursor_position(), 6);
  }

  #[test]
  fn test_multibyte_editing() {
    let mut input = TextInput::default();
    type_str(&mut input, "héllo");
    input.handle_key(key(KeyCode::Left));
    input.handle_key(key(KeyCode::Left));
    input.handle_key(key(KeyCode::Left));
    input.handle_key(key(KeyCode::Backspace));
    assert_eq!(input.value(), "hllo");
    assert_eq!(input.cursor_position(), 1);
  }

  #[test]
  fn test_set_value_moves_cursor_to_end() {
    let mut input = TextInput::default();
    input.set_value("ünïcode");
    assert_eq!(input.cursor_position(), 7);
    input.handle_key(key(KeyCode::Char('!')));
    assert_eq!(input.value(), "ünïcode!");
  }

  #[test]
  fn test_unbound_control_keys_pass_through() {
    let mut input = TextInput::default();
    assert_eq!(
      input.handle_key(ctrl_key(KeyCode::Char('c'))),
      InputResult::NotHandled
    );
    assert!(input.value().is_empty());
  }
}
