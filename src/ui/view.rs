use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// A keyboard shortcut hint for display in the footer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
  pub key: &'static str,
  pub label: &'static str,
}

impl Shortcut {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self { key, label }
  }
}

/// Actions that a view can request in response to user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
  /// No action needed
  None,
  /// Leave the application
  Quit,
}

/// Trait for view behavior
///
/// Views handle their own input modes (form, dialogs, etc.) and return
/// actions for the App to execute: App → View → Components.
///
/// Views that load data asynchronously use Query<T> and Mutation<I, O>
/// internally and poll them in the tick() method.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Called on each tick to allow views to poll async queries
  fn tick(&mut self) {}

  /// Get keyboard shortcuts to display in the footer
  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![Shortcut::new("q", "quit")]
  }
}
