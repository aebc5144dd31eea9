mod components;
mod renderfns;
pub mod view;
mod views;

pub use views::PostsView;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::ListState;
use renderfns::{draw_footer, draw_header, format_fetched_at, HeaderInfo};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  let info = HeaderInfo {
    base_url: app.base_url(),
    post_count: app.post_count(),
    fetched_at: app.fetched_at().map(format_fetched_at),
  };
  draw_header(frame, chunks[0], &info);

  let view = app.view_mut();
  view.render(frame, chunks[1]);
  let shortcuts = view.shortcuts();
  draw_footer(frame, chunks[2], &shortcuts);
}

/// Clamp the list selection to `len` items, selecting the first when empty-handed
pub fn ensure_valid_selection(list_state: &mut ListState, len: usize) {
  if len == 0 {
    list_state.select(None);
    return;
  }
  match list_state.selected() {
    None => list_state.select(Some(0)),
    Some(idx) if idx >= len => list_state.select(Some(len - 1)),
    Some(_) => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_ensure_valid_selection() {
    let mut state = ListState::default();
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(0));

    state.select(Some(9));
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(2));

    ensure_valid_selection(&mut state, 0);
    assert_eq!(state.selected(), None);
  }
}
