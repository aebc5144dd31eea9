use crate::api::{CachedPostsClient, DeleteResponse, NewPost, Post, PostId, PostUpdate};
use crate::mutation::Mutation;
use crate::query::{Query, QueryState};
use crate::ui::components::{
  Alert, AlertKind, ConfirmDialog, ConfirmEvent, FormEvent, FormField, KeyResult, PostForm,
  Submission,
};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::wrap;
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Flex;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use tracing::{debug, error, info};

const DELETE_QUESTION: &str = "Are you sure you want to delete this post?";

/// Height of the form block: four rows plus borders
const FORM_HEIGHT: u16 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
  List,
  Form,
}

/// The posts screen: create/update form above the post list
pub struct PostsView {
  query: Query<Vec<Post>>,
  add: Mutation<NewPost, Post>,
  update: Mutation<PostUpdate, Post>,
  delete: Mutation<PostId, DeleteResponse>,
  form: PostForm,
  focus: Focus,
  list_state: ListState,
  confirm: ConfirmDialog<PostId>,
  alert: Alert,
}

impl PostsView {
  pub fn new(api: &CachedPostsClient) -> Self {
    let mut query = api.posts_query();

    // Start fetching immediately
    query.fetch();

    Self {
      query,
      add: api.add_post(),
      update: api.update_post(),
      delete: api.delete_post(),
      form: PostForm::new(),
      focus: Focus::List,
      list_state: ListState::default(),
      confirm: ConfirmDialog::new(),
      alert: Alert::new(),
    }
  }

  fn posts(&self) -> &[Post] {
    self.query.data().map(|v| v.as_slice()).unwrap_or(&[])
  }

  fn selected_post(&self) -> Option<&Post> {
    self
      .list_state
      .selected()
      .and_then(|idx| self.posts().get(idx))
  }

  /// Whether the write for the form's current mode is in flight
  fn is_submitting(&self) -> bool {
    if self.form.is_editing() {
      self.update.is_loading()
    } else {
      self.add.is_loading()
    }
  }

  fn submit(&mut self) {
    if self.is_submitting() {
      return;
    }

    match self.form.submission() {
      Ok(Submission::Create(post)) => {
        debug!(title = post.title.as_str(), "adding post");
        self.add.mutate(post);
      }
      Ok(Submission::Update(update)) => {
        debug!(id = %update.id, "updating post");
        self.update.mutate(update);
      }
      Err(e) => self.alert.show(AlertKind::Error, e.to_string()),
    }
  }

  fn request_delete(&mut self) {
    if self.delete.is_loading() {
      return;
    }
    if let Some(id) = self.selected_post().map(|p| p.id.clone()) {
      self.confirm.show(DELETE_QUESTION, id);
    }
  }

  fn poll_mutations(&mut self) {
    if let Some(outcome) = self.add.poll() {
      match outcome {
        Ok(post) => {
          info!(id = %post.id, "post added");
          self.form.reset();
          self.alert.show(AlertKind::Info, "Post added successfully!");
        }
        Err(e) => {
          error!(error = %e, "Failed to add post");
          self.alert.show(AlertKind::Error, "Failed to add post");
        }
      }
    }

    if let Some(outcome) = self.update.poll() {
      match outcome {
        Ok(post) => {
          info!(id = %post.id, "post updated");
          self.form.reset();
          self.alert.show(AlertKind::Info, "Post updated successfully!");
        }
        Err(e) => {
          error!(error = %e, "Failed to update post");
          self.alert.show(AlertKind::Error, "Failed to update post");
        }
      }
    }

    if let Some(outcome) = self.delete.poll() {
      match outcome {
        Ok(response) => {
          info!(id = ?response.id, "post deleted");
          self.alert.show(AlertKind::Info, "Post deleted successfully!");
        }
        Err(e) => error!(error = %e, "Failed to delete post"),
      }
    }
  }

  // Key handling helpers for or_else chain pattern
  fn handle_overlays(&mut self, key: KeyEvent) -> Option<ViewAction> {
    if self.alert.handle_key(key) != KeyResult::NotHandled {
      return Some(ViewAction::None);
    }

    match self.confirm.handle_key(key) {
      KeyResult::Event(ConfirmEvent::Accepted(id)) => {
        debug!(%id, "delete confirmed");
        self.delete.mutate(id);
        Some(ViewAction::None)
      }
      KeyResult::Event(ConfirmEvent::Declined) => {
        debug!("delete declined");
        Some(ViewAction::None)
      }
      KeyResult::Handled => Some(ViewAction::None),
      KeyResult::NotHandled => None,
    }
  }

  fn handle_form(&mut self, key: KeyEvent) -> Option<ViewAction> {
    if self.focus != Focus::Form {
      return None;
    }

    match self.form.handle_key(key) {
      KeyResult::Event(FormEvent::Submit) => self.submit(),
      KeyResult::Event(FormEvent::Leave) => {
        if self.form.is_editing() {
          debug!("edit cancelled");
          self.form.reset();
        }
        self.focus = Focus::List;
      }
      KeyResult::Handled | KeyResult::NotHandled => {}
    }
    // The form owns every key while focused
    Some(ViewAction::None)
  }

  fn handle_list(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('e') => {
        if let Some(post) = self.selected_post().cloned() {
          self.form.begin_edit(&post);
          self.focus = Focus::Form;
        }
      }
      KeyCode::Char('d') => self.request_delete(),
      KeyCode::Char('i') | KeyCode::Tab => {
        self.form.set_focus(FormField::Title);
        self.focus = Focus::Form;
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Quit,
      _ => {}
    }
    ViewAction::None
  }

  /// Centered status message; lines after the first are dimmed details
  fn render_status(frame: &mut Frame, area: Rect, lines: &[&str], style: Style) {
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text: Vec<Line> = lines
      .iter()
      .enumerate()
      .map(|(i, line)| {
        if i == 0 {
          Line::styled(*line, style)
        } else {
          Line::styled(*line, Style::default().fg(Color::DarkGray))
        }
      })
      .collect();

    let [middle] = Layout::vertical([Constraint::Length(text.len() as u16)])
      .flex(Flex::Center)
      .areas(inner);
    let paragraph = Paragraph::new(text)
      .alignment(Alignment::Center)
      .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, middle);
  }
}

fn post_item(post: &Post, width: usize, editing: bool) -> ListItem<'static> {
  let mut title = vec![Span::styled(
    post.title.clone(),
    Style::default().fg(Color::White).bold(),
  )];
  if editing {
    title.push(Span::styled(
      "  (editing)",
      Style::default().fg(Color::Yellow),
    ));
  }

  let mut lines = vec![Line::from(title)];
  lines.extend(
    wrap(&post.body, width)
      .into_iter()
      .map(|l| Line::from(Span::styled(l, Style::default().fg(Color::Gray)))),
  );
  lines.push(Line::from(""));

  ListItem::new(Text::from(lines))
}

fn render_list(
  frame: &mut Frame,
  area: Rect,
  posts: &[Post],
  editing: Option<&PostId>,
  list_state: &mut ListState,
  refreshing: bool,
  focused: bool,
) {
  ensure_valid_selection(list_state, posts.len());

  let title = if refreshing {
    format!(" Posts ({}) (refreshing...) ", posts.len())
  } else {
    format!(" Posts ({}) ", posts.len())
  };

  let border = if focused { Color::Yellow } else { Color::Blue };
  let block = Block::default()
    .title(title)
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  if posts.is_empty() {
    let paragraph = Paragraph::new("No posts yet. Press 'i' to write one.")
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  // Room for the borders and the highlight symbol
  let width = area.width.saturating_sub(4) as usize;
  let items: Vec<ListItem> = posts
    .iter()
    .map(|post| post_item(post, width, editing == Some(&post.id)))
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(Style::default().bg(Color::DarkGray))
    .highlight_symbol("> ");

  frame.render_stateful_widget(list, area, list_state);
}

impl View for PostsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if let Some(action) = self.handle_overlays(key) {
      return action;
    }

    // Loading and error screens have nothing to interact with
    if !self.query.is_success() {
      return match key.code {
        KeyCode::Char('q') | KeyCode::Esc => ViewAction::Quit,
        _ => ViewAction::None,
      };
    }

    self
      .handle_form(key)
      .unwrap_or_else(|| self.handle_list(key))
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    match self.query.state() {
      QueryState::Idle | QueryState::Loading => {
        Self::render_status(frame, area, &["Loading..."], Style::default().bold());
      }
      QueryState::Error(e) => {
        Self::render_status(
          frame,
          area,
          &["Error loading posts", e.as_str()],
          Style::default().fg(Color::Red).bold(),
        );
      }
      QueryState::Success(posts) => {
        let chunks = Layout::default()
          .direction(Direction::Vertical)
          .constraints([Constraint::Length(FORM_HEIGHT), Constraint::Min(3)])
          .split(area);

        self.form.render(
          frame,
          chunks[0],
          self.focus == Focus::Form,
          self.is_submitting(),
        );
        render_list(
          frame,
          chunks[1],
          posts,
          self.form.edit_id(),
          &mut self.list_state,
          self.query.is_fetching(),
          self.focus == Focus::List,
        );
      }
    }

    self.confirm.render_overlay(frame, area);
    self.alert.render_overlay(frame, area);
  }

  fn tick(&mut self) {
    self.poll_mutations();
    self.query.poll();
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    if self.alert.is_active() {
      return vec![Shortcut::new("enter", "ok")];
    }
    if self.confirm.is_active() {
      return vec![Shortcut::new("y", "yes"), Shortcut::new("n", "no")];
    }
    if !self.query.is_success() {
      return vec![Shortcut::new("q", "quit")];
    }

    match self.focus {
      Focus::Form => vec![
        Shortcut::new("tab", "switch field"),
        match self.form.focus() {
          FormField::Title => Shortcut::new("enter", "next"),
          FormField::Body => Shortcut::new("enter", "submit"),
        },
        Shortcut::new("esc", if self.form.is_editing() { "cancel edit" } else { "back" }),
      ],
      Focus::List => vec![
        Shortcut::new("i", "write"),
        Shortcut::new("e", "edit"),
        Shortcut::new("d", "delete"),
        Shortcut::new("j/k", "move"),
        Shortcut::new("q", "quit"),
      ],
    }
  }
}

#[cfg(test)]
impl PostsView {
  fn form(&self) -> &PostForm {
    &self.form
  }

  fn alert_message(&self) -> Option<&str> {
    self.alert.message()
  }

  fn is_settled(&self) -> bool {
    !self.query.is_fetching()
      && !self.add.is_loading()
      && !self.update.is_loading()
      && !self.delete.is_loading()
  }
}
