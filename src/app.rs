use crate::api::endpoints::POSTS_KEY;
use crate::api::{CachedPostsClient, Post};
use crate::event::{Event, EventHandler};
use crate::ui::view::{View, ViewAction};
use crate::ui::{self, PostsView};
use chrono::{DateTime, Utc};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::{debug, info};

/// Application state
pub struct App {
  view: Box<dyn View>,
  api: CachedPostsClient,
  base_url: String,
  tick_rate: Duration,
  should_quit: bool,
}

impl App {
  pub fn new(api: CachedPostsClient, tick_rate: Duration) -> Self {
    let view = Box::new(PostsView::new(&api));
    let base_url = api.inner().base_url().to_string();

    Self {
      view,
      api,
      base_url,
      tick_rate,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(self.tick_rate);
    info!(base_url = self.base_url.as_str(), "started");

    let result = self.main_loop(&mut terminal, &mut events).await;

    // Cleanup terminal, even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("stopped");
    result
  }

  async fn main_loop<B: Backend>(
    &mut self,
    terminal: &mut Terminal<B>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {}
    }
    // Poll on every event so results land before the next draw
    self.view.tick();
  }

  fn handle_key(&mut self, key: KeyEvent) {
    // Ctrl-C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      self.should_quit = true;
      return;
    }

    match self.view.handle_key(key) {
      ViewAction::None => {}
      ViewAction::Quit => {
        debug!("quit requested");
        self.should_quit = true;
      }
    }
  }

  pub fn view_mut(&mut self) -> &mut dyn View {
    self.view.as_mut()
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// Number of posts in the cache, if the list has loaded
  pub fn post_count(&self) -> Option<usize> {
    self
      .api
      .store()
      .get::<Vec<Post>>(POSTS_KEY)
      .map(|entry| entry.data.len())
  }

  pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
    self.api.store().fetched_at(POSTS_KEY)
  }
}
