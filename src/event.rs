use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Periodic tick for UI refresh and query polling
  Tick,
}

/// Event handler that produces events from terminal input and a tick timer
pub struct EventHandler {
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  /// Create a new event handler with the given tick rate
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    // crossterm polling blocks, so it gets its own thread
    tokio::task::spawn_blocking(move || loop {
      if event::poll(tick_rate).unwrap_or(false) {
        if let Ok(CrosstermEvent::Key(key)) = event::read() {
          // Windows reports releases too
          if key.kind == KeyEventKind::Press && tx.send(Event::Key(key)).is_err() {
            break;
          }
        }
      } else if tx.send(Event::Tick).is_err() {
        break;
      }
    });

    Self { rx }
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}
