//! Async mutations for create/update/delete requests.
//!
//! A `Mutation<I, O>` wraps a write operation. Each call to `mutate` runs
//! the mutator on a spawned task; `poll` hands the outcome back exactly once.
//! On success the mutation invalidates the cache tags it was declared with,
//! so every query providing those tags refetches on its next poll.

use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::cache::{CacheStore, Tag};

/// The state of a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
  /// Mutation has not been started
  Idle,
  /// Mutation is in progress
  Loading,
  /// Last run succeeded
  Success,
  /// Last run failed
  Error,
}

type MutatorFn<I, O> = Box<dyn Fn(I) -> BoxFuture<'static, Result<O, String>> + Send + Sync>;

/// A write operation that invalidates cache tags on success.
pub struct Mutation<I, O> {
  state: MutationState,
  mutator: MutatorFn<I, O>,
  receiver: Option<mpsc::UnboundedReceiver<Result<O, String>>>,
  store: CacheStore,
  invalidates: Vec<Tag>,
}

impl<I, O> Mutation<I, O>
where
  I: Send + 'static,
  O: Send + 'static,
{
  pub fn new<F, Fut>(store: CacheStore, invalidates: &[Tag], mutator: F) -> Self
  where
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, String>> + Send + 'static,
  {
    Self {
      state: MutationState::Idle,
      mutator: Box::new(move |input| mutator(input).boxed()),
      receiver: None,
      store,
      invalidates: invalidates.to_vec(),
    }
  }

  #[cfg(test)]
  fn state(&self) -> &MutationState {
    &self.state
  }

  pub fn is_loading(&self) -> bool {
    self.state == MutationState::Loading
  }

  /// Start the mutation.
  ///
  /// Returns false (and does nothing) if a previous run is still in flight.
  pub fn mutate(&mut self, input: I) -> bool {
    if self.is_loading() {
      warn!("mutation already in flight, ignoring");
      return false;
    }

    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = MutationState::Loading;

    let future = (self.mutator)(input);
    tokio::spawn(async move {
      let _ = tx.send(future.await);
    });
    true
  }

  /// Poll for the outcome of the running mutation.
  ///
  /// Returns `Some` once per run, when the outcome arrives.
  pub fn poll(&mut self) -> Option<Result<O, String>> {
    let receiver = self.receiver.as_mut()?;

    let outcome = match receiver.try_recv() {
      Ok(outcome) => outcome,
      Err(mpsc::error::TryRecvError::Empty) => return None,
      Err(mpsc::error::TryRecvError::Disconnected) => Err("Mutation was cancelled".to_string()),
    };
    self.receiver = None;

    match &outcome {
      Ok(_) => {
        self.state = MutationState::Success;
        let invalidated = self.store.invalidate_tags(&self.invalidates);
        debug!(tags = ?self.invalidates, invalidated, "mutation succeeded");
      }
      Err(_) => self.state = MutationState::Error,
    }

    Some(outcome)
  }
}

impl<I, O> std::fmt::Debug for Mutation<I, O> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Mutation")
      .field("state", &self.state)
      .field("invalidates", &self.invalidates)
      .finish_non_exhaustive()
  }
}
