//! Async query abstraction for data fetching with caching support.
//!
//! Inspired by TanStack Query, this module provides a `Query<T>` type that
//! encapsulates async data fetching, loading states, and error handling.
//! A query bound to a [`CacheStore`] reads through the cache and refetches
//! once whenever one of the tags it provides is invalidated.
//!
//! # Example
//!
//! ```ignore
//! let client = posts_client.clone();
//! let mut query = Query::new(move || {
//!     let client = client.clone();
//!     async move { client.list_posts().await.map_err(|e| e.to_string()) }
//! })
//! .with_cache(store, "posts", &[Tag::Posts]);
//!
//! // Start fetching
//! query.fetch();
//!
//! // In event loop tick
//! if query.poll() {
//!     // State changed, trigger re-render
//! }
//!
//! // In render
//! match query.state() {
//!     QueryState::Loading => render_spinner(),
//!     QueryState::Success(data) => render_data(data),
//!     QueryState::Error(e) => render_error(e),
//!     QueryState::Idle => {}
//! }
//! ```

use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use tokio::sync::mpsc;
use tracing::debug;

use crate::cache::{CacheStore, Tag};

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Query has not been started
  Idle,
  /// Query is fetching and has no data to show yet
  Loading,
  /// Query completed successfully
  Success(T),
  /// Query failed with an error
  Error(String),
}

impl<T> QueryState<T> {
  pub fn is_success(&self) -> bool {
    matches!(self, QueryState::Success(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }
}

/// A factory function that creates futures for fetching data
type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T, String>> + Send + Sync>;

/// Where a query keeps its results between fetches.
struct CacheBinding {
  store: CacheStore,
  key: String,
  tags: Vec<Tag>,
}

/// Async query for data fetching with state management.
///
/// Query<T> encapsulates:
/// - The fetching logic (via a closure)
/// - Loading/success/error states
/// - Async result handling via channels
/// - Read-through caching and tag invalidation (when bound to a store)
pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
  cache: Option<CacheBinding>,
}

impl<T: Clone + Send + Sync + 'static> Query<T> {
  /// Create a new query with the given fetcher function.
  ///
  /// The fetcher is a closure that returns a future. It will be called
  /// each time the query goes to the network.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || fetcher().boxed()),
      receiver: None,
      cache: None,
    }
  }

  /// Bind this query to a cache slot providing `tags`.
  pub fn with_cache(mut self, store: CacheStore, key: &str, tags: &[Tag]) -> Self {
    store.register(key, tags);
    self.cache = Some(CacheBinding {
      store,
      key: key.to_string(),
      tags: tags.to_vec(),
    });
    self
  }

  /// Get the current state of the query.
  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  /// Get the data if the query succeeded.
  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  /// Check if any request is in flight, including background refetches.
  pub fn is_fetching(&self) -> bool {
    self.receiver.is_some()
  }

  /// Check if the query succeeded.
  pub fn is_success(&self) -> bool {
    self.state.is_success()
  }

  /// Start fetching data if not already fetching.
  ///
  /// A valid cache entry is served without touching the network.
  pub fn fetch(&mut self) {
    if self.is_fetching() {
      return;
    }

    if let Some(binding) = &self.cache {
      if let Some(entry) = binding.store.get::<T>(&binding.key) {
        if !entry.invalidated {
          debug!(key = binding.key.as_str(), "query served from cache");
          self.state = QueryState::Success(entry.data);
          return;
        }
      }
      // This fetch already satisfies any pending invalidation
      binding.store.take_invalidation(&binding.key);
    }

    self.start_fetch();
  }

  /// Poll for results from a pending fetch and for cache invalidations.
  ///
  /// Returns `true` if the state changed or a refetch started.
  /// Call this in your event loop tick handler.
  pub fn poll(&mut self) -> bool {
    let mut changed = self.poll_receiver();

    if !self.is_fetching() {
      let invalidated = self
        .cache
        .as_ref()
        .is_some_and(|b| b.store.take_invalidation(&b.key));
      if invalidated {
        debug!("query invalidated, refetching");
        self.start_fetch();
        changed = true;
      }
    }

    changed
  }

  fn poll_receiver(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    // Try to receive without blocking
    match receiver.try_recv() {
      Ok(Ok(data)) => {
        if let Some(binding) = &self.cache {
          binding
            .store
            .insert(&binding.key, &binding.tags, data.clone());
        }
        self.state = QueryState::Success(data);
        self.receiver = None;
        true
      }
      Ok(Err(error)) => {
        self.state = QueryState::Error(error);
        self.receiver = None;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Sender dropped without sending - treat as error
        self.state = QueryState::Error("Query was cancelled".to_string());
        self.receiver = None;
        true
      }
    }
  }

  /// Internal: start the fetch operation
  fn start_fetch(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);

    // Keep showing previous data during a background refetch
    if !self.state.is_success() {
      self.state = QueryState::Loading;
    }

    let future = (self.fetcher)();
    tokio::spawn(async move {
      let result = future.await;
      // Ignore send errors - receiver may have been dropped
      let _ = tx.send(result);
    });
  }
}

// Query is not Clone because the fetcher is boxed and receiver is owned.

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .field("fetching", &self.receiver.is_some())
      .field("cache_key", &self.cache.as_ref().map(|b| b.key.as_str()))
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::sync::Arc;
  use std::time::Duration;

  fn counting_query(counter: Arc<AtomicU32>) -> Query<u32> {
    Query::new(move || {
      let counter = counter.clone();
      async move { Ok::<_, String>(counter.fetch_add(1, Ordering::SeqCst)) }
    })
  }

  async fn settle<T: Clone + Send + Sync + 'static>(query: &mut Query<T>) {
    for _ in 0..100 {
      query.poll();
      if !query.is_fetching() {
        return;
      }
      tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("query did not settle");
  }

  #[tokio::test]
  async fn test_query_success() {
    let mut query = Query::new(|| async { Ok::<_, String>(vec![1, 2, 3]) });

    assert!(matches!(query.state(), QueryState::Idle));

    query.fetch();
    assert!(matches!(query.state(), QueryState::Loading));

    // Wait for the result
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert!(query.is_success());
    assert_eq!(query.data(), Some(&vec![1, 2, 3]));
  }

  #[tokio::test]
  async fn test_query_error() {
    let mut query: Query<i32> = Query::new(|| async { Err("Something went wrong".to_string()) });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert!(matches!(query.state(), QueryState::Error(e) if e == "Something went wrong"));
  }

  #[tokio::test]
  async fn test_fetch_while_loading_is_noop() {
    let counter = Arc::new(AtomicU32::new(0));
    let counter_clone = counter.clone();
    let mut query = Query::new(move || {
      let counter = counter_clone.clone();
      async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok::<_, String>(counter.fetch_add(1, Ordering::SeqCst))
      }
    });

    query.fetch();
    assert!(matches!(query.state(), QueryState::Loading));

    // Second fetch should be no-op
    query.fetch();
    settle(&mut query).await;
    assert_eq!(counter.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_cached_query_reads_through_store() {
    let store = CacheStore::new();
    let counter = Arc::new(AtomicU32::new(0));

    let mut first = counting_query(counter.clone()).with_cache(store.clone(), "n", &[Tag::Posts]);
    first.fetch();
    settle(&mut first).await;
    assert_eq!(first.data(), Some(&0));

    // A second subscriber to the same key is served from the cache
    let mut second = counting_query(counter.clone()).with_cache(store, "n", &[Tag::Posts]);
    second.fetch();
    assert!(!second.is_fetching());
    assert_eq!(second.data(), Some(&0));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_invalidation_triggers_exactly_one_refetch() {
    let store = CacheStore::new();
    let counter = Arc::new(AtomicU32::new(0));

    let mut query = counting_query(counter.clone()).with_cache(store.clone(), "n", &[Tag::Posts]);
    query.fetch();
    settle(&mut query).await;

    store.invalidate_tags(&[Tag::Posts]);
    assert!(query.poll());
    assert!(query.is_fetching());
    // Previous data stays visible during the refetch
    assert_eq!(query.data(), Some(&0));

    settle(&mut query).await;
    for _ in 0..5 {
      assert!(!query.poll());
    }

    assert_eq!(query.data(), Some(&1));
    assert_eq!(counter.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_invalidation_during_fetch_refetches_after() {
    let store = CacheStore::new();
    let counter = Arc::new(AtomicU32::new(0));
    let counter_clone = counter.clone();

    let mut query = Query::new(move || {
      let counter = counter_clone.clone();
      async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok::<_, String>(counter.fetch_add(1, Ordering::SeqCst))
      }
    })
    .with_cache(store.clone(), "n", &[Tag::Posts]);

    query.fetch();
    store.invalidate_tags(&[Tag::Posts]);

    settle(&mut query).await;
    settle(&mut query).await;
    assert_eq!(query.data(), Some(&1));
    assert_eq!(counter.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_unrelated_query_ignores_invalidation() {
    let store = CacheStore::new();
    let counter = Arc::new(AtomicU32::new(0));

    let mut query = counting_query(counter.clone()).with_cache(store.clone(), "other", &[]);
    query.fetch();
    settle(&mut query).await;

    store.invalidate_tags(&[Tag::Posts]);
    assert!(!query.poll());
    assert_eq!(counter.load(Ordering::SeqCst), 1);
  }
}
