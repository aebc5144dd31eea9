//! Process-wide cache store shared by all queries and mutations.

use chrono::{DateTime, Utc};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use super::Tag;

/// A cached query result.
#[derive(Debug, Clone)]
pub struct CachedEntry<T> {
  /// The cached data
  pub data: T,
  /// Whether a write has invalidated this entry since it was stored
  pub invalidated: bool,
}

/// One cache slot per query key.
struct Slot {
  data: Option<Box<dyn Any + Send + Sync>>,
  tags: Vec<Tag>,
  fetched_at: Option<DateTime<Utc>>,
  invalidated: bool,
}

impl Slot {
  fn new(tags: &[Tag]) -> Self {
    Self {
      data: None,
      tags: tags.to_vec(),
      fetched_at: None,
      invalidated: false,
    }
  }

  fn provides_any(&self, tags: &[Tag]) -> bool {
    self.tags.iter().any(|t| tags.contains(t))
  }
}

/// Shared handle to the query cache.
///
/// Cloning is cheap; every clone sees the same slots.
#[derive(Clone, Default)]
pub struct CacheStore {
  slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl CacheStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
    self.slots.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Declare a slot and the tags it provides. Existing data is kept.
  pub fn register(&self, key: &str, tags: &[Tag]) {
    let mut slots = self.lock();
    let slot = slots.entry(key.to_string()).or_insert_with(|| Slot::new(tags));
    slot.tags = tags.to_vec();
  }

  /// Read a cached value. A missing slot, an empty slot and a type
  /// mismatch all read as a miss.
  pub fn get<T: Clone + 'static>(&self, key: &str) -> Option<CachedEntry<T>> {
    let slots = self.lock();
    let slot = slots.get(key)?;
    let data = slot.data.as_ref()?.downcast_ref::<T>()?.clone();

    Some(CachedEntry {
      data,
      invalidated: slot.invalidated,
    })
  }

  /// Store a query result.
  ///
  /// A pending invalidation survives the insert: the data may have been
  /// requested before the write that invalidated it completed.
  pub fn insert<T: Send + Sync + 'static>(&self, key: &str, tags: &[Tag], data: T) {
    let mut slots = self.lock();
    let slot = slots.entry(key.to_string()).or_insert_with(|| Slot::new(tags));
    slot.data = Some(Box::new(data));
    slot.fetched_at = Some(Utc::now());
    debug!(key, "cache entry stored");
  }

  /// Mark every slot providing any of `tags` as invalidated.
  ///
  /// Returns the number of slots marked.
  pub fn invalidate_tags(&self, tags: &[Tag]) -> usize {
    let mut slots = self.lock();
    let mut count = 0;
    for (key, slot) in slots.iter_mut() {
      if slot.provides_any(tags) {
        slot.invalidated = true;
        count += 1;
        debug!(key = key.as_str(), ?tags, "cache entry invalidated");
      }
    }
    count
  }

  /// Consume the invalidation flag for `key`.
  ///
  /// Returns true at most once per invalidation.
  pub fn take_invalidation(&self, key: &str) -> bool {
    let mut slots = self.lock();
    match slots.get_mut(key) {
      Some(slot) if slot.invalidated => {
        slot.invalidated = false;
        true
      }
      _ => false,
    }
  }

  /// When the slot for `key` last received data.
  pub fn fetched_at(&self, key: &str) -> Option<DateTime<Utc>> {
    self.lock().get(key).and_then(|slot| slot.fetched_at)
  }
}

impl std::fmt::Debug for CacheStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let slots = self.lock();
    f.debug_struct("CacheStore")
      .field("keys", &slots.keys().collect::<Vec<_>>())
      .finish()
  }
}
