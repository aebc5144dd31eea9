//! In-memory query cache with tag-based invalidation.
//!
//! This module keeps one slot per query key:
//! - Each slot remembers the tags it provides (e.g. `Posts`)
//! - Writes invalidate tags, which marks every slot providing them
//! - Queries consume the invalidation flag and refetch exactly once

mod store;
mod tags;

pub use store::CacheStore;
pub use tags::Tag;
