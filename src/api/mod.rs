pub mod cached_client;
pub mod client;
pub mod endpoints;
pub mod types;

pub use cached_client::CachedPostsClient;
pub use client::PostsClient;
pub use types::{DeleteResponse, NewPost, Post, PostId, PostUpdate};
