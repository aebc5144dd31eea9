//! Posts client bound to the shared cache store.

use crate::cache::CacheStore;
use crate::mutation::Mutation;
use crate::query::Query;

use super::client::PostsClient;
use super::endpoints::{Endpoint, POSTS_KEY};
use super::types::{DeleteResponse, NewPost, Post, PostId, PostUpdate};

/// Posts client with cache-aware queries and mutations.
///
/// Reads go through the cache slot of their endpoint; writes invalidate the
/// tags their endpoint declares once the backend confirms them.
#[derive(Clone, Debug)]
pub struct CachedPostsClient {
  inner: PostsClient,
  store: CacheStore,
}

impl CachedPostsClient {
  pub fn new(inner: PostsClient, store: CacheStore) -> Self {
    Self { inner, store }
  }

  pub fn inner(&self) -> &PostsClient {
    &self.inner
  }

  pub fn store(&self) -> &CacheStore {
    &self.store
  }

  /// Query for the full post list.
  pub fn posts_query(&self) -> Query<Vec<Post>> {
    let client = self.inner.clone();
    Query::new(move || {
      let client = client.clone();
      async move { client.list_posts().await.map_err(|e| e.to_string()) }
    })
    .with_cache(
      self.store.clone(),
      POSTS_KEY,
      Endpoint::ListPosts.provides(),
    )
  }

  /// Mutation creating a post.
  pub fn add_post(&self) -> Mutation<NewPost, Post> {
    let client = self.inner.clone();
    Mutation::new(
      self.store.clone(),
      Endpoint::WRITE_INVALIDATES,
      move |post: NewPost| {
        let client = client.clone();
        async move { client.create_post(&post).await.map_err(|e| e.to_string()) }
      },
    )
  }

  /// Mutation replacing a post's title and body.
  pub fn update_post(&self) -> Mutation<PostUpdate, Post> {
    let client = self.inner.clone();
    Mutation::new(
      self.store.clone(),
      Endpoint::WRITE_INVALIDATES,
      move |update: PostUpdate| {
        let client = client.clone();
        async move { client.update_post(&update).await.map_err(|e| e.to_string()) }
      },
    )
  }

  /// Mutation deleting a post by id.
  pub fn delete_post(&self) -> Mutation<PostId, DeleteResponse> {
    let client = self.inner.clone();
    Mutation::new(
      self.store.clone(),
      Endpoint::WRITE_INVALIDATES,
      move |id: PostId| {
        let client = client.clone();
        async move { client.delete_post(&id).await.map_err(|e| e.to_string()) }
      },
    )
  }
}
