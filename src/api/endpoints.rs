//! Endpoint table for the posts resource.

use reqwest::Method;

use super::types::PostId;
use crate::cache::Tag;

/// Cache key of the list query.
pub const POSTS_KEY: &str = "posts";

/// Operations on the posts resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
  /// GET /posts
  ListPosts,
  /// POST /posts
  CreatePost,
  /// PUT /posts/{id}
  UpdatePost(PostId),
  /// DELETE /posts/{id}
  DeletePost(PostId),
}

impl Endpoint {
  /// Tags made stale by any successful write, whatever post it targets.
  pub const WRITE_INVALIDATES: &'static [Tag] = &[Tag::Posts];

  pub fn method(&self) -> Method {
    match self {
      Self::ListPosts => Method::GET,
      Self::CreatePost => Method::POST,
      Self::UpdatePost(_) => Method::PUT,
      Self::DeletePost(_) => Method::DELETE,
    }
  }

  pub fn path(&self) -> String {
    match self {
      Self::ListPosts | Self::CreatePost => "/posts".to_string(),
      Self::UpdatePost(id) | Self::DeletePost(id) => format!("/posts/{}", id.as_str()),
    }
  }

  /// Tags whose cached results this endpoint reads.
  pub fn provides(&self) -> &'static [Tag] {
    match self {
      Self::ListPosts => &[Tag::Posts],
      _ => &[],
    }
  }

  /// Tags made stale when this endpoint succeeds.
  pub fn invalidates(&self) -> &'static [Tag] {
    match self {
      Self::ListPosts => &[],
      Self::CreatePost | Self::UpdatePost(_) | Self::DeletePost(_) => Self::WRITE_INVALIDATES,
    }
  }

  pub fn description(&self) -> String {
    format!("{} {}", self.method(), self.path())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_methods_and_paths() {
    assert_eq!(Endpoint::ListPosts.description(), "GET /posts");
    assert_eq!(Endpoint::CreatePost.description(), "POST /posts");
    assert_eq!(
      Endpoint::UpdatePost(PostId::from(7)).description(),
      "PUT /posts/7"
    );
    assert_eq!(
      Endpoint::DeletePost(PostId::from("a1b2")).description(),
      "DELETE /posts/a1b2"
    );
  }

  #[test]
  fn test_reads_provide_and_writes_invalidate() {
    assert_eq!(Endpoint::ListPosts.provides(), &[Tag::Posts]);
    assert!(Endpoint::ListPosts.invalidates().is_empty());

    for write in [
      Endpoint::CreatePost,
      Endpoint::UpdatePost(PostId::from(1)),
      Endpoint::DeletePost(PostId::from("a1b2")),
    ] {
      assert!(write.provides().is_empty());
      assert_eq!(write.invalidates(), Endpoint::WRITE_INVALIDATES);
    }
  }
}
