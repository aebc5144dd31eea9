use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Backend-assigned post id.
///
/// Opaque to the client: json-server 0.x sends numbers, 1.x sends strings
/// such as `"3f2a"`. Either way it is echoed back verbatim in `/posts/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for PostId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<u64> for PostId {
  fn from(id: u64) -> Self {
    Self(id.to_string())
  }
}

impl From<&str> for PostId {
  fn from(id: &str) -> Self {
    Self(id.to_string())
  }
}

impl<'de> Deserialize<'de> for PostId {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
      Number(u64),
      Text(String),
    }

    match RawId::deserialize(deserializer)? {
      RawId::Number(n) => Ok(Self(n.to_string())),
      RawId::Text(s) if s.trim().is_empty() => Err(serde::de::Error::custom("empty post id")),
      RawId::Text(s) => Ok(Self(s)),
    }
  }
}

/// A post as stored by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
  pub id: PostId,
  pub title: String,
  pub body: String,
}

/// Payload for creating a post. The backend assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPost {
  pub title: String,
  pub body: String,
}

/// Payload for replacing a post's fields.
///
/// The id selects the path; only title and body go in the request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostUpdate {
  #[serde(skip)]
  pub id: PostId,
  pub title: String,
  pub body: String,
}

/// Response to a delete request. json-server answers with `{}`, so both
/// fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeleteResponse {
  #[serde(default)]
  pub success: Option<bool>,
  #[serde(default)]
  pub id: Option<PostId>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_post_numeric_id() {
    let post: Post = serde_json::from_value(json!({"id": 1, "title": "A", "body": "B"})).unwrap();
    assert_eq!(
      post,
      Post {
        id: PostId::from(1),
        title: "A".to_string(),
        body: "B".to_string(),
      }
    );
  }

  #[test]
  fn test_post_string_ids_kept_verbatim() {
    let posts: Vec<Post> = serde_json::from_value(json!([
      {"id": "17", "title": "A", "body": "B"},
      {"id": "3f2a", "title": "C", "body": "D"}
    ]))
    .unwrap();
    assert_eq!(posts[0].id.as_str(), "17");
    assert_eq!(posts[1].id.as_str(), "3f2a");
  }

  #[test]
  fn test_post_empty_id_rejected() {
    let result: Result<Post, _> =
      serde_json::from_value(json!({"id": " ", "title": "A", "body": "B"}));
    assert!(result.is_err());
  }

  #[test]
  fn test_update_body_omits_id() {
    let update = PostUpdate {
      id: PostId::from("a1b2"),
      title: "T".to_string(),
      body: "B".to_string(),
    };
    assert_eq!(
      serde_json::to_value(&update).unwrap(),
      json!({"title": "T", "body": "B"})
    );
  }

  #[test]
  fn test_delete_response_empty_object() {
    let response: DeleteResponse = serde_json::from_value(json!({})).unwrap();
    assert_eq!(response, DeleteResponse::default());
  }

  #[test]
  fn test_delete_response_full() {
    let response: DeleteResponse =
      serde_json::from_value(json!({"success": true, "id": "4"})).unwrap();
    assert_eq!(response.success, Some(true));
    assert_eq!(response.id, Some(PostId::from(4)));
  }
}
