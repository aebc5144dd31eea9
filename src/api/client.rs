use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use super::endpoints::Endpoint;
use super::types::{DeleteResponse, NewPost, Post, PostId, PostUpdate};
use crate::config::ApiConfig;

/// Errors from the posts backend
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("invalid base url {url:?}: {source}")]
  InvalidUrl {
    url: String,
    #[source]
    source: url::ParseError,
  },

  #[error("{endpoint} failed: {source}")]
  Network {
    endpoint: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("{endpoint} returned {status}")]
  Status { endpoint: String, status: StatusCode },

  #[error("{endpoint} returned an unreadable body: {source}")]
  Decode {
    endpoint: String,
    #[source]
    source: reqwest::Error,
  },
}

/// HTTP client for the posts resource
#[derive(Clone, Debug)]
pub struct PostsClient {
  http: reqwest::Client,
  base_url: Url,
}

impl PostsClient {
  pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
    let base_url = Url::parse(&config.base_url).map_err(|source| ApiError::InvalidUrl {
      url: config.base_url.clone(),
      source,
    })?;

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(|source| ApiError::Network {
        endpoint: "client setup".to_string(),
        source,
      })?;

    Ok(Self { http, base_url })
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  /// Resolve an endpoint path under the base url, keeping any base path prefix.
  fn url_for(&self, endpoint: &Endpoint) -> Result<Url, ApiError> {
    let joined = format!(
      "{}{}",
      self.base_url.as_str().trim_end_matches('/'),
      endpoint.path()
    );
    Url::parse(&joined).map_err(|source| ApiError::InvalidUrl {
      url: joined,
      source,
    })
  }

  async fn send<B, R>(&self, endpoint: Endpoint, body: Option<&B>) -> Result<R, ApiError>
  where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
  {
    let description = endpoint.description();
    let url = self.url_for(&endpoint)?;
    debug!(endpoint = description.as_str(), %url, "sending request");

    let mut request = self.http.request(endpoint.method(), url);
    if let Some(body) = body {
      request = request.json(body);
    }

    let response = request.send().await.map_err(|source| {
      error!(endpoint = description.as_str(), error = %source, "request failed");
      ApiError::Network {
        endpoint: description.clone(),
        source,
      }
    })?;

    let status = response.status();
    if !status.is_success() {
      error!(endpoint = description.as_str(), %status, "request rejected");
      return Err(ApiError::Status {
        endpoint: description,
        status,
      });
    }

    debug!(endpoint = description.as_str(), %status, "response received");
    response
      .json::<R>()
      .await
      .map_err(|source| ApiError::Decode {
        endpoint: description,
        source,
      })
  }

  /// Fetch every post, in backend order
  pub async fn list_posts(&self) -> Result<Vec<Post>, ApiError> {
    self.send::<(), _>(Endpoint::ListPosts, None).await
  }

  /// Create a post and return it with its assigned id
  pub async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError> {
    self.send(Endpoint::CreatePost, Some(post)).await
  }

  /// Replace a post's title and body
  pub async fn update_post(&self, update: &PostUpdate) -> Result<Post, ApiError> {
    self.send(Endpoint::UpdatePost(update.id.clone()), Some(update)).await
  }

  /// Delete a post by id
  pub async fn delete_post(&self, id: &PostId) -> Result<DeleteResponse, ApiError> {
    self.send::<(), _>(Endpoint::DeletePost(id.clone()), None).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use wiremock::matchers::{body_json, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn client_for(server: &MockServer) -> PostsClient {
    PostsClient::new(&ApiConfig {
      base_url: server.uri(),
      timeout_secs: 5,
    })
    .unwrap()
  }

  #[tokio::test]
  async fn test_list_posts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/posts"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!([
        {"id": 1, "title": "A", "body": "B"},
        {"id": "2", "title": "C", "body": "D"}
      ])))
      .expect(1)
      .mount(&server)
      .await;

    let posts = client_for(&server).list_posts().await.unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].title, "A");
    assert_eq!(posts[1].id, PostId::from(2));
  }

  #[tokio::test]
  async fn test_opaque_id_flows_back_into_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/posts"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!([
        {"id": "1", "title": "A", "body": "B"},
        {"id": "a1b2", "title": "C", "body": "D"}
      ])))
      .expect(1)
      .mount(&server)
      .await;
    Mock::given(method("PUT"))
      .and(path("/posts/a1b2"))
      .and(body_json(json!({"title": "C!", "body": "D"})))
      .respond_with(
        ResponseTemplate::new(200).set_body_json(json!({"id": "a1b2", "title": "C!", "body": "D"})),
      )
      .expect(1)
      .mount(&server)
      .await;
    Mock::given(method("DELETE"))
      .and(path("/posts/a1b2"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
      .expect(1)
      .mount(&server)
      .await;

    let client = client_for(&server);
    let posts = client.list_posts().await.unwrap();
    let target = posts[1].clone();
    assert_eq!(target.id.as_str(), "a1b2");

    let updated = client
      .update_post(&PostUpdate {
        id: target.id.clone(),
        title: "C!".to_string(),
        body: target.body.clone(),
      })
      .await
      .unwrap();
    assert_eq!(updated.id, target.id);

    client.delete_post(&target.id).await.unwrap();
    server.verify().await;
  }

  #[tokio::test]
  async fn test_create_post_sends_title_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/posts"))
      .and(body_json(json!({"title": "Hello", "body": "World"})))
      .respond_with(
        ResponseTemplate::new(201).set_body_json(json!({"id": 5, "title": "Hello", "body": "World"})),
      )
      .expect(1)
      .mount(&server)
      .await;

    let created = client_for(&server)
      .create_post(&NewPost {
        title: "Hello".to_string(),
        body: "World".to_string(),
      })
      .await
      .unwrap();
    assert_eq!(created.id, PostId::from(5));
  }

  #[tokio::test]
  async fn test_update_post_puts_to_id_path() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
      .and(path("/posts/3"))
      .and(body_json(json!({"title": "New", "body": "Text"})))
      .respond_with(
        ResponseTemplate::new(200).set_body_json(json!({"id": 3, "title": "New", "body": "Text"})),
      )
      .expect(1)
      .mount(&server)
      .await;

    let updated = client_for(&server)
      .update_post(&PostUpdate {
        id: PostId::from(3),
        title: "New".to_string(),
        body: "Text".to_string(),
      })
      .await
      .unwrap();
    assert_eq!(updated.title, "New");
  }

  #[tokio::test]
  async fn test_delete_post_accepts_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
      .and(path("/posts/8"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
      .expect(1)
      .mount(&server)
      .await;

    let response = client_for(&server).delete_post(&PostId::from(8)).await.unwrap();
    assert_eq!(response, DeleteResponse::default());
  }

  #[tokio::test]
  async fn test_non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
      .and(path("/posts/404"))
      .respond_with(ResponseTemplate::new(404))
      .mount(&server)
      .await;

    let err = client_for(&server).delete_post(&PostId::from(404)).await.unwrap_err();
    match err {
      ApiError::Status { status, endpoint } => {
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(endpoint, "DELETE /posts/404");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[tokio::test]
  async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/posts"))
      .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
      .mount(&server)
      .await;

    let err = client_for(&server).list_posts().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }));
  }

  #[tokio::test]
  async fn test_unreachable_backend_is_network_error() {
    let client = PostsClient::new(&ApiConfig {
      base_url: "http://127.0.0.1:9".to_string(),
      timeout_secs: 1,
    })
    .unwrap();

    let err = client.list_posts().await.unwrap_err();
    assert!(matches!(err, ApiError::Network { .. }));
  }

  #[test]
  fn test_invalid_base_url() {
    let err = PostsClient::new(&ApiConfig {
      base_url: "not a url".to_string(),
      timeout_secs: 1,
    })
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidUrl { .. }));
  }

  #[test]
  fn test_url_keeps_base_path() {
    let client = PostsClient::new(&ApiConfig {
      base_url: "http://localhost:3001/api/".to_string(),
      timeout_secs: 1,
    })
    .unwrap();
    assert_eq!(
      client.url_for(&Endpoint::UpdatePost(PostId::from(2))).unwrap().as_str(),
      "http://localhost:3001/api/posts/2"
    );
  }
}
