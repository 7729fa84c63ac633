//! Request and response types for the offline fetch layer.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

/// Identity of a request in the response cache: method plus full URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
  pub method: Method,
  pub url: Url,
}

impl RequestKey {
  /// Stable, fixed-length key for storage backends.
  pub fn storage_hash(&self) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.method.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(self.url.as_str().as_bytes());
    hex::encode(hasher.finalize())
  }
}

/// An outgoing request, transport-agnostic.
#[derive(Debug, Clone)]
pub struct FetchRequest {
  pub method: Method,
  pub url: Url,
  pub headers: Vec<(String, String)>,
  pub body: Option<Vec<u8>>,
}

impl FetchRequest {
  pub fn new(method: Method, url: Url) -> Self {
    Self {
      method,
      url,
      headers: Vec::new(),
      body: None,
    }
  }

  pub fn get(url: Url) -> Self {
    Self::new(Method::GET, url)
  }

  /// Attach a JSON body and the matching content type.
  pub fn with_json<T: Serialize>(mut self, value: &T) -> serde_json::Result<Self> {
    self.body = Some(serde_json::to_vec(value)?);
    self
      .headers
      .push(("Content-Type".to_string(), "application/json".to_string()));
    Ok(self)
  }

  pub fn is_get(&self) -> bool {
    self.method == Method::GET
  }

  /// Cache identity of this request.
  pub fn key(&self) -> RequestKey {
    RequestKey {
      method: self.method.clone(),
      url: self.url.clone(),
    }
  }
}

/// A response as seen by callers and as stored in the cache.
///
/// `Clone` stands in for the platform's "duplicate the body before returning"
/// step: the cached copy and the returned response are independent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResponse {
  pub status: u16,
  pub headers: Vec<(String, String)>,
  pub body: Vec<u8>,
}

impl FetchResponse {
  /// The synthetic offline response. Callers branch on this exact shape.
  pub fn network_error() -> Self {
    Self {
      status: 408,
      headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
      body: b"Network error".to_vec(),
    }
  }

  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }

  /// First header value matching `name`, case-insensitive.
  pub fn header(&self, name: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(k, _)| k.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }

  pub fn json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
    serde_json::from_slice(&self.body)
  }

  pub fn text_lossy(&self) -> String {
    String::from_utf8_lossy(&self.body).into_owned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_network_error_shape() {
    let response = FetchResponse::network_error();
    assert_eq!(response.status, 408);
    assert_eq!(response.header("content-type"), Some("text/plain"));
    assert_eq!(response.body, b"Network error");
  }

  #[test]
  fn test_storage_hash_distinguishes_method() {
    let url: Url = "https://backend.example/menu/items".parse().unwrap();
    let get = RequestKey {
      method: Method::GET,
      url: url.clone(),
    };
    let post = RequestKey {
      method: Method::POST,
      url,
    };
    assert_ne!(get.storage_hash(), post.storage_hash());
  }
}
