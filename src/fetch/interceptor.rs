//! Network-first fetch handling with cache fallback and a versioned lifecycle.

use std::future::Future;
use std::sync::{Arc, Mutex};

use color_eyre::Result;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::store::CacheStore;
use super::types::{FetchRequest, FetchResponse};

/// Lifecycle of an interceptor instance, mirroring install/activate/fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
  /// Freshly constructed, not yet installed.
  Installing,
  /// Installed and ready to take over; no wait for older instances.
  Waiting,
  /// Handling requests against the current cache generation.
  Active,
}

/// Intercepts requests at the transport boundary and applies a
/// network-first/cache-fallback policy against a single named generation.
///
/// One instance is created per process and passed explicitly to anything that
/// issues requests. Requests in flight are independent of each other; the
/// only shared state is the overwrite-only cache store (last writer wins for
/// a given key).
pub struct FetchInterceptor<S: CacheStore> {
  store: Arc<S>,
  generation: String,
  state: Mutex<Lifecycle>,
  /// In-flight cache writes. The response path never waits on these, but a
  /// short-lived process must [`drain`](Self::drain) them before exiting or
  /// runtime shutdown cancels whatever has not landed yet.
  writes: Mutex<Vec<JoinHandle<()>>>,
}

impl<S: CacheStore + 'static> FetchInterceptor<S> {
  /// Create an interceptor for the given cache generation.
  pub fn new(store: S, generation: impl Into<String>) -> Self {
    Self {
      store: Arc::new(store),
      generation: generation.into(),
      state: Mutex::new(Lifecycle::Installing),
      writes: Mutex::new(Vec::new()),
    }
  }

  /// Name of the generation this instance reads and writes.
  pub fn generation(&self) -> &str {
    &self.generation
  }

  pub fn state(&self) -> Lifecycle {
    *self.state.lock().unwrap_or_else(|e| e.into_inner())
  }

  fn set_state(&self, next: Lifecycle) {
    *self.state.lock().unwrap_or_else(|e| e.into_inner()) = next;
  }

  /// Install step: skip any waiting period and stand by for activation.
  pub fn install(&self) {
    debug!("fetch interceptor installing (generation {})", self.generation);
    self.set_state(Lifecycle::Waiting);
  }

  /// Activate step: prune every generation other than the current one, then
  /// start handling requests. Cleanup is best-effort and never blocks
  /// activation; failures are logged and the stale generation is retried on
  /// the next activation.
  pub fn activate(&self) {
    match self.store.list_generations() {
      Ok(generations) => {
        for old in generations.iter().filter(|g| **g != self.generation) {
          info!("deleting old cache generation {}", old);
          if let Err(e) = self.store.delete_generation(old) {
            warn!("Failed to delete cache generation {}: {}", old, e);
          }
        }
      }
      Err(e) => warn!("Failed to enumerate cache generations: {}", e),
    }

    self.set_state(Lifecycle::Active);
  }

  /// Handle one request: try the network, fall back to the cache, and as a
  /// last resort synthesize the offline response. Never fails; the worst
  /// case is the synthetic 408.
  ///
  /// Successful GET responses are copied into the cache without blocking the
  /// caller; write failures are swallowed.
  pub async fn handle<F, Fut>(&self, request: FetchRequest, send: F) -> FetchResponse
  where
    F: FnOnce(FetchRequest) -> Fut,
    Fut: Future<Output = Result<FetchResponse>>,
  {
    let key = request.key();
    let is_get = request.is_get();

    match send(request).await {
      Ok(response) => {
        if is_get {
          let copy = response.clone();
          let store = Arc::clone(&self.store);
          let generation = self.generation.clone();
          let handle = tokio::spawn(async move {
            if let Err(e) = store.put(&generation, &key, &copy) {
              warn!("Failed to cache response for {}: {}", key.url, e);
            }
          });

          let mut writes = self.writes.lock().unwrap_or_else(|e| e.into_inner());
          writes.retain(|h| !h.is_finished());
          writes.push(handle);
        }
        response
      }
      Err(e) => {
        debug!("network request for {} failed, trying cache: {}", key.url, e);
        match self.store.get(&self.generation, &key) {
          Ok(Some(cached)) => cached,
          Ok(None) => FetchResponse::network_error(),
          Err(e) => {
            warn!("Cache lookup for {} failed: {}", key.url, e);
            FetchResponse::network_error()
          }
        }
      }
    }
  }

  /// Wait for every in-flight cache write to land.
  ///
  /// Callers that exit right after their last request (the one-shot CLI
  /// flow) await this once before returning from `main`; long-lived callers
  /// never need to.
  pub async fn drain(&self) {
    let pending: Vec<JoinHandle<()>> = {
      let mut writes = self.writes.lock().unwrap_or_else(|e| e.into_inner());
      writes.drain(..).collect()
    };

    for handle in pending {
      // Write failures were already logged inside the task.
      let _ = handle.await;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::fetch::store::MemoryStore;
  use color_eyre::eyre::eyre;
  use reqwest::Method;

  fn request(method: Method, url: &str) -> FetchRequest {
    FetchRequest::new(method, url.parse().unwrap())
  }

  fn ok_response(body: &str) -> FetchResponse {
    FetchResponse {
      status: 200,
      headers: vec![("Content-Type".to_string(), "application/json".to_string())],
      body: body.as_bytes().to_vec(),
    }
  }

  #[tokio::test]
  async fn test_lifecycle_transitions() {
    let interceptor = FetchInterceptor::new(MemoryStore::new(), "dhaba-v2");
    assert_eq!(interceptor.state(), Lifecycle::Installing);

    interceptor.install();
    assert_eq!(interceptor.state(), Lifecycle::Waiting);

    interceptor.activate();
    assert_eq!(interceptor.state(), Lifecycle::Active);
  }

  #[tokio::test]
  async fn test_activation_leaves_one_generation() {
    let store = MemoryStore::new();
    let key = request(Method::GET, "https://backend.example/menu/items").key();
    store.put("dhaba-v1", &key, &ok_response("old")).unwrap();
    store.put("dhaba-v2", &key, &ok_response("new")).unwrap();

    let interceptor = FetchInterceptor::new(store, "dhaba-v2");
    interceptor.install();
    interceptor.activate();

    assert_eq!(
      interceptor.store.list_generations().unwrap(),
      vec!["dhaba-v2".to_string()]
    );
  }

  #[tokio::test]
  async fn test_cached_get_served_on_network_failure() {
    let interceptor = FetchInterceptor::new(MemoryStore::new(), "dhaba-v2");
    interceptor.install();
    interceptor.activate();

    let served = interceptor
      .handle(
        request(Method::GET, "https://backend.example/menu/items"),
        |_| async { Ok(ok_response(r#"[{"id":"7"}]"#)) },
      )
      .await;
    assert_eq!(served.body, br#"[{"id":"7"}]"#);

    interceptor.drain().await;

    let fallback = interceptor
      .handle(
        request(Method::GET, "https://backend.example/menu/items"),
        |_| async { Err(eyre!("connection refused")) },
      )
      .await;
    assert_eq!(fallback, served);
  }

  #[tokio::test]
  async fn test_uncached_failure_yields_synthetic_408() {
    let interceptor = FetchInterceptor::new(MemoryStore::new(), "dhaba-v2");
    interceptor.install();
    interceptor.activate();

    let response = interceptor
      .handle(
        request(Method::GET, "https://backend.example/categories"),
        |_| async { Err(eyre!("offline")) },
      )
      .await;

    assert_eq!(response.status, 408);
    assert_eq!(response.header("Content-Type"), Some("text/plain"));
    assert_eq!(response.body, b"Network error");
  }

  #[tokio::test]
  async fn test_non_get_never_cached() {
    let interceptor = FetchInterceptor::new(MemoryStore::new(), "dhaba-v2");
    interceptor.install();
    interceptor.activate();

    let posted = interceptor
      .handle(
        request(Method::POST, "https://backend.example/menu/items"),
        |_| async { Ok(ok_response(r#"{"id":"9"}"#)) },
      )
      .await;
    assert!(posted.is_success());

    interceptor.drain().await;

    // Same identity, forced failure: nothing cached, so the synthetic 408.
    let fallback = interceptor
      .handle(
        request(Method::POST, "https://backend.example/menu/items"),
        |_| async { Err(eyre!("offline")) },
      )
      .await;
    assert_eq!(fallback.status, 408);
  }

  #[tokio::test]
  async fn test_drain_lands_write_before_caller_exits() {
    let interceptor = FetchInterceptor::new(MemoryStore::new(), "dhaba-v2");
    interceptor.install();
    interceptor.activate();

    let req = request(Method::GET, "https://backend.example/menu/items");
    let key = req.key();
    interceptor
      .handle(req, |_| async { Ok(ok_response("menu")) })
      .await;

    // No sleep: once drain returns, the write must be durable, so a process
    // exiting right after cannot lose it.
    interceptor.drain().await;

    let cached = interceptor.store.get("dhaba-v2", &key).unwrap();
    assert_eq!(cached.unwrap().body, b"menu");
  }

  #[tokio::test]
  async fn test_concurrent_gets_last_writer_wins() {
    let interceptor = Arc::new(FetchInterceptor::new(MemoryStore::new(), "dhaba-v2"));
    interceptor.install();
    interceptor.activate();

    for body in ["first", "second"] {
      interceptor
        .handle(
          request(Method::GET, "https://backend.example/menu/items"),
          move |_| async move { Ok(ok_response(body)) },
        )
        .await;
    }

    interceptor.drain().await;

    let fallback = interceptor
      .handle(
        request(Method::GET, "https://backend.example/menu/items"),
        |_| async { Err(eyre!("offline")) },
      )
      .await;
    assert_eq!(fallback.body, b"second");
  }
}
