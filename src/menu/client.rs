//! Typed client for the hosted menu backend.
//!
//! Every call, read or write, is routed through the fetch interceptor: reads
//! are GETs and so pick up offline fallback for free; mutations pass through
//! untouched and are never cached. Failed mutations are surfaced once, not
//! retried.

use color_eyre::{eyre::eyre, Result};
use reqwest::Method;
use std::sync::Arc;
use url::Url;

use crate::fetch::{http, CacheStore, FetchInterceptor, FetchRequest, FetchResponse};

use super::types::{Category, MenuItem, MenuItemPatch, NewMenuItem};

/// Menu backend client with offline-capable reads.
pub struct MenuClient<S: CacheStore + 'static> {
  http: reqwest::Client,
  interceptor: Arc<FetchInterceptor<S>>,
  base: Url,
}

impl<S: CacheStore + 'static> MenuClient<S> {
  /// Create a client against `base`, routing through `interceptor`.
  pub fn new(interceptor: Arc<FetchInterceptor<S>>, base: Url) -> Result<Self> {
    // A trailing slash makes Url::join treat the last path segment as a
    // directory rather than replacing it.
    let base = if base.path().ends_with('/') {
      base
    } else {
      format!("{}/", base)
        .parse()
        .map_err(|e| eyre!("Invalid backend URL: {}", e))?
    };

    Ok(Self {
      http: reqwest::Client::new(),
      interceptor,
      base,
    })
  }

  fn endpoint(&self, path: &str) -> Result<Url> {
    self
      .base
      .join(path)
      .map_err(|e| eyre!("Invalid backend endpoint {}: {}", path, e))
  }

  /// Route a request through the interceptor and fail on non-2xx replies,
  /// including the synthetic offline 408.
  async fn dispatch(&self, request: FetchRequest) -> Result<FetchResponse> {
    let client = self.http.clone();
    let response = self
      .interceptor
      .handle(request, move |req| async move { http::send(&client, req).await })
      .await;

    if response.is_success() {
      Ok(response)
    } else {
      Err(eyre!(
        "Backend request failed with status {}: {}",
        response.status,
        response.text_lossy()
      ))
    }
  }

  async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
    let response = self.dispatch(FetchRequest::get(url)).await?;
    response
      .json()
      .map_err(|e| eyre!("Failed to parse backend response: {}", e))
  }

  async fn send_json<B: serde::Serialize>(
    &self,
    method: Method,
    url: Url,
    body: &B,
  ) -> Result<FetchResponse> {
    let request = FetchRequest::new(method, url)
      .with_json(body)
      .map_err(|e| eyre!("Failed to encode request body: {}", e))?;
    self.dispatch(request).await
  }

  /// All categories, including inactive ones (admin view).
  pub async fn categories(&self) -> Result<Vec<Category>> {
    self.get_json(self.endpoint("categories")?).await
  }

  /// Names of active categories, in backend order (customer view).
  pub async fn category_names(&self) -> Result<Vec<String>> {
    let categories = self.categories().await?;
    Ok(
      categories
        .into_iter()
        .filter(|c| c.active)
        .map(|c| c.name)
        .collect(),
    )
  }

  /// Every menu item regardless of availability (admin view).
  pub async fn menu_items(&self) -> Result<Vec<MenuItem>> {
    self.get_json(self.endpoint("menu/items")?).await
  }

  /// Only items customers can order right now.
  pub async fn available_items(&self) -> Result<Vec<MenuItem>> {
    let mut url = self.endpoint("menu/items")?;
    url.query_pairs_mut().append_pair("available", "true");
    self.get_json(url).await
  }

  pub async fn create_item(&self, item: &NewMenuItem) -> Result<MenuItem> {
    let response = self
      .send_json(Method::POST, self.endpoint("menu/items")?, item)
      .await?;
    response
      .json()
      .map_err(|e| eyre!("Failed to parse created item: {}", e))
  }

  pub async fn update_item(&self, id: &str, patch: &MenuItemPatch) -> Result<MenuItem> {
    let response = self
      .send_json(
        Method::PATCH,
        self.endpoint(&format!("menu/items/{}", id))?,
        patch,
      )
      .await?;
    response
      .json()
      .map_err(|e| eyre!("Failed to parse updated item: {}", e))
  }

  pub async fn delete_item(&self, id: &str) -> Result<()> {
    let url = self.endpoint(&format!("menu/items/{}", id))?;
    self.dispatch(FetchRequest::new(Method::DELETE, url)).await?;
    Ok(())
  }

  pub async fn set_item_available(&self, id: &str, available: bool) -> Result<MenuItem> {
    self
      .update_item(
        id,
        &MenuItemPatch {
          available: Some(available),
          ..Default::default()
        },
      )
      .await
  }

  pub async fn create_category(&self, name: &str) -> Result<Category> {
    let body = serde_json::json!({ "name": name, "isActive": true });
    let response = self
      .send_json(Method::POST, self.endpoint("categories")?, &body)
      .await?;
    response
      .json()
      .map_err(|e| eyre!("Failed to parse created category: {}", e))
  }

  /// Delete a category. Refused while menu items still reference it; the
  /// items must be moved or removed first.
  pub async fn delete_category(&self, id: &str) -> Result<()> {
    let categories = self.categories().await?;
    let category = categories
      .iter()
      .find(|c| c.id == id)
      .ok_or_else(|| eyre!("No category with id {}", id))?;

    let items = self.menu_items().await?;
    let in_use = items.iter().filter(|i| i.category == category.name).count();
    if in_use > 0 {
      return Err(eyre!(
        "Cannot delete category \"{}\": it still has {} item(s)",
        category.name,
        in_use
      ));
    }

    let url = self.endpoint(&format!("categories/{}", id))?;
    self.dispatch(FetchRequest::new(Method::DELETE, url)).await?;
    Ok(())
  }

  pub async fn set_category_active(&self, id: &str, active: bool) -> Result<Category> {
    let body = serde_json::json!({ "isActive": active });
    let response = self
      .send_json(
        Method::PATCH,
        self.endpoint(&format!("categories/{}", id))?,
        &body,
      )
      .await?;
    response
      .json()
      .map_err(|e| eyre!("Failed to parse updated category: {}", e))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::fetch::MemoryStore;

  fn client(base: &str) -> MenuClient<MemoryStore> {
    let interceptor = Arc::new(FetchInterceptor::new(MemoryStore::new(), "dhaba-test"));
    MenuClient::new(interceptor, base.parse().unwrap()).unwrap()
  }

  #[test]
  fn test_endpoint_joins_below_base_path() {
    let client = client("https://backend.example/api/v1");
    let url = client.endpoint("menu/items").unwrap();
    assert_eq!(url.as_str(), "https://backend.example/api/v1/menu/items");
  }

  #[test]
  fn test_endpoint_with_trailing_slash_base() {
    let client = client("https://backend.example/api/v1/");
    let url = client.endpoint("categories").unwrap();
    assert_eq!(url.as_str(), "https://backend.example/api/v1/categories");
  }
}
