//! reqwest transport for the fetch layer.

use color_eyre::{eyre::eyre, Result};

use super::types::{FetchRequest, FetchResponse};

/// Send a request over the wire and normalize the reply.
///
/// Transport errors (DNS, refused connection, offline) become `Err` so the
/// interceptor can fall back to its cache; an HTTP error status is still a
/// resolved response and passes through as-is.
pub async fn send(client: &reqwest::Client, request: FetchRequest) -> Result<FetchResponse> {
  let mut builder = client.request(request.method.clone(), request.url.clone());

  for (name, value) in &request.headers {
    builder = builder.header(name, value);
  }
  if let Some(body) = request.body {
    builder = builder.body(body);
  }

  let response = builder
    .send()
    .await
    .map_err(|e| eyre!("Request to {} failed: {}", request.url, e))?;

  let status = response.status().as_u16();
  let headers = response
    .headers()
    .iter()
    .map(|(name, value)| {
      (
        name.to_string(),
        String::from_utf8_lossy(value.as_bytes()).into_owned(),
      )
    })
    .collect();

  let body = response
    .bytes()
    .await
    .map_err(|e| eyre!("Failed to read response from {}: {}", request.url, e))?
    .to_vec();

  Ok(FetchResponse {
    status,
    headers,
    body,
  })
}
