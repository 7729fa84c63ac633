//! Image upload to the third-party media host.
//!
//! The backend only ever stores the durable URL the host returns; image bytes
//! never touch the menu data model.

use color_eyre::{eyre::eyre, Result};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use url::Url;

/// Reply from the media host; everything but the durable URL is ignored.
#[derive(Debug, Deserialize)]
struct UploadReply {
  secure_url: String,
}

/// Unsigned-upload client for the media host.
pub struct Uploader {
  client: reqwest::Client,
  endpoint: Url,
  preset: String,
}

impl Uploader {
  pub fn new(endpoint: Url, preset: impl Into<String>) -> Self {
    Self {
      client: reqwest::Client::new(),
      endpoint,
      preset: preset.into(),
    }
  }

  /// Upload an image file and return its durable URL.
  ///
  /// `progress` is called with (bytes sent, total bytes) before and after the
  /// transfer.
  pub async fn upload<F>(&self, path: &Path, progress: F) -> Result<String>
  where
    F: Fn(u64, u64),
  {
    let bytes = tokio::fs::read(path)
      .await
      .map_err(|e| eyre!("Failed to read image {}: {}", path.display(), e))?;
    let total = bytes.len() as u64;

    let file_name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| "image".to_string());

    progress(0, total);

    let form = Form::new()
      .text("upload_preset", self.preset.clone())
      .part("file", Part::bytes(bytes).file_name(file_name));

    let response = self
      .client
      .post(self.endpoint.clone())
      .multipart(form)
      .send()
      .await
      .map_err(|e| eyre!("Image upload failed: {}", e))?;

    if !response.status().is_success() {
      let status = response.status();
      let body = response.text().await.unwrap_or_default();
      return Err(eyre!("Image upload rejected with status {}: {}", status, body));
    }

    let reply: UploadReply = response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse upload reply: {}", e))?;

    progress(total, total);

    Ok(reply.secure_url)
  }
}
