// server/src/services/assets.rs

//! Cloud asset storage (Cloudinary signed uploads).

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use tracing::{error, info, instrument};

use crate::config::CloudinaryConfig;
use crate::errors::{AppError, Result as AppResult};

/// A file buffered from a multipart request.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
  pub filename: Option<String>,
  pub content_type: Option<String>,
  pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoredAsset {
  pub secure_url: String,
  pub public_id: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetStore: Send + Sync {
  async fn upload(&self, file: UploadFile) -> AppResult<StoredAsset>;
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorBody {
  error: CloudinaryErrorDetail,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorDetail {
  message: String,
}

/// Signature over the sorted upload parameters followed by the API secret.
pub fn sign_params(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
  let to_sign = params
    .iter()
    .map(|(k, v)| format!("{}={}", k, v))
    .collect::<Vec<_>>()
    .join("&");
  let mut hasher = Sha1::new();
  hasher.update(to_sign.as_bytes());
  hasher.update(api_secret.as_bytes());
  hex::encode(hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct CloudinaryClient {
  config: CloudinaryConfig,
  http: Client,
}

impl CloudinaryClient {
  pub fn new(config: CloudinaryConfig) -> AppResult<Self> {
    let http = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { config, http })
  }

  fn upload_url(&self) -> String {
    format!("https://api.cloudinary.com/v1_1/{}/auto/upload", self.config.cloud_name)
  }

  /// Parameters covered by the signature. Files keep their own name and are
  /// never overwritten.
  fn signed_params(&self, timestamp: i64) -> BTreeMap<&'static str, String> {
    BTreeMap::from([
      ("folder", self.config.folder.clone()),
      ("overwrite", "false".to_string()),
      ("timestamp", timestamp.to_string()),
      ("unique_filename", "false".to_string()),
      ("use_filename", "true".to_string()),
    ])
  }
}

#[async_trait]
impl AssetStore for CloudinaryClient {
  #[instrument(
    name = "assets::upload",
    skip(self, file),
    fields(filename = ?file.filename, size = file.bytes.len()),
    err
  )]
  async fn upload(&self, file: UploadFile) -> AppResult<StoredAsset> {
    let params = self.signed_params(chrono::Utc::now().timestamp());
    let signature = sign_params(&params, &self.config.api_secret);

    let mut part = Part::bytes(file.bytes).file_name(file.filename.unwrap_or_else(|| "upload".to_string()));
    if let Some(content_type) = file.content_type.as_deref() {
      part = part
        .mime_str(content_type)
        .map_err(|e| AppError::Validation(format!("Invalid content type: {}", e)))?;
    }

    let mut form = Form::new()
      .part("file", part)
      .text("api_key", self.config.api_key.clone())
      .text("signature", signature);
    for (key, value) in params {
      form = form.text(key, value);
    }

    let response = self
      .http
      .post(self.upload_url())
      .multipart(form)
      .send()
      .await
      .map_err(|e| AppError::AssetStore(format!("Request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
      let message = response
        .json::<CloudinaryErrorBody>()
        .await
        .map(|body| body.error.message)
        .unwrap_or_else(|_| "no error detail".to_string());
      error!(%status, %message, "Cloudinary rejected the upload.");
      return Err(AppError::AssetStore(format!("{}: {}", status, message)));
    }

    let asset: StoredAsset = response
      .json()
      .await
      .map_err(|e| AppError::AssetStore(format!("Unexpected response: {}", e)))?;
    info!(public_id = %asset.public_id, "Asset uploaded.");
    Ok(asset)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  fn client() -> testresult::TestResult<CloudinaryClient> {
    Ok(CloudinaryClient::new(CloudinaryConfig {
      cloud_name: "demo".to_string(),
      api_key: "key".to_string(),
      api_secret: "shhh-secret".to_string(),
      folder: "uploads".to_string(),
      timeout: Duration::from_secs(5),
    })?)
  }

  #[test]
  fn signature_covers_sorted_params_and_secret() -> testresult::TestResult {
    let client = client()?;
    let params = client.signed_params(1_700_000_000);
    assert_eq!(
      sign_params(&params, "shhh-secret"),
      "c2e312d051ff02c40e68e7f60fbc80802e9e8abe"
    );
    Ok(())
  }

  #[test]
  fn signature_changes_with_secret() {
    let params = BTreeMap::from([("timestamp", "1".to_string())]);
    assert_ne!(sign_params(&params, "a"), sign_params(&params, "b"));
  }

  #[test]
  fn upload_url_targets_auto_resource_type() -> testresult::TestResult {
    assert_eq!(client()?.upload_url(), "https://api.cloudinary.com/v1_1/demo/auto/upload");
    Ok(())
  }
}
