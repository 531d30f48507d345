// server/src/services/uploads.rs

use futures_util::future::try_join_all;
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::UploadRepository;
use crate::errors::{AppError, Result as AppResult};
use crate::models::Upload;
use crate::services::assets::{AssetStore, UploadFile};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPage {
  pub uploads: Vec<Upload>,
  pub next_cursor: Option<Uuid>,
}

pub fn page_size(raw: Option<i64>) -> i64 {
  raw.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

#[instrument(name = "uploads::store_one", skip_all, fields(size = file.bytes.len()))]
pub async fn store_one(store: &dyn AssetStore, repo: &dyn UploadRepository, file: UploadFile) -> AppResult<String> {
  let asset = store.upload(file).await?;
  let upload = repo.record(asset.secure_url).await?;
  info!(upload_id = %upload.id, "Upload recorded.");
  Ok(upload.url)
}

/// Sends every file to the asset store concurrently, then records the URLs in
/// request order within one transaction. Nothing is recorded if any upload
/// or insert fails.
#[instrument(name = "uploads::store_many", skip_all, fields(count = files.len()))]
pub async fn store_many(
  store: &dyn AssetStore,
  repo: &dyn UploadRepository,
  files: Vec<UploadFile>,
) -> AppResult<Vec<String>> {
  let assets = try_join_all(files.into_iter().map(|file| store.upload(file))).await?;

  let recorded = repo
    .record_many(assets.into_iter().map(|asset| asset.secure_url).collect())
    .await?;
  let urls: Vec<String> = recorded.into_iter().map(|upload| upload.url).collect();
  info!(count = urls.len(), "Uploads recorded.");
  Ok(urls)
}

#[instrument(name = "uploads::list", skip(repo))]
pub async fn list_uploads(repo: &dyn UploadRepository, cursor: Option<Uuid>, limit: i64) -> AppResult<UploadPage> {
  let after = match cursor {
    Some(id) => {
      let created_at = repo
        .created_at_of(id)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Unknown cursor {}", id)))?;
      Some((created_at, id))
    }
    None => None,
  };

  let uploads = repo.page(after, limit).await?;
  let next_cursor = if uploads.len() as i64 == limit {
    uploads.last().map(|u| u.id)
  } else {
    None
  };
  Ok(UploadPage { uploads, next_cursor })
}
