// server/src/db/uploads.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::Result as AppResult;
use crate::models::Upload;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UploadRepository: Send + Sync {
  async fn record(&self, url: String) -> AppResult<Upload>;

  /// Records every URL in one transaction, in the given order.
  async fn record_many(&self, urls: Vec<String>) -> AppResult<Vec<Upload>>;

  /// Creation time of the upload `id`, used as a pagination anchor.
  async fn created_at_of(&self, id: Uuid) -> AppResult<Option<DateTime<Utc>>>;

  /// Up to `limit` uploads strictly older than `after` (`created_at`, `id`),
  /// newest first.
  async fn page(&self, after: Option<(DateTime<Utc>, Uuid)>, limit: i64) -> AppResult<Vec<Upload>>;
}

const INSERT_UPLOAD_SQL: &str = "INSERT INTO uploads (id, url) VALUES ($1, $2) RETURNING id, url, created_at";

#[derive(Debug, Clone)]
pub struct PgUploadRepository {
  pool: PgPool,
}

impl PgUploadRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl UploadRepository for PgUploadRepository {
  #[instrument(name = "db::record_upload", skip(self), err)]
  async fn record(&self, url: String) -> AppResult<Upload> {
    let upload = sqlx::query_as::<_, Upload>(INSERT_UPLOAD_SQL)
      .bind(Uuid::new_v4())
      .bind(url)
      .fetch_one(&self.pool)
      .await?;
    Ok(upload)
  }

  #[instrument(name = "db::record_uploads", skip(self, urls), fields(count = urls.len()), err)]
  async fn record_many(&self, urls: Vec<String>) -> AppResult<Vec<Upload>> {
    let mut tx = self.pool.begin().await?;

    let mut uploads = Vec::with_capacity(urls.len());
    for url in urls {
      let upload = sqlx::query_as::<_, Upload>(INSERT_UPLOAD_SQL)
        .bind(Uuid::new_v4())
        .bind(url)
        .fetch_one(&mut *tx)
        .await?;
      uploads.push(upload);
    }

    tx.commit().await?;
    Ok(uploads)
  }

  #[instrument(name = "db::upload_created_at", skip(self), err)]
  async fn created_at_of(&self, id: Uuid) -> AppResult<Option<DateTime<Utc>>> {
    let created_at = sqlx::query_scalar::<_, DateTime<Utc>>("SELECT created_at FROM uploads WHERE id = $1")
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(created_at)
  }

  #[instrument(name = "db::upload_page", skip(self), err)]
  async fn page(&self, after: Option<(DateTime<Utc>, Uuid)>, limit: i64) -> AppResult<Vec<Upload>> {
    let (anchor_time, anchor_id) = after.unzip();
    let rows = sqlx::query_as::<_, Upload>(
      "SELECT id, url, created_at FROM uploads \
       WHERE $1::TIMESTAMPTZ IS NULL OR (created_at, id) < ($1::TIMESTAMPTZ, $2::UUID) \
       ORDER BY created_at DESC, id DESC LIMIT $3",
    )
    .bind(anchor_time)
    .bind(anchor_id)
    .bind(limit)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows)
  }
}
