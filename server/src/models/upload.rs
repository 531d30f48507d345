// server/src/models/upload.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Upload {
  pub id: Uuid,
  pub url: String,
  pub created_at: DateTime<Utc>,
}
