// server/src/models/product_rating.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductRating {
  pub id: Uuid,
  pub product_id: Uuid,
  pub user_id: Uuid,
  pub title: String,
  pub description: String,
  pub rating: i32,
  pub created_at: DateTime<Utc>,
}

/// A validated review ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProductRating {
  pub product_id: Uuid,
  pub user_id: Uuid,
  pub title: String,
  pub description: String,
  pub rating: i32,
}
