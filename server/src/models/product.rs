// server/src/models/product.rs

use serde::Serialize;
use sqlx::Type as SqlxType;

/// Only `Published` products are listed to shoppers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SqlxType)]
#[sqlx(type_name = "product_status_enum", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
  Draft,
  Published,
  Archived,
}
