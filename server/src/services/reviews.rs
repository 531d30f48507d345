// server/src/services/reviews.rs

use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::db::ReviewRepository;
use crate::errors::{AppError, Result as AppResult};
use crate::models::{NewProductRating, ProductRating};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// Raw review body. `rating` stays untyped so a wrong type can be reported
/// as a rating problem rather than a malformed body.
#[derive(Debug, Default, Deserialize)]
pub struct CreateReviewPayload {
  #[serde(default)]
  pub title: Option<String>,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub rating: Option<JsonValue>,
}

fn is_blank(value: &Option<String>) -> bool {
  value.as_deref().map_or(true, str::is_empty)
}

fn is_absent(value: &Option<JsonValue>) -> bool {
  match value {
    None | Some(JsonValue::Null) | Some(JsonValue::Bool(false)) => true,
    Some(JsonValue::Number(n)) => n.as_f64() == Some(0.0),
    Some(JsonValue::String(s)) => s.is_empty(),
    Some(_) => false,
  }
}

fn whole_rating(value: &JsonValue) -> Option<i64> {
  let JsonValue::Number(n) = value else {
    return None;
  };
  n.as_i64()
    .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
    .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
}

pub fn validate_review(product_id: Uuid, user_id: Uuid, payload: CreateReviewPayload) -> AppResult<NewProductRating> {
  if is_blank(&payload.title) || is_blank(&payload.description) || is_absent(&payload.rating) {
    return Err(AppError::Validation("Missing required fields".to_string()));
  }

  let rating = payload
    .rating
    .as_ref()
    .and_then(whole_rating)
    .ok_or_else(|| AppError::Validation("Rating must be a number between 1 and 5".to_string()))?;

  Ok(NewProductRating {
    product_id,
    user_id,
    title: payload.title.unwrap_or_default(),
    description: payload.description.unwrap_or_default(),
    rating: rating as i32,
  })
}

#[instrument(name = "reviews::create", skip(repo, payload))]
pub async fn create_review(
  repo: &dyn ReviewRepository,
  product_id: Uuid,
  user_id: Uuid,
  payload: CreateReviewPayload,
) -> AppResult<ProductRating> {
  let new_rating = validate_review(product_id, user_id, payload)?;

  if !repo.product_exists(product_id).await? {
    warn!("Review submitted for unknown product.");
    return Err(AppError::NotFound("Product not found".to_string()));
  }

  let created = repo.create_rating(new_rating).await?;
  info!(rating_id = %created.id, rating = created.rating, "Review stored and average rating refreshed.");
  Ok(created)
}

#[instrument(name = "reviews::list", skip(repo))]
pub async fn list_reviews(repo: &dyn ReviewRepository, product_id: Uuid) -> AppResult<Vec<ProductRating>> {
  repo.list_for_product(product_id).await
}
