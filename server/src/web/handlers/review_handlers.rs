// server/src/web/handlers/review_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::reviews::{self, CreateReviewPayload};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(
  name = "handler::create_review",
  skip(app_state, product_id, payload, auth_user),
  fields(user_id = %auth_user.user_id, product_id = %product_id)
)]
pub async fn create_review_handler(
  app_state: web::Data<AppState>,
  product_id: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
  payload: web::Json<CreateReviewPayload>,
) -> Result<HttpResponse, AppError> {
  let rating = reviews::create_review(
    app_state.reviews.as_ref(),
    product_id.into_inner(),
    auth_user.user_id,
    payload.into_inner(),
  )
  .await?;

  info!(rating_id = %rating.id, "Review created.");
  Ok(HttpResponse::Created().json(json!({
    "message": "Review created successfully",
    "productrating": rating
  })))
}

#[instrument(name = "handler::list_reviews", skip(app_state, product_id), fields(product_id = %product_id))]
pub async fn list_reviews_handler(
  app_state: web::Data<AppState>,
  product_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let reviews = reviews::list_reviews(app_state.reviews.as_ref(), product_id.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "reviews": reviews })))
}
