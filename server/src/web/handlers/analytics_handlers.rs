// server/src/web/handlers/analytics_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::errors::AppError;
use crate::services::analytics::{
  self, parse_limit, DEFAULT_BESTSELLERS_LIMIT, DEFAULT_NEW_ARRIVALS_LIMIT, DEFAULT_TOP_PRODUCTS_LIMIT,
};
use crate::state::AppState;

/// `limit` is kept raw so a malformed value falls back to the default
/// instead of rejecting the request.
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
  pub limit: Option<String>,
}

#[instrument(name = "handler::top_products", skip(app_state))]
pub async fn top_products_handler(
  app_state: web::Data<AppState>,
  query: web::Query<LimitQuery>,
) -> Result<HttpResponse, AppError> {
  let limit = parse_limit(query.limit.as_deref(), DEFAULT_TOP_PRODUCTS_LIMIT);
  let products = analytics::top_products(app_state.analytics.as_ref(), limit).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "products": products })))
}

#[instrument(name = "handler::bestsellers", skip(app_state))]
pub async fn bestsellers_handler(
  app_state: web::Data<AppState>,
  query: web::Query<LimitQuery>,
) -> Result<HttpResponse, AppError> {
  let limit = parse_limit(query.limit.as_deref(), DEFAULT_BESTSELLERS_LIMIT);
  let products = analytics::best_sellers(app_state.analytics.as_ref(), limit).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "products": products })))
}

#[instrument(name = "handler::new_arrivals", skip(app_state))]
pub async fn new_arrivals_handler(
  app_state: web::Data<AppState>,
  query: web::Query<LimitQuery>,
) -> Result<HttpResponse, AppError> {
  let limit = parse_limit(query.limit.as_deref(), DEFAULT_NEW_ARRIVALS_LIMIT);
  let products = analytics::new_arrivals(app_state.analytics.as_ref(), limit).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "products": products })))
}
