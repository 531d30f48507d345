// server/src/web/routes.rs

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::errors::AppError;
use crate::web::handlers::{analytics_handlers, review_handlers, upload_handlers, webhook_handlers};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Extractor failures answer with the same `{"message": ...}` body as
/// every other client error.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()))
    .app_data(web::PathConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()));
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  extractor_configs(cfg);

  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/analytics")
          .route("/top-products", web::get().to(analytics_handlers::top_products_handler))
          .route("/bestsellers", web::get().to(analytics_handlers::bestsellers_handler))
          .route("/new-arrivals", web::get().to(analytics_handlers::new_arrivals_handler)),
      )
      .service(
        web::scope("/reviews").service(
          web::resource("/{product_id}")
            .route(web::post().to(review_handlers::create_review_handler))
            .route(web::get().to(review_handlers::list_reviews_handler)),
        ),
      )
      .service(
        web::scope("/upload")
          .service(
            web::resource("")
              .route(web::post().to(upload_handlers::upload_single_handler))
              .route(web::get().to(upload_handlers::list_uploads_handler)),
          )
          .route("/multiple", web::post().to(upload_handlers::upload_multiple_handler)),
      )
      .service(
        web::scope("/webhooks").route("/shipment", web::post().to(webhook_handlers::shipment_webhook_handler)),
      ),
  );
}
