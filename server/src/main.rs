// server/src/main.rs

use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use storefront_api::config::AppConfig;
use storefront_api::db::{self, PgAnalyticsRepository, PgOrderRepository, PgReviewRepository, PgUploadRepository};
use storefront_api::errors::AppError;
use storefront_api::pipelines::register_all_pipelines;
use storefront_api::services::assets::CloudinaryClient;
use storefront_api::services::messaging::WhatsAppClient;
use storefront_api::state::AppState;
use storefront_api::telemetry;
use storefront_api::web::configure_app_routes;
use storefront_flow::Flows;

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
  tracing::error!(error = %err, "{}", context);
  std::io::Error::other(format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  dotenvy::dotenv().ok();
  telemetry::init_tracing();

  tracing::info!("Starting storefront API server...");

  let app_config = Arc::new(AppConfig::from_env().map_err(|e| startup_error("Failed to load configuration", e))?);

  let db_pool = db::connect(&app_config)
    .await
    .map_err(|e| startup_error("Failed to connect to the database", e))?;
  tracing::info!("Successfully connected to the database.");

  if app_config.run_migrations {
    db::run_migrations(&db_pool)
      .await
      .map_err(|e| startup_error("Failed to run migrations", e))?;
    tracing::info!("Database migrations applied.");
  }

  let asset_store = CloudinaryClient::new(app_config.cloudinary.clone())
    .map_err(|e| startup_error("Failed to build the asset store client", e))?;

  let flows = Arc::new(Flows::<AppError>::new());
  register_all_pipelines(&flows).map_err(|e| startup_error("Failed to register pipelines", e))?;

  let app_state = AppState {
    analytics: Arc::new(PgAnalyticsRepository::new(db_pool.clone())),
    reviews: Arc::new(PgReviewRepository::new(db_pool.clone())),
    orders: Arc::new(PgOrderRepository::new(db_pool.clone())),
    uploads: Arc::new(PgUploadRepository::new(db_pool)),
    asset_store: Arc::new(asset_store),
    notifier: Arc::new(WhatsAppClient::new(app_config.whatsapp.clone())),
    flows,
    config: app_config.clone(),
  };

  let server_address = app_config.bind_address();
  tracing::info!("Binding server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(web::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
