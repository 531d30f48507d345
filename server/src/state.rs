// server/src/state.rs

use crate::config::AppConfig;
use crate::db::{AnalyticsRepository, OrderRepository, ReviewRepository, UploadRepository};
use crate::errors::AppError;
use crate::services::assets::AssetStore;
use crate::services::messaging::Notifier;
use std::sync::Arc;
use storefront_flow::Flows;

/// Shared by every handler and carried into pipeline contexts.
#[derive(Clone)]
pub struct AppState {
  pub analytics: Arc<dyn AnalyticsRepository>,
  pub reviews: Arc<dyn ReviewRepository>,
  pub orders: Arc<dyn OrderRepository>,
  pub uploads: Arc<dyn UploadRepository>,
  pub asset_store: Arc<dyn AssetStore>,
  pub notifier: Arc<dyn Notifier>,
  pub flows: Arc<Flows<AppError>>,
  pub config: Arc<AppConfig>,
}
