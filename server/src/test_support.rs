// server/src/test_support.rs

//! Application state assembled from mocks for handler and pipeline tests.

use crate::config::{AppConfig, CloudinaryConfig, UploadLimits, WhatsAppConfig};
use crate::db::{MockAnalyticsRepository, MockOrderRepository, MockReviewRepository, MockUploadRepository};
use crate::errors::AppError;
use crate::pipelines::register_all_pipelines;
use crate::services::assets::MockAssetStore;
use crate::services::messaging::MockNotifier;
use crate::state::AppState;
use std::sync::Arc;
use std::time::Duration;
use storefront_flow::Flows;

pub fn test_config() -> AppConfig {
  AppConfig {
    server_host: "127.0.0.1".to_string(),
    server_port: 0,
    database_url: "postgres://unused".to_string(),
    database_max_connections: 1,
    run_migrations: false,
    cloudinary: CloudinaryConfig {
      cloud_name: "demo".to_string(),
      api_key: "key".to_string(),
      api_secret: "secret".to_string(),
      folder: "uploads".to_string(),
      timeout: Duration::from_secs(5),
    },
    upload_limits: UploadLimits {
      max_file_bytes: 1024,
      max_files: 3,
    },
    whatsapp: WhatsAppConfig {
      api_url: "https://graph.example.com/v19.0".to_string(),
      phone_number_id: "555".to_string(),
      access_token: "token".to_string(),
      template_delivered: "order_delivered".to_string(),
      template_out_for_delivery: "order_out_for_delivery".to_string(),
      template_shipped: "order_shipped".to_string(),
      template_language: "en".to_string(),
    },
    tracking_base_url: Some("https://track.example.com/".to_string()),
  }
}

/// Mocks start without expectations, so any unexpected call fails the test.
pub struct MockState {
  pub analytics: MockAnalyticsRepository,
  pub reviews: MockReviewRepository,
  pub orders: MockOrderRepository,
  pub uploads: MockUploadRepository,
  pub asset_store: MockAssetStore,
  pub notifier: MockNotifier,
  pub config: AppConfig,
}

impl MockState {
  pub fn new() -> Self {
    Self {
      analytics: MockAnalyticsRepository::new(),
      reviews: MockReviewRepository::new(),
      orders: MockOrderRepository::new(),
      uploads: MockUploadRepository::new(),
      asset_store: MockAssetStore::new(),
      notifier: MockNotifier::new(),
      config: test_config(),
    }
  }

  pub fn build(self) -> AppState {
    let flows = Arc::new(Flows::<AppError>::new());
    if let Err(e) = register_all_pipelines(&flows) {
      panic!("pipeline registration failed: {}", e);
    }
    AppState {
      analytics: Arc::new(self.analytics),
      reviews: Arc::new(self.reviews),
      orders: Arc::new(self.orders),
      uploads: Arc::new(self.uploads),
      asset_store: Arc::new(self.asset_store),
      notifier: Arc::new(self.notifier),
      flows,
      config: Arc::new(self.config),
    }
  }
}
