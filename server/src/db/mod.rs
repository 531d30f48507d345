// server/src/db/mod.rs

//! Repository traits and their Postgres implementations.
//!
//! Handlers only see the traits, so tests can swap in mocks.

pub mod analytics;
pub mod orders;
pub mod reviews;
pub mod uploads;

pub use analytics::{AnalyticsRepository, PgAnalyticsRepository};
pub use orders::{OrderRepository, PgOrderRepository};
pub use reviews::{PgReviewRepository, ReviewRepository};
pub use uploads::{PgUploadRepository, UploadRepository};

#[cfg(test)]
pub use analytics::MockAnalyticsRepository;
#[cfg(test)]
pub use orders::MockOrderRepository;
#[cfg(test)]
pub use reviews::MockReviewRepository;
#[cfg(test)]
pub use uploads::MockUploadRepository;

use crate::config::AppConfig;
use crate::errors::Result as AppResult;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub async fn connect(config: &AppConfig) -> AppResult<PgPool> {
  let pool = PgPoolOptions::new()
    .max_connections(config.database_max_connections)
    .acquire_timeout(Duration::from_secs(5))
    .connect(&config.database_url)
    .await?;
  Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
  sqlx::migrate!("./migrations")
    .run(pool)
    .await
    .map_err(|e| crate::errors::AppError::Internal(format!("Migration failed: {}", e)))
}
