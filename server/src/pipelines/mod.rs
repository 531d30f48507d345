// server/src/pipelines/mod.rs

//! Pipelines run through the application's `Flows` registry.

use crate::errors::AppError;
use storefront_flow::{FlowResult, Flows};

pub mod contexts;
pub mod shipment_pipeline;

/// Registers every pipeline. Called once at startup.
pub fn register_all_pipelines(flows: &Flows<AppError>) -> FlowResult<()> {
  tracing::info!("Registering pipelines...");
  shipment_pipeline::register_shipment_pipeline(flows)?;
  tracing::info!("All application pipelines registered.");
  Ok(())
}
