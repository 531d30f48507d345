// server/src/web/handlers/webhook_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use storefront_flow::{ContextData, PipelineResult};
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::pipelines::contexts::{ShipmentUpdate, ShipmentWebhookCtxData};
use crate::state::AppState;

#[instrument(
  name = "handler::shipment_webhook",
  skip(app_state, payload),
  fields(order_id = %payload.order_id, current_status = %payload.current_status)
)]
pub async fn shipment_webhook_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<ShipmentUpdate>,
) -> Result<HttpResponse, AppError> {
  let ctx = ContextData::new(ShipmentWebhookCtxData::new(app_state.get_ref().clone(), payload.into_inner()));

  match app_state.flows.run(ctx).await? {
    PipelineResult::Completed => {
      info!("Shipment update processed.");
      Ok(HttpResponse::Ok().json(json!({ "success": true })))
    }
    PipelineResult::Stopped => {
      warn!("Shipment update ignored.");
      Ok(HttpResponse::Ok().json(json!({ "success": false })))
    }
  }
}
