// server/src/pipelines/shipment_pipeline.rs

//! Carrier status callbacks: keeps the order's tracking fields in sync, moves
//! the order status along and tells the customer what happened.

use crate::errors::{AppError, Result as AppResult};
use crate::models::{DeliveryStatus, Order, OrderDetails, OrderStatus};
use crate::pipelines::contexts::{ShipmentUpdate, ShipmentWebhookCtxData};
use crate::services::messaging::{Notification, ShipmentNotice};
use crate::state::AppState;
use chrono::Utc;
use std::sync::Arc;
use storefront_flow::{ContextData, FlowResult, Flows, Pipeline, PipelineControl, SkipCondition};
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub const THANK_YOU_MESSAGE: &str = "Thank You";
const FALLBACK_CUSTOMER_NAME: &str = "Customer";
const FALLBACK_PRODUCT_NAME: &str = "your order";

type Ctx = ContextData<ShipmentWebhookCtxData>;

/// What a reported carrier status does to an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
  pub status: Option<OrderStatus>,
  pub stamp_delivered_at: bool,
  pub notice: Option<ShipmentNotice>,
}

/// `None` when the carrier repeats the status already stored on the order.
pub fn plan_transition(stored: Option<&str>, reported: &DeliveryStatus) -> Option<Transition> {
  if stored == Some(reported.as_str()) {
    return None;
  }

  let (status, stamp_delivered_at, notice) = match reported {
    DeliveryStatus::Delivered => (Some(OrderStatus::Completed), true, Some(ShipmentNotice::Delivered)),
    DeliveryStatus::Cancelled => (Some(OrderStatus::Cancelled), true, None),
    DeliveryStatus::OutForDelivery => (None, false, Some(ShipmentNotice::OutForDelivery)),
    DeliveryStatus::Shipped => (Some(OrderStatus::Pending), false, Some(ShipmentNotice::Shipped)),
    DeliveryStatus::Other(_) => (None, false, None),
  };
  Some(Transition {
    status,
    stamp_delivered_at,
    notice,
  })
}

/// The ETD to store, if the carrier reports one that differs from ours.
pub fn etd_to_store<'a>(stored: Option<&str>, reported: Option<&'a str>) -> Option<&'a str> {
  reported.filter(|etd| stored != Some(*etd))
}

pub fn tracking_url(base: Option<&str>, awb: Option<&str>) -> String {
  match (base, awb) {
    (Some(base), Some(awb)) => format!("{}{}", base, awb),
    _ => String::new(),
  }
}

fn loaded(ctx: &Ctx) -> AppResult<(AppState, Order, ShipmentUpdate)> {
  let guard = ctx.read();
  let order = guard
    .order
    .as_ref()
    .map(|details| details.order.clone())
    .ok_or_else(|| AppError::Internal("Shipment step ran before the order was loaded".to_string()))?;
  Ok((guard.app_state.clone(), order, guard.update.clone()))
}

#[instrument(name = "shipment::load_order", skip(ctx), err)]
async fn load_order(ctx: Ctx) -> AppResult<PipelineControl> {
  let (orders, raw_id) = {
    let guard = ctx.read();
    (guard.app_state.orders.clone(), guard.update.order_id.clone())
  };

  let Ok(order_id) = Uuid::parse_str(raw_id.trim()) else {
    warn!(order_id = %raw_id, "Shipment update names an invalid order id.");
    return Ok(PipelineControl::Stop);
  };

  match orders.find_details(order_id).await? {
    Some(details) => {
      ctx.write().order = Some(details);
      Ok(PipelineControl::Continue)
    }
    None => {
      warn!(%order_id, "Shipment update for unknown order.");
      Ok(PipelineControl::Stop)
    }
  }
}

#[instrument(name = "shipment::backfill_awb", skip(ctx), err)]
async fn backfill_awb(ctx: Ctx) -> AppResult<PipelineControl> {
  let (state, order, update) = loaded(&ctx)?;
  if let (None, Some(awb)) = (order.awb.as_deref(), update.awb) {
    state.orders.set_awb(order.id, awb.clone()).await?;
    if let Some(details) = ctx.write().order.as_mut() {
      details.order.awb = Some(awb);
    }
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "shipment::sync_etd", skip(ctx), err)]
async fn sync_etd(ctx: Ctx) -> AppResult<PipelineControl> {
  let (state, order, update) = loaded(&ctx)?;
  if let Some(etd) = etd_to_store(order.etd.as_deref(), update.etd.as_deref()) {
    state.orders.set_etd(order.id, etd.to_string()).await?;
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "shipment::apply_status_transition", skip(ctx), err)]
async fn apply_status_transition(ctx: Ctx) -> AppResult<PipelineControl> {
  let (state, order, update) = loaded(&ctx)?;
  let reported = DeliveryStatus::parse(&update.current_status);

  let Some(transition) = plan_transition(order.delivery_status.as_deref(), &reported) else {
    info!(status = %reported, "Delivery status unchanged.");
    return Ok(PipelineControl::Continue);
  };

  if let Some(status) = transition.status {
    let delivered_at = transition.stamp_delivered_at.then(Utc::now);
    state.orders.set_status(order.id, status, delivered_at).await?;
    info!(order_id = %order.id, ?status, reported = %reported, "Order status updated.");
  }

  ctx.write().pending_notice = transition.notice;
  Ok(PipelineControl::Continue)
}

fn build_notification(details: &OrderDetails, notice: ShipmentNotice, tracking_url: String) -> Option<Notification> {
  let mobile_no = details
    .customer
    .mobile_no
    .as_deref()
    .map(str::trim)
    .filter(|m| !m.is_empty())?;

  Some(Notification {
    notice,
    mobile_no: mobile_no.to_string(),
    customer_name: details
      .customer
      .name
      .clone()
      .filter(|n| !n.trim().is_empty())
      .unwrap_or_else(|| FALLBACK_CUSTOMER_NAME.to_string()),
    product_name: details
      .first_product_name()
      .unwrap_or(FALLBACK_PRODUCT_NAME)
      .to_string(),
    message: THANK_YOU_MESSAGE.to_string(),
    tracking_url,
  })
}

#[instrument(name = "shipment::notify_customer", skip(ctx), err)]
async fn notify_customer(ctx: Ctx) -> AppResult<PipelineControl> {
  let (notifier, notification) = {
    let guard = ctx.read();
    let (Some(notice), Some(details)) = (guard.pending_notice, guard.order.as_ref()) else {
      return Ok(PipelineControl::Continue);
    };
    let url = tracking_url(
      guard.app_state.config.tracking_base_url.as_deref(),
      details.order.awb.as_deref(),
    );
    (guard.app_state.notifier.clone(), build_notification(details, notice, url))
  };

  let Some(notification) = notification else {
    warn!("Customer has no mobile number; notification skipped.");
    return Ok(PipelineControl::Continue);
  };

  // Provider failures never fail the webhook.
  match notifier.send(notification).await {
    Ok(()) => ctx.write().notification_sent = true,
    Err(e) => warn!(error = %e, "Shipment notification failed."),
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "shipment::record_delivery_status", skip(ctx), err)]
async fn record_delivery_status(ctx: Ctx) -> AppResult<PipelineControl> {
  let (state, order, update) = loaded(&ctx)?;
  state
    .orders
    .set_delivery_status(order.id, update.current_status)
    .await?;
  Ok(PipelineControl::Continue)
}

pub fn build_shipment_pipeline() -> FlowResult<Pipeline<ShipmentWebhookCtxData, AppError>> {
  let nothing_to_send: SkipCondition<ShipmentWebhookCtxData> = Arc::new(|ctx: &Ctx| ctx.read().pending_notice.is_none());

  let mut p = Pipeline::<ShipmentWebhookCtxData, AppError>::new(&[
    ("load_order", false, None),
    ("backfill_awb", false, None),
    ("sync_etd", false, None),
    ("apply_status_transition", false, None),
    ("notify_customer", true, Some(nothing_to_send)),
    ("record_delivery_status", false, None),
  ]);

  p.on_step("load_order", load_order)?;
  p.on_step("backfill_awb", backfill_awb)?;
  p.on_step("sync_etd", sync_etd)?;
  p.on_step("apply_status_transition", apply_status_transition)?;
  p.on_step("notify_customer", notify_customer)?;
  p.on_step("record_delivery_status", record_delivery_status)?;
  Ok(p)
}

pub fn register_shipment_pipeline(flows: &Flows<AppError>) -> FlowResult<()> {
  flows.register(build_shipment_pipeline()?);
  info!("Shipment webhook pipeline registered.");
  Ok(())
}
