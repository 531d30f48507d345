// server/src/pipelines/contexts.rs

//! Data carried through pipelines. Handlers receive these wrapped in
//! `storefront_flow::ContextData`.

use crate::models::OrderDetails;
use crate::services::messaging::ShipmentNotice;
use crate::state::AppState;
use serde::{Deserialize, Deserializer};

/// Body posted by the shipping carrier. Fields we do not use are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ShipmentUpdate {
  #[serde(deserialize_with = "text_or_number")]
  pub order_id: String,
  #[serde(default, deserialize_with = "optional_text_or_number")]
  pub awb: Option<String>,
  #[serde(default, deserialize_with = "optional_text_or_number")]
  pub etd: Option<String>,
  pub current_status: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
  Text(String),
  Int(i64),
  Float(f64),
}

impl From<Scalar> for String {
  fn from(value: Scalar) -> Self {
    match value {
      Scalar::Text(s) => s,
      Scalar::Int(n) => n.to_string(),
      Scalar::Float(f) => f.to_string(),
    }
  }
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Scalar::deserialize(deserializer).map(String::from)
}

// Carriers send AWBs as numbers and blank strings for unknown values.
fn optional_text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Scalar>::deserialize(deserializer)?;
  Ok(value.map(String::from).filter(|s| !s.trim().is_empty()))
}

#[derive(Clone)]
pub struct ShipmentWebhookCtxData {
  pub app_state: AppState,
  pub update: ShipmentUpdate,
  /// Filled by `load_order`.
  pub order: Option<OrderDetails>,
  /// Notification queued by the status transition, sent by `notify_customer`.
  pub pending_notice: Option<ShipmentNotice>,
  pub notification_sent: bool,
}

impl ShipmentWebhookCtxData {
  pub fn new(app_state: AppState, update: ShipmentUpdate) -> Self {
    Self {
      app_state,
      update,
      order: None,
      pending_notice: None,
      notification_sent: false,
    }
  }
}
