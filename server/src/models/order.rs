// server/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

use super::{OrderItem, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
  Pending,
  Completed,
  Cancelled,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub status: OrderStatus,
  /// Last status string reported by the carrier.
  pub delivery_status: Option<String>,
  pub awb: Option<String>,
  pub etd: Option<String>,
  pub delivered_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// An order together with its customer and line items.
#[derive(Debug, Clone)]
pub struct OrderDetails {
  pub order: Order,
  pub customer: User,
  pub items: Vec<OrderItem>,
}

impl OrderDetails {
  pub fn first_product_name(&self) -> Option<&str> {
    self.items.first().map(|item| item.product_name.as_str())
  }
}

/// Carrier delivery states the backend reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
  Delivered,
  Cancelled,
  OutForDelivery,
  Shipped,
  Other(String),
}

impl DeliveryStatus {
  /// Matches the carrier's exact status strings.
  pub fn parse(raw: &str) -> Self {
    match raw {
      "Delivered" => DeliveryStatus::Delivered,
      "Cancelled" => DeliveryStatus::Cancelled,
      "Out for Delivery" => DeliveryStatus::OutForDelivery,
      "Shipped" => DeliveryStatus::Shipped,
      other => DeliveryStatus::Other(other.to_string()),
    }
  }

  pub fn as_str(&self) -> &str {
    match self {
      DeliveryStatus::Delivered => "Delivered",
      DeliveryStatus::Cancelled => "Cancelled",
      DeliveryStatus::OutForDelivery => "Out for Delivery",
      DeliveryStatus::Shipped => "Shipped",
      DeliveryStatus::Other(raw) => raw,
    }
  }
}

impl std::fmt::Display for DeliveryStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_known_carrier_statuses() {
    assert_eq!(DeliveryStatus::parse("Delivered"), DeliveryStatus::Delivered);
    assert_eq!(DeliveryStatus::parse("Out for Delivery"), DeliveryStatus::OutForDelivery);
    assert_eq!(DeliveryStatus::parse("Shipped").as_str(), "Shipped");
  }

  #[test]
  fn unknown_statuses_are_kept_verbatim() {
    let status = DeliveryStatus::parse("RTO Initiated");
    assert_eq!(status, DeliveryStatus::Other("RTO Initiated".to_string()));
    assert_eq!(status.to_string(), "RTO Initiated");
    // Matching is case sensitive, like the carrier's payloads.
    assert!(matches!(DeliveryStatus::parse("delivered"), DeliveryStatus::Other(_)));
  }
}
