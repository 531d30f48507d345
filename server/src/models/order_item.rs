// server/src/models/order_item.rs

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_variant_id: Uuid,
  /// Name captured when the order was placed.
  pub product_name: String,
  pub quantity: i32,
  pub price_at_order: f64,
}
