// server/src/models/analytics.rs

//! Read projections used by the analytics endpoints.

use sqlx::FromRow;
use uuid::Uuid;

/// Order-item totals for one product variant.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct VariantSales {
  pub product_variant_id: Uuid,
  pub quantity: i64,
  /// Sum of `price_at_order` over the variant's order items.
  pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ProductSummary {
  pub id: Uuid,
  pub name: String,
}

/// A variant with the product, category and first image it presents.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct VariantListing {
  pub variant_id: Uuid,
  pub product_id: Uuid,
  pub product_name: String,
  pub price: f64,
  pub discount_price: Option<f64>,
  pub category_name: Option<String>,
  pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ProductListing {
  pub id: Uuid,
  pub name: String,
  pub price: f64,
  pub discount_price: Option<f64>,
  pub category_name: Option<String>,
  pub image_url: Option<String>,
}
