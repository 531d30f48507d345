// server/src/db/analytics.rs

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::Result as AppResult;
use crate::models::{ProductListing, ProductStatus, ProductSummary, VariantListing, VariantSales};

const VARIANT_SALES_SQL: &str = "SELECT product_variant_id, \
   COALESCE(SUM(quantity), 0)::BIGINT AS quantity, \
   COALESCE(SUM(price_at_order), 0)::DOUBLE PRECISION AS revenue \
   FROM order_items GROUP BY product_variant_id";

const PRODUCT_FOR_VARIANT_SQL: &str = "SELECT p.id, p.name FROM product_variants v \
   JOIN product_colors c ON c.id = v.color_id \
   JOIN products p ON p.id = c.product_id \
   WHERE v.id = $1";

const VARIANT_LISTING_SELECT: &str = "SELECT v.id AS variant_id, p.id AS product_id, p.name AS product_name, \
   p.price, p.discount_price, cat.name AS category_name, \
   (SELECT a.asset_url FROM product_assets a WHERE a.color_id = c.id ORDER BY a.created_at, a.id LIMIT 1) AS image_url \
   FROM product_variants v \
   JOIN product_colors c ON c.id = v.color_id \
   JOIN products p ON p.id = c.product_id \
   LEFT JOIN categories cat ON cat.id = p.category_id";

const NEWEST_PUBLISHED_SQL: &str = "SELECT p.id, p.name, p.price, p.discount_price, cat.name AS category_name, \
   (SELECT a.asset_url FROM product_assets a WHERE a.product_id = p.id ORDER BY a.created_at, a.id LIMIT 1) AS image_url \
   FROM products p LEFT JOIN categories cat ON cat.id = p.category_id \
   WHERE p.status = $1 ORDER BY p.created_at DESC LIMIT $2";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
  /// Quantity and revenue totals per product variant, in database order.
  async fn variant_sales(&self) -> AppResult<Vec<VariantSales>>;

  /// Resolves variant → color → product.
  async fn product_for_variant(&self, variant_id: Uuid) -> AppResult<Option<ProductSummary>>;

  /// Listings for the given variants. Row order is unspecified.
  async fn variant_listings(&self, variant_ids: Vec<Uuid>) -> AppResult<Vec<VariantListing>>;

  /// Up to `limit` listings whose product is not in `product_ids`.
  async fn variant_listings_excluding(&self, product_ids: Vec<Uuid>, limit: i64) -> AppResult<Vec<VariantListing>>;

  /// Newest published products first.
  async fn newest_published(&self, limit: i64) -> AppResult<Vec<ProductListing>>;
}

#[derive(Debug, Clone)]
pub struct PgAnalyticsRepository {
  pool: PgPool,
}

impl PgAnalyticsRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl AnalyticsRepository for PgAnalyticsRepository {
  #[instrument(name = "db::variant_sales", skip(self), err)]
  async fn variant_sales(&self) -> AppResult<Vec<VariantSales>> {
    let rows = sqlx::query_as::<_, VariantSales>(VARIANT_SALES_SQL)
      .fetch_all(&self.pool)
      .await?;
    Ok(rows)
  }

  #[instrument(name = "db::product_for_variant", skip(self), err)]
  async fn product_for_variant(&self, variant_id: Uuid) -> AppResult<Option<ProductSummary>> {
    let row = sqlx::query_as::<_, ProductSummary>(PRODUCT_FOR_VARIANT_SQL)
      .bind(variant_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row)
  }

  #[instrument(name = "db::variant_listings", skip(self, variant_ids), fields(count = variant_ids.len()), err)]
  async fn variant_listings(&self, variant_ids: Vec<Uuid>) -> AppResult<Vec<VariantListing>> {
    let sql = format!("{} WHERE v.id = ANY($1)", VARIANT_LISTING_SELECT);
    let rows = sqlx::query_as::<_, VariantListing>(&sql)
      .bind(variant_ids)
      .fetch_all(&self.pool)
      .await?;
    Ok(rows)
  }

  #[instrument(name = "db::variant_listings_excluding", skip(self, product_ids), fields(excluded = product_ids.len()), err)]
  async fn variant_listings_excluding(&self, product_ids: Vec<Uuid>, limit: i64) -> AppResult<Vec<VariantListing>> {
    let sql = format!(
      "{} WHERE NOT (p.id = ANY($1)) ORDER BY p.created_at DESC, v.id LIMIT $2",
      VARIANT_LISTING_SELECT
    );
    let rows = sqlx::query_as::<_, VariantListing>(&sql)
      .bind(product_ids)
      .bind(limit)
      .fetch_all(&self.pool)
      .await?;
    Ok(rows)
  }

  #[instrument(name = "db::newest_published", skip(self), err)]
  async fn newest_published(&self, limit: i64) -> AppResult<Vec<ProductListing>> {
    let rows = sqlx::query_as::<_, ProductListing>(NEWEST_PUBLISHED_SQL)
      .bind(ProductStatus::Published)
      .bind(limit)
      .fetch_all(&self.pool)
      .await?;
    Ok(rows)
  }
}
