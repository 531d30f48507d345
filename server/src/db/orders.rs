// server/src/db/orders.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::Result as AppResult;
use crate::models::{Order, OrderDetails, OrderItem, OrderStatus, User};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
  /// The order with its customer and items, or `None` if it does not exist.
  async fn find_details(&self, order_id: Uuid) -> AppResult<Option<OrderDetails>>;

  async fn set_awb(&self, order_id: Uuid, awb: String) -> AppResult<()>;

  async fn set_etd(&self, order_id: Uuid, etd: String) -> AppResult<()>;

  /// Updates the status; `delivered_at` is only written when given.
  async fn set_status(&self, order_id: Uuid, status: OrderStatus, delivered_at: Option<DateTime<Utc>>)
    -> AppResult<()>;

  async fn set_delivery_status(&self, order_id: Uuid, delivery_status: String) -> AppResult<()>;
}

#[derive(Debug, Clone)]
pub struct PgOrderRepository {
  pool: PgPool,
}

impl PgOrderRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
  #[instrument(name = "db::find_order_details", skip(self), err)]
  async fn find_details(&self, order_id: Uuid) -> AppResult<Option<OrderDetails>> {
    let order = sqlx::query_as::<_, Order>(
      "SELECT id, user_id, status, delivery_status, awb, etd, delivered_at, created_at, updated_at \
       FROM orders WHERE id = $1",
    )
    .bind(order_id)
    .fetch_optional(&self.pool)
    .await?;

    let Some(order) = order else {
      return Ok(None);
    };

    let customer_query = sqlx::query_as::<_, User>("SELECT id, name, mobile_no FROM users WHERE id = $1")
      .bind(order.user_id)
      .fetch_one(&self.pool);
    let items_query = sqlx::query_as::<_, OrderItem>(
      "SELECT id, order_id, product_variant_id, product_name, quantity, price_at_order \
       FROM order_items WHERE order_id = $1 ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(&self.pool);

    let (customer, items) = tokio::try_join!(customer_query, items_query)?;

    Ok(Some(OrderDetails { order, customer, items }))
  }

  #[instrument(name = "db::set_awb", skip(self), err)]
  async fn set_awb(&self, order_id: Uuid, awb: String) -> AppResult<()> {
    sqlx::query("UPDATE orders SET awb = $2, updated_at = now() WHERE id = $1")
      .bind(order_id)
      .bind(awb)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  #[instrument(name = "db::set_etd", skip(self), err)]
  async fn set_etd(&self, order_id: Uuid, etd: String) -> AppResult<()> {
    sqlx::query("UPDATE orders SET etd = $2, updated_at = now() WHERE id = $1")
      .bind(order_id)
      .bind(etd)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  #[instrument(name = "db::set_order_status", skip(self), err)]
  async fn set_status(
    &self,
    order_id: Uuid,
    status: OrderStatus,
    delivered_at: Option<DateTime<Utc>>,
  ) -> AppResult<()> {
    sqlx::query(
      "UPDATE orders SET status = $2, delivered_at = COALESCE($3, delivered_at), updated_at = now() \
       WHERE id = $1",
    )
    .bind(order_id)
    .bind(status)
    .bind(delivered_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  #[instrument(name = "db::set_delivery_status", skip(self), err)]
  async fn set_delivery_status(&self, order_id: Uuid, delivery_status: String) -> AppResult<()> {
    sqlx::query("UPDATE orders SET delivery_status = $2, updated_at = now() WHERE id = $1")
      .bind(order_id)
      .bind(delivery_status)
      .execute(&self.pool)
      .await?;
    Ok(())
  }
}
