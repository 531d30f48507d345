// server/src/db/reviews.rs

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::Result as AppResult;
use crate::models::{NewProductRating, ProductRating};

const RATING_COLUMNS: &str = "id, product_id, user_id, title, description, rating, created_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
  async fn product_exists(&self, product_id: Uuid) -> AppResult<bool>;

  /// Stores the rating and refreshes the product's average rating.
  async fn create_rating(&self, rating: NewProductRating) -> AppResult<ProductRating>;

  /// Ratings for a product, newest first.
  async fn list_for_product(&self, product_id: Uuid) -> AppResult<Vec<ProductRating>>;
}

#[derive(Debug, Clone)]
pub struct PgReviewRepository {
  pool: PgPool,
}

impl PgReviewRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
  #[instrument(name = "db::product_exists", skip(self), err)]
  async fn product_exists(&self, product_id: Uuid) -> AppResult<bool> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
      .bind(product_id)
      .fetch_one(&self.pool)
      .await?;
    Ok(exists)
  }

  #[instrument(name = "db::create_rating", skip(self, rating), fields(product_id = %rating.product_id), err)]
  async fn create_rating(&self, rating: NewProductRating) -> AppResult<ProductRating> {
    let mut tx = self.pool.begin().await?;

    let created = sqlx::query_as::<_, ProductRating>(&format!(
      "INSERT INTO product_ratings (id, product_id, user_id, title, description, rating) \
       VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
      RATING_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(rating.product_id)
    .bind(rating.user_id)
    .bind(&rating.title)
    .bind(&rating.description)
    .bind(rating.rating)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
      "UPDATE products SET avg_rating = COALESCE( \
         (SELECT AVG(rating)::DOUBLE PRECISION FROM product_ratings WHERE product_id = $1), 0) \
       WHERE id = $1",
    )
    .bind(rating.product_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(created)
  }

  #[instrument(name = "db::list_ratings", skip(self), err)]
  async fn list_for_product(&self, product_id: Uuid) -> AppResult<Vec<ProductRating>> {
    let rows = sqlx::query_as::<_, ProductRating>(&format!(
      "SELECT {} FROM product_ratings WHERE product_id = $1 ORDER BY created_at DESC",
      RATING_COLUMNS
    ))
    .bind(product_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows)
  }
}
