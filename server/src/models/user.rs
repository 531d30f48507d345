// server/src/models/user.rs

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// The customer fields the backend reads; accounts are managed elsewhere.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
  pub id: Uuid,
  pub name: Option<String>,
  pub mobile_no: Option<String>,
}
