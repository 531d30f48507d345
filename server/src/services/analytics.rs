// server/src/services/analytics.rs

//! Sales rankings and catalogue listings behind the analytics endpoints.

use futures_util::future::try_join_all;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::AnalyticsRepository;
use crate::errors::Result as AppResult;
use crate::models::{ProductListing, VariantListing, VariantSales};

pub const DEFAULT_TOP_PRODUCTS_LIMIT: usize = 5;
pub const DEFAULT_BESTSELLERS_LIMIT: usize = 10;
pub const DEFAULT_NEW_ARRIVALS_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopProduct {
  pub id: String,
  pub name: String,
  pub sales: i64,
  pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestSeller {
  pub productid: String,
  pub img: String,
  pub name: String,
  pub price: f64,
  pub category: String,
  pub discount: f64,
}

impl From<VariantListing> for BestSeller {
  fn from(listing: VariantListing) -> Self {
    Self {
      productid: listing.product_id.to_string(),
      img: listing.image_url.unwrap_or_default(),
      name: listing.product_name,
      price: listing.price,
      category: listing.category_name.unwrap_or_default(),
      discount: listing.discount_price.unwrap_or(0.0),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArrival {
  pub id: Uuid,
  pub name: String,
  pub img: String,
  pub price: f64,
  pub discount_price: Option<f64>,
  pub category: String,
}

impl From<ProductListing> for NewArrival {
  fn from(listing: ProductListing) -> Self {
    Self {
      id: listing.id,
      name: listing.name,
      img: listing.image_url.unwrap_or_default(),
      price: listing.price,
      discount_price: listing.discount_price,
      category: listing.category_name.unwrap_or_default(),
    }
  }
}

/// Reads a `limit` query value. Anything that is not a positive integer
/// falls back to `default`.
pub fn parse_limit(raw: Option<&str>, default: usize) -> usize {
  raw
    .and_then(|v| v.trim().parse::<usize>().ok())
    .filter(|n| *n > 0)
    .unwrap_or(default)
}

fn sql_limit(limit: usize) -> i64 {
  i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Highest quantity first. The sort is stable, so ties keep database order.
pub fn rank_by_quantity(mut sales: Vec<VariantSales>) -> Vec<VariantSales> {
  sales.sort_by(|a, b| b.quantity.cmp(&a.quantity));
  sales
}

/// Reorders listings to follow `ranked_variant_ids`.
pub fn order_by_rank(listings: &mut [VariantListing], ranked_variant_ids: &[Uuid]) {
  let rank: HashMap<Uuid, usize> = ranked_variant_ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
  listings.sort_by_key(|l| rank.get(&l.variant_id).copied().unwrap_or(usize::MAX));
}

/// Appends listings for products not yet present, stopping at `limit`.
pub fn extend_one_per_product(picked: &mut Vec<VariantListing>, candidates: Vec<VariantListing>, limit: usize) {
  let mut seen: HashSet<Uuid> = picked.iter().map(|l| l.product_id).collect();
  for listing in candidates {
    if picked.len() >= limit {
      break;
    }
    if seen.insert(listing.product_id) {
      picked.push(listing);
    }
  }
}

#[instrument(name = "analytics::top_products", skip(repo))]
pub async fn top_products(repo: &dyn AnalyticsRepository, limit: usize) -> AppResult<Vec<TopProduct>> {
  let ranked = rank_by_quantity(repo.variant_sales().await?);
  let top: Vec<VariantSales> = ranked.into_iter().take(limit).collect();

  let products = try_join_all(top.iter().map(|s| repo.product_for_variant(s.product_variant_id))).await?;

  let result: Vec<TopProduct> = top
    .into_iter()
    .zip(products)
    .map(|(sales, product)| match product {
      Some(p) => TopProduct {
        id: p.id.to_string(),
        name: p.name,
        sales: sales.quantity,
        revenue: sales.revenue,
      },
      None => TopProduct {
        id: String::new(),
        name: "Unknown Product".to_string(),
        sales: sales.quantity,
        revenue: sales.revenue,
      },
    })
    .collect();

  info!(count = result.len(), "Top products computed.");
  Ok(result)
}

#[instrument(name = "analytics::best_sellers", skip(repo))]
pub async fn best_sellers(repo: &dyn AnalyticsRepository, limit: usize) -> AppResult<Vec<BestSeller>> {
  let ranked = rank_by_quantity(repo.variant_sales().await?);
  let ranked_ids: Vec<Uuid> = ranked.iter().map(|s| s.product_variant_id).collect();

  let mut listings = if ranked_ids.is_empty() {
    Vec::new()
  } else {
    repo.variant_listings(ranked_ids.clone()).await?
  };
  order_by_rank(&mut listings, &ranked_ids);

  let mut picked = Vec::new();
  extend_one_per_product(&mut picked, listings, limit);

  if picked.len() < limit {
    let existing: Vec<Uuid> = picked.iter().map(|l| l.product_id).collect();
    let missing = sql_limit(limit - picked.len());
    let extra = repo.variant_listings_excluding(existing, missing).await?;
    extend_one_per_product(&mut picked, extra, limit);
  }

  info!(count = picked.len(), "Bestsellers computed.");
  Ok(picked.into_iter().map(BestSeller::from).collect())
}

#[instrument(name = "analytics::new_arrivals", skip(repo))]
pub async fn new_arrivals(repo: &dyn AnalyticsRepository, limit: usize) -> AppResult<Vec<NewArrival>> {
  let products = repo.newest_published(sql_limit(limit)).await?;
  Ok(products.into_iter().map(NewArrival::from).collect())
}
