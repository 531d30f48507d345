// server/src/models/mod.rs

//! Data structures representing database rows and read projections.

pub mod analytics;
pub mod order;
pub mod order_item;
pub mod product;
pub mod product_rating;
pub mod upload;
pub mod user;

pub use analytics::{ProductListing, ProductSummary, VariantListing, VariantSales};
pub use order::{DeliveryStatus, Order, OrderDetails, OrderStatus};
pub use order_item::OrderItem;
pub use product::ProductStatus;
pub use product_rating::{NewProductRating, ProductRating};
pub use upload::Upload;
pub use user::User;
