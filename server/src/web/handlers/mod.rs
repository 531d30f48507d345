// server/src/web/handlers/mod.rs

pub mod analytics_handlers;
pub mod review_handlers;
pub mod upload_handlers;
pub mod webhook_handlers;
