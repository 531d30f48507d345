// server/src/services/mod.rs

pub mod analytics;
pub mod assets;
pub mod messaging;
pub mod reviews;
pub mod uploads;
