// server/src/lib.rs

//! Storefront API: analytics, reviews, uploads and carrier webhooks for the
//! storefront backend.

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod web;

#[cfg(test)]
pub(crate) mod test_support;
