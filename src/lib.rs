//! Climate API - read-only JSON endpoints over a weather observation database
//!
//! This library provides the data access layer, the query seam and the HTTP
//! routes that turn date filters into temperature aggregates.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod store;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use config::ClimateApiConfig;
pub use error::ClimateError;
pub use models::{Station, TemperatureSummary};
pub use store::{ClimateStore, SqliteClimateStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ClimateError>;
