//! Data models for the climate API
//!
//! Row types read from the observation store:
//! - Station: weather-reporting location metadata
//! - Observation: dated temperature readings, raw and per station
//! - Summary: avg/max/min aggregates over a date filter

pub mod observation;
pub mod station;
pub mod summary;

// Re-export all public types for convenient access
pub use observation::{DatedTemperature, StationTemperature};
pub use station::Station;
pub use summary::{SummaryRow, TemperatureSummary};
