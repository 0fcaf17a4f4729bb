//! Observation models
//!
//! Dates are kept as the `YYYY-MM-DD` strings the store holds; filters compare
//! them lexicographically.

use serde::{Deserialize, Serialize};

use crate::ClimateError;

/// Date and temperature of a single observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DatedTemperature {
    pub date: String,
    pub temperature: Option<f64>,
}

/// Observation joined with the name of its station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StationTemperature {
    pub station_name: Option<String>,
    pub date: String,
    pub temperature: Option<f64>,
}

impl StationTemperature {
    /// Whole-degree temperature, truncated toward zero.
    ///
    /// A NULL reading cannot be coerced and is reported as an error.
    pub fn whole_degrees(&self) -> crate::Result<i64> {
        self.temperature
            .map(|t| t.trunc() as i64)
            .ok_or_else(|| ClimateError::missing_value("tobs"))
    }
}
