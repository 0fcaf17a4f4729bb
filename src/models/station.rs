//! Station model

use serde::{Deserialize, Serialize};

/// A fixed weather-reporting location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Station {
    /// Station code, the key observations refer to
    pub station: String,
    /// Human-readable station name
    pub name: Option<String>,
    /// Latitude in decimal degrees
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees
    pub longitude: Option<f64>,
    /// Elevation in the unit of the source dataset
    pub elevation: Option<f64>,
}

impl Station {
    #[must_use]
    pub fn new(station: impl Into<String>, name: impl Into<String>, elevation: f64) -> Self {
        Self {
            station: station.into(),
            name: Some(name.into()),
            latitude: None,
            longitude: None,
            elevation: Some(elevation),
        }
    }
}
