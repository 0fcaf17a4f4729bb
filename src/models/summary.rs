//! Temperature aggregate model

use serde::{Deserialize, Serialize};

/// Aggregate row as returned by the store.
///
/// SQL aggregates over zero rows yield NULLs, so every statistic is optional
/// until [`TemperatureSummary::from_row`] decides whether the row is real.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SummaryRow {
    pub average: Option<f64>,
    pub highest: Option<f64>,
    pub lowest: Option<f64>,
    pub observations: i64,
}

/// Average, highest and lowest temperature over a set of observations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSummary {
    pub average: f64,
    pub highest: f64,
    pub lowest: f64,
    /// Number of non-NULL readings aggregated
    pub observations: i64,
}

impl TemperatureSummary {
    /// `None` when no reading matched the filter
    #[must_use]
    pub fn from_row(row: SummaryRow) -> Option<Self> {
        if row.observations == 0 {
            return None;
        }
        Some(Self {
            average: row.average?,
            highest: row.highest?,
            lowest: row.lowest?,
            observations: row.observations,
        })
    }
}
