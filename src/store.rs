//! Read-only queries over the observation store
//!
//! [`ClimateStore`] is the seam between the route handlers and SQLite. Every
//! method checks one connection out of the pool for the duration of a single
//! statement; the pool takes it back on every exit path.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use tracing::{debug, instrument};

use crate::Result;
use crate::config::DateRange;
use crate::models::{
    DatedTemperature, Station, StationTemperature, SummaryRow, TemperatureSummary,
};

// Numeric columns are CAST to REAL so readings decode as f64 whatever type
// the column was declared with.
const TEMPERATURES_BETWEEN: &str = "\
    SELECT date, CAST(tobs AS REAL) AS temperature \
    FROM measurement \
    WHERE date >= ?1 AND date <= ?2";

const ALL_STATIONS: &str = "\
    SELECT station, name, \
           CAST(latitude AS REAL) AS latitude, \
           CAST(longitude AS REAL) AS longitude, \
           CAST(elevation AS REAL) AS elevation \
    FROM station";

// Joined on the station code; observations from stations missing in the
// station table drop out. See DESIGN.md before changing the join.
const STATION_TEMPERATURES_BETWEEN: &str = "\
    SELECT s.name AS station_name, m.date AS date, CAST(m.tobs AS REAL) AS temperature \
    FROM measurement m \
    JOIN station s ON s.station = m.station \
    WHERE m.date >= ?1 AND m.date <= ?2";

const SUMMARY_ON: &str = "\
    SELECT CAST(AVG(tobs) AS REAL) AS average, \
           CAST(MAX(tobs) AS REAL) AS highest, \
           CAST(MIN(tobs) AS REAL) AS lowest, \
           COUNT(tobs) AS observations \
    FROM measurement \
    WHERE date = ?1";

const SUMMARY_BETWEEN: &str = "\
    SELECT CAST(AVG(tobs) AS REAL) AS average, \
           CAST(MAX(tobs) AS REAL) AS highest, \
           CAST(MIN(tobs) AS REAL) AS lowest, \
           COUNT(tobs) AS observations \
    FROM measurement \
    WHERE date >= ?1 AND date <= ?2";

/// Queries the route handlers issue against the store
#[async_trait]
pub trait ClimateStore: Send + Sync {
    /// Date and temperature of every observation inside `range`
    async fn temperatures_between(&self, range: &DateRange) -> Result<Vec<DatedTemperature>>;

    /// All stations in storage order
    async fn stations(&self) -> Result<Vec<Station>>;

    /// Observations inside `range` labelled with their station's name
    async fn station_temperatures_between(
        &self,
        range: &DateRange,
    ) -> Result<Vec<StationTemperature>>;

    /// Aggregate over observations dated exactly `date`
    async fn summary_on(&self, date: &str) -> Result<Option<TemperatureSummary>>;

    /// Aggregate over observations dated within `[start, end]`
    async fn summary_between(&self, start: &str, end: &str) -> Result<Option<TemperatureSummary>>;
}

/// [`ClimateStore`] backed by a SQLite connection pool
#[derive(Debug, Clone)]
pub struct SqliteClimateStore {
    pool: SqlitePool,
}

impl SqliteClimateStore {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClimateStore for SqliteClimateStore {
    #[instrument(name = "query_temperatures", level = "debug", skip(self))]
    async fn temperatures_between(&self, range: &DateRange) -> Result<Vec<DatedTemperature>> {
        let rows = sqlx::query_as::<_, DatedTemperature>(TEMPERATURES_BETWEEN)
            .bind(range.start.as_str())
            .bind(range.end.as_str())
            .fetch_all(&self.pool)
            .await?;
        debug!(rows = rows.len(), "Fetched temperatures");
        Ok(rows)
    }

    #[instrument(name = "query_stations", level = "debug", skip(self))]
    async fn stations(&self) -> Result<Vec<Station>> {
        let rows = sqlx::query_as::<_, Station>(ALL_STATIONS)
            .fetch_all(&self.pool)
            .await?;
        debug!(rows = rows.len(), "Fetched stations");
        Ok(rows)
    }

    #[instrument(name = "query_station_temperatures", level = "debug", skip(self))]
    async fn station_temperatures_between(
        &self,
        range: &DateRange,
    ) -> Result<Vec<StationTemperature>> {
        let rows = sqlx::query_as::<_, StationTemperature>(STATION_TEMPERATURES_BETWEEN)
            .bind(range.start.as_str())
            .bind(range.end.as_str())
            .fetch_all(&self.pool)
            .await?;
        debug!(rows = rows.len(), "Fetched station temperatures");
        Ok(rows)
    }

    #[instrument(name = "query_summary_on", level = "debug", skip(self))]
    async fn summary_on(&self, date: &str) -> Result<Option<TemperatureSummary>> {
        let row = sqlx::query_as::<_, SummaryRow>(SUMMARY_ON)
            .bind(date)
            .fetch_one(&self.pool)
            .await?;
        debug!(observations = row.observations, "Aggregated single day");
        Ok(TemperatureSummary::from_row(row))
    }

    #[instrument(name = "query_summary_between", level = "debug", skip(self))]
    async fn summary_between(&self, start: &str, end: &str) -> Result<Option<TemperatureSummary>> {
        let row = sqlx::query_as::<_, SummaryRow>(SUMMARY_BETWEEN)
            .bind(start)
            .bind(end)
            .fetch_one(&self.pool)
            .await?;
        debug!(observations = row.observations, "Aggregated date range");
        Ok(TemperatureSummary::from_row(row))
    }
}
