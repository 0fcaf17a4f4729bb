//! Data access layer
//!
//! Opens the observation database as a read-only connection pool and checks
//! that the two tables the routes query have the expected columns. The
//! tables themselves are owned by whoever produced the database file; this
//! crate never writes to them.

use std::str::FromStr;
use std::time::Instant;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{error, info, instrument};

use crate::config::DatabaseConfig;
use crate::{ClimateError, Result};

/// Statically declared table the service reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entity {
    pub table: &'static str,
    pub columns: &'static [&'static str],
}

pub const STATION: Entity = Entity {
    table: "station",
    columns: &["station", "name", "latitude", "longitude", "elevation"],
};

pub const MEASUREMENT: Entity = Entity {
    table: "measurement",
    columns: &["station", "date", "prcp", "tobs"],
};

/// Entities verified against the live database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub station: Entity,
    pub measurement: Entity,
}

/// Opens a read-only pool on the configured database.
///
/// The file must already exist; a missing database is an error rather than
/// a freshly created empty one.
#[instrument(skip(config), fields(url = %config.url))]
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool> {
    let started_at = Instant::now();
    info!("Opening observation database");

    let options = SqliteConnectOptions::from_str(&config.url)?
        .read_only(true)
        .create_if_missing(false);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect_with(options)
        .await
        .map_err(|e| {
            error!(
                duration_ms = started_at.elapsed().as_millis() as u64,
                "Failed to open observation database: {}", e
            );
            ClimateError::from(e)
        })?;

    info!(
        duration_ms = started_at.elapsed().as_millis() as u64,
        max_connections = config.max_connections,
        "Observation database opened"
    );
    Ok(pool)
}

/// Checks the declared entities against the live schema.
#[instrument(skip(pool))]
pub async fn introspect(pool: &SqlitePool) -> Result<Schema> {
    let schema = Schema {
        station: verify_entity(pool, STATION).await?,
        measurement: verify_entity(pool, MEASUREMENT).await?,
    };
    info!(
        tables = ?[schema.station.table, schema.measurement.table],
        "Schema verified"
    );
    Ok(schema)
}

async fn verify_entity(pool: &SqlitePool, entity: Entity) -> Result<Entity> {
    let present = sqlx::query_scalar::<_, String>("SELECT name FROM pragma_table_info(?1)")
        .bind(entity.table)
        .fetch_all(pool)
        .await?;

    if present.is_empty() {
        error!(table = entity.table, "Table not found");
        return Err(ClimateError::schema(format!(
            "table '{}' not found",
            entity.table
        )));
    }

    let missing: Vec<&str> = entity
        .columns
        .iter()
        .copied()
        .filter(|column| !present.iter().any(|p| p.eq_ignore_ascii_case(column)))
        .collect();

    if !missing.is_empty() {
        error!(table = entity.table, ?missing, "Table is missing columns");
        return Err(ClimateError::schema(format!(
            "table '{}' is missing column(s): {}",
            entity.table,
            missing.join(", ")
        )));
    }

    Ok(entity)
}
