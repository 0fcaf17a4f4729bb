//! Seeded SQLite fixtures for the integration tests

use std::path::Path;

use axum::Router;
use climate_api::config::{DatabaseConfig, QueryConfig};
use climate_api::{AppState, SqliteClimateStore, db, web};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// (station code, name, elevation)
pub type StationRow<'a> = (&'a str, Option<&'a str>, Option<f64>);
/// (station code, date, tobs)
pub type MeasurementRow<'a> = (&'a str, &'a str, Option<f64>);

/// Writes a database with the station/measurement layout of the source
/// dataset into `dir` and returns its connection URL.
pub async fn seed_database(
    dir: &Path,
    stations: &[StationRow<'_>],
    measurements: &[MeasurementRow<'_>],
) -> String {
    seed_database_with_type(dir, "FLOAT", stations, measurements).await
}

/// Same layout, with every numeric column declared as `numeric_type`
pub async fn seed_database_with_type(
    dir: &Path,
    numeric_type: &str,
    stations: &[StationRow<'_>],
    measurements: &[MeasurementRow<'_>],
) -> String {
    let path = dir.join("hawaii.sqlite");
    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("create fixture database");

    sqlx::query(&format!(
        "CREATE TABLE station (id INTEGER PRIMARY KEY, station TEXT, name TEXT, \
         latitude {numeric_type}, longitude {numeric_type}, elevation {numeric_type})"
    ))
    .execute(&pool)
    .await
    .expect("create station table");
    sqlx::query(&format!(
        "CREATE TABLE measurement (id INTEGER PRIMARY KEY, station TEXT, date TEXT, \
         prcp {numeric_type}, tobs {numeric_type})"
    ))
    .execute(&pool)
    .await
    .expect("create measurement table");

    for (code, name, elevation) in stations {
        sqlx::query(
            "INSERT INTO station (station, name, latitude, longitude, elevation) \
             VALUES (?1, ?2, 21.3, -157.8, ?3)",
        )
        .bind(*code)
        .bind(*name)
        .bind(*elevation)
        .execute(&pool)
        .await
        .expect("insert station");
    }

    for (code, date, tobs) in measurements {
        sqlx::query("INSERT INTO measurement (station, date, prcp, tobs) VALUES (?1, ?2, 0.0, ?3)")
            .bind(*code)
            .bind(*date)
            .bind(*tobs)
            .execute(&pool)
            .await
            .expect("insert measurement");
    }

    pool.close().await;
    format!("sqlite://{}", path.display())
}

/// Opens the seeded database the way the binary does and builds the app
pub async fn open_app(url: String) -> Router {
    let config = DatabaseConfig {
        url,
        ..DatabaseConfig::default()
    };
    let pool = db::connect(&config).await.expect("open fixture database");
    db::introspect(&pool).await.expect("fixture schema");
    web::app(AppState::new(
        SqliteClimateStore::new(pool),
        QueryConfig::default(),
    ))
}
