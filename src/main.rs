use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use climate_api::{AppState, ClimateApiConfig, SqliteClimateStore, db, logging, web};

/// Read-only JSON API over a weather station observation database
#[derive(Debug, Parser)]
#[command(name = "climate-api", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log at debug level, overriding RUST_LOG and the config file
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ClimateApiConfig::load_from_path(cli.config)?;
    logging::init(&config.logging, cli.verbose)?;
    tracing::info!(version = climate_api::VERSION, "Starting climate API");

    let pool = db::connect(&config.database)
        .await
        .with_context(|| format!("Failed to open database at {}", config.database.url))?;
    db::introspect(&pool)
        .await
        .context("Database does not contain the station and measurement tables")?;

    let state = AppState::new(SqliteClimateStore::new(pool), config.queries.clone());
    web::run(&config.server, state).await
}
