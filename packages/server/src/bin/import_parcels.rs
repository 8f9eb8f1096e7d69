//! One-time bulk load of parcels from a GeoJSON FeatureCollection
//!
//! Features whose objectid is already stored are skipped. Prints the final
//! report as JSON.

use anyhow::{Context, Result};
use blockly_core::config::Config;
use blockly_core::domains::parcels::activities::{import_parcels, parse_feature_collection};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "import_parcels")]
#[command(about = "Load parcels from a GeoJSON file")]
struct Cli {
    /// Path to the GeoJSON FeatureCollection
    #[arg(long)]
    file: PathBuf,

    /// Features inserted concurrently per batch
    #[arg(long, default_value_t = 100)]
    batch_size: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,blockly_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let raw = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;
    let collection = parse_feature_collection(&raw)?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let report = import_parcels(&collection, cli.batch_size, &pool).await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
