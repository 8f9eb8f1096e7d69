//! Rebuild every parcel's NeighborSet
//!
//! Brute-force K-nearest search over all located parcels, written through an
//! idempotent upsert. Safe to re-run at any time. Prints the final report as JSON.

use anyhow::{Context, Result};
use blockly_core::config::{Config, NeighborConfig};
use blockly_core::domains::parcels::activities::populate_neighbors;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "populate_neighbors")]
#[command(about = "Precompute the K nearest parcels for every parcel")]
struct Cli {
    /// Neighbors per parcel (defaults to NEIGHBOR_COUNT)
    #[arg(long)]
    k: Option<usize>,

    /// Parcels processed concurrently per batch (defaults to NEIGHBOR_BATCH_SIZE)
    #[arg(long)]
    batch_size: Option<usize>,
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

    let settings = NeighborConfig {
        k: cli.k.unwrap_or(config.neighbors.k),
        batch_size: cli.batch_size.unwrap_or(config.neighbors.batch_size),
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let report = populate_neighbors(settings, &pool).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.failed > 0 {
        tracing::warn!(
            failed = report.failed,
            "Some parcels could not be written; re-run to retry"
        );
    }

    Ok(())
}
