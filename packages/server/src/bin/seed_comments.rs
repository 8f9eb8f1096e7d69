//! Fill the database with random demo comments
//!
//! Needs parcels first (see import_parcels). Prints the final report as JSON.

use anyhow::{Context, Result};
use blockly_core::config::Config;
use blockly_core::domains::comments::activities::{seed_comments, SeedSettings};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "seed_comments")]
#[command(about = "Insert random demo comments on located parcels")]
struct Cli {
    /// Exact number of comments (default: about 3 per parcel on 30-70% of parcels)
    #[arg(long)]
    count: Option<usize>,

    /// Author ids are drawn from 1..=authors
    #[arg(long, default_value_t = 25)]
    authors: i64,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
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

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let settings = SeedSettings {
        comments: cli.count,
        authors: cli.authors,
        seed: cli.seed,
    };
    let report = seed_comments(settings, &pool).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
