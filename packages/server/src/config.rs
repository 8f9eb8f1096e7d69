use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default model identifier for the summary generation service
pub const DEFAULT_SUMMARY_MODEL: &str = "claude-3-haiku-20240307";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Generation service is disabled (every summary falls back) when unset
    pub anthropic_api_key: Option<String>,
    pub summary: SummaryConfig,
    pub neighbors: NeighborConfig,
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
}

/// Settings for the summarization pipeline
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub max_comments: usize,
    pub narrative_ttl: Duration,
    pub structured_ttl: Duration,
    pub cache_fallback: bool,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_SUMMARY_MODEL.to_string(),
            max_tokens: 1000,
            timeout: Duration::from_secs(20),
            max_comments: 50,
            narrative_ttl: Duration::from_secs(5 * 60),
            structured_ttl: Duration::from_secs(15 * 60),
            cache_fallback: false,
        }
    }
}

/// Settings for the offline neighbor index job
#[derive(Debug, Clone, Copy)]
pub struct NeighborConfig {
    pub k: usize,
    pub batch_size: usize,
}

impl Default for NeighborConfig {
    fn default() -> Self {
        Self {
            k: 10,
            batch_size: 100,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let summary_defaults = SummaryConfig::default();
        let neighbor_defaults = NeighborConfig::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: parse_var("PORT", 8080u16)?,
            anthropic_api_key: env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            summary: SummaryConfig {
                model: env::var("SUMMARY_MODEL").unwrap_or(summary_defaults.model),
                max_tokens: parse_var("SUMMARY_MAX_TOKENS", summary_defaults.max_tokens)?,
                timeout: Duration::from_secs(parse_var(
                    "SUMMARY_TIMEOUT_SECS",
                    summary_defaults.timeout.as_secs(),
                )?),
                max_comments: parse_var("SUMMARY_MAX_COMMENTS", summary_defaults.max_comments)?,
                narrative_ttl: Duration::from_secs(parse_var(
                    "NARRATIVE_CACHE_TTL_SECS",
                    summary_defaults.narrative_ttl.as_secs(),
                )?),
                structured_ttl: Duration::from_secs(parse_var(
                    "STRUCTURED_CACHE_TTL_SECS",
                    summary_defaults.structured_ttl.as_secs(),
                )?),
                cache_fallback: parse_var(
                    "CACHE_FALLBACK_SUMMARIES",
                    summary_defaults.cache_fallback,
                )?,
            },
            neighbors: NeighborConfig {
                k: parse_var("NEIGHBOR_COUNT", neighbor_defaults.k)?,
                batch_size: parse_var("NEIGHBOR_BATCH_SIZE", neighbor_defaults.batch_size)?,
            },
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|origins| split_origins(&origins))
                .unwrap_or_default(),
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid value, got {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}
