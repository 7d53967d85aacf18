//! Operator CLI: one-off collection passes, scraping, reports and cleanup.
//!
//! Output is JSON so it can be piped into other tools.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use hamlat_core::config::{CollectionSettings, PlatformCredentials};
use hamlat_core::domains::analytics::queries::{breakdown, Dimension};
use hamlat_core::domains::analytics::{self, metrics::breakdown_map, Period, PriorityAnalytics};
use hamlat_core::domains::collection::{
    platform_collectors, CollectionWorker, CycleReport, Trigger, WebScraper,
};
use hamlat_core::domains::mentions::{Mention, PlatformStats};
use hamlat_core::domains::regions::PriorityTier;
use hamlat_core::kernel::run_cleanup;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hamlat-cli")]
#[command(about = "HamlatAI collection and maintenance CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one collection pass over every tier, or a single tier
    Collect {
        /// Tier or governorate name, e.g. `erbil`, `slemani`, `other`
        #[arg(long)]
        tier: Option<String>,
    },

    /// Scrape the configured news, government and party sites
    Scrape,

    /// Print the priority collection report
    Report {
        /// 24h, 7d or 30d
        #[arg(long, default_value = "24h")]
        period: String,
    },

    /// Delete mentions, articles and runs past retention
    Cleanup {
        #[arg(long)]
        days: Option<i32>,
    },
}

#[derive(Serialize)]
struct CollectOutput {
    cycles: Vec<CycleReport>,
    failed_tiers: Vec<String>,
}

#[derive(Serialize)]
struct ScrapeOutput {
    articles_stored: usize,
}

#[derive(Serialize)]
struct ReportOutput {
    priority: PriorityAnalytics,
    dialects: BTreeMap<String, i64>,
    platforms: Vec<PlatformStats>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,hamlat_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;
    let settings = CollectionSettings::from_env()?;

    match cli.command {
        Commands::Collect { tier } => {
            let tiers = match tier {
                Some(name) => vec![name.parse::<PriorityTier>()?],
                None => PriorityTier::all_in_order().to_vec(),
            };
            print_json(&collect(pool, settings, tiers).await?)
        }
        Commands::Scrape => {
            let scraper = WebScraper::new()?;
            let articles_stored = scraper.scrape_all(&pool).await?;
            print_json(&ScrapeOutput { articles_stored })
        }
        Commands::Report { period } => {
            let period: Period = period.parse()?;
            print_json(&report(period, &pool).await?)
        }
        Commands::Cleanup { days } => {
            let days = days.unwrap_or(settings.retention_days);
            anyhow::ensure!(days > 0, "--days must be positive");
            print_json(&run_cleanup(&pool, days).await?)
        }
    }
}

async fn collect(
    pool: PgPool,
    settings: CollectionSettings,
    tiers: Vec<PriorityTier>,
) -> Result<CollectOutput> {
    let collectors = platform_collectors(&PlatformCredentials::from_env());
    anyhow::ensure!(
        !collectors.is_empty(),
        "no platform credentials configured, nothing to collect"
    );
    let worker = Arc::new(CollectionWorker::new(pool, collectors, settings));

    let mut output = CollectOutput {
        cycles: Vec::new(),
        failed_tiers: Vec::new(),
    };
    for tier in tiers {
        match worker.run_tier(tier, Trigger::Manual).await {
            Ok(cycle) => output.cycles.push(cycle),
            Err(e) => {
                tracing::error!(tier = %tier, error = %e, "Collection failed");
                output.failed_tiers.push(tier.to_string());
            }
        }
    }
    Ok(output)
}

async fn report(period: Period, pool: &PgPool) -> Result<ReportOutput> {
    let now = Utc::now();
    let since = now - period.duration();

    Ok(ReportOutput {
        priority: analytics::priority(period, pool, now).await?,
        dialects: breakdown_map(breakdown(Dimension::Dialect, since, false, pool).await?),
        platforms: Mention::platform_stats(pool).await?,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
