// Main entry point for the API server

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hamlat_core::domains::collection::{platform_collectors, CollectionWorker, WebScraper};
use hamlat_core::kernel::{start_scheduler, ServerDeps};
use hamlat_core::server::{build_app, AppState};
use hamlat_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hamlat_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting HamlatAI API");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    if config.test_identifier_enabled {
        tracing::warn!("TEST_IDENTIFIER_ENABLED is set, the test login code is accepted");
    }

    let deps = Arc::new(ServerDeps::from_config(pool.clone(), &config));

    // Collection worker
    let scraper = WebScraper::new().context("Failed to build web scraper")?;
    let worker = Arc::new(
        CollectionWorker::new(
            pool.clone(),
            platform_collectors(&config.platforms),
            config.collection.clone(),
        )
        .with_scraper(scraper),
    );
    if config.collection.enabled {
        worker.spawn();
    } else {
        tracing::warn!("COLLECTION_ENABLED=false, collection worker not started");
    }

    // Cron jobs: cleanup, alerts, digest, influence refresh, daily content
    let mut scheduler = start_scheduler(deps.clone(), config.collection.retention_days)
        .await
        .context("Failed to start scheduler")?;

    let app = build_app(AppState::new(deps, worker.clone()), &config.allowed_origins);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    tracing::info!("Shutting down");
    worker.stop().await;
    if let Err(e) = scheduler.shutdown().await {
        tracing::warn!(error = %e, "Scheduler shutdown failed");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
