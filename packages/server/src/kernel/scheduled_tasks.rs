//! Wall-clock jobs on tokio-cron-scheduler. Times are UTC; Iraq is UTC+3.
//!
//! ```text
//! 02:00        cleanup (mentions, articles, runs past retention; expired trials)
//! 05:00        daily digest, daily content
//! */15 min     trending alerts
//! */30 min     collection health check
//! */30 min     influence refresh + sentiment backfill
//! */5 min      scheduled content publishing
//! ```
//!
//! Region collection itself is driven by the CollectionWorker loop, not cron.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::auth::User;
use crate::domains::candidates::Candidate;
use crate::domains::collection::{rescore_unanalyzed, CollectionRun, ScrapedArticle};
use crate::domains::content::{generate_daily_content, GeneratedContent};
use crate::domains::mentions::Mention;
use crate::domains::notifications::{
    check_collection_health, send_daily_digest, send_trending_alerts,
};
use crate::kernel::ServerDeps;

pub const CLEANUP_SCHEDULE: &str = "0 0 2 * * *";
pub const DIGEST_SCHEDULE: &str = "0 0 5 * * *";
pub const DAILY_CONTENT_SCHEDULE: &str = "0 0 5 * * *";
pub const TRENDING_SCHEDULE: &str = "0 */15 * * * *";
pub const HEALTH_SCHEDULE: &str = "0 */30 * * * *";
pub const REFRESH_SCHEDULE: &str = "0 */30 * * * *";
pub const PUBLISH_SCHEDULE: &str = "0 */5 * * * *";

const REFRESH_WINDOW_HOURS: i32 = 24;
const RESCORE_DAYS: i64 = 1;
const RESCORE_LIMIT: i64 = 500;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CleanupReport {
    pub mentions: u64,
    pub articles: u64,
    pub runs: u64,
    pub expired_trials: u64,
}

fn add_job<F, Fut>(
    schedule: &'static str,
    name: &'static str,
    deps: Arc<ServerDeps>,
    task: F,
) -> Result<Job>
where
    F: Fn(Arc<ServerDeps>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let task = Arc::new(task);
    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let deps = deps.clone();
        let task = task.clone();
        Box::pin(async move {
            tracing::debug!(task = name, "Scheduled task starting");
            if let Err(e) = task(deps).await {
                tracing::error!(task = name, error = %e, "Scheduled task failed");
            }
        })
    })?;
    Ok(job)
}

/// Start all scheduled tasks
pub async fn start_scheduler(deps: Arc<ServerDeps>, retention_days: i32) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    scheduler
        .add(add_job(CLEANUP_SCHEDULE, "cleanup", deps.clone(), move |deps| async move {
            run_cleanup(&deps.db_pool, retention_days).await.map(|_| ())
        })?)
        .await?;

    scheduler
        .add(add_job(DIGEST_SCHEDULE, "daily_digest", deps.clone(), |deps| async move {
            send_daily_digest(&deps.db_pool, deps.notifier.as_ref(), Utc::now())
                .await
                .map(|_| ())
        })?)
        .await?;

    scheduler
        .add(add_job(DAILY_CONTENT_SCHEDULE, "daily_content", deps.clone(), |deps| async move {
            generate_daily_content(&deps, Utc::now()).await.map(|_| ())
        })?)
        .await?;

    scheduler
        .add(add_job(TRENDING_SCHEDULE, "trending_alerts", deps.clone(), |deps| async move {
            send_trending_alerts(&deps.db_pool, deps.notifier.as_ref())
                .await
                .map(|_| ())
        })?)
        .await?;

    scheduler
        .add(add_job(HEALTH_SCHEDULE, "collection_health", deps.clone(), |deps| async move {
            check_collection_health(&deps.db_pool, deps.notifier.as_ref(), Utc::now())
                .await
                .map(|_| ())
        })?)
        .await?;

    scheduler
        .add(add_job(REFRESH_SCHEDULE, "influence_refresh", deps.clone(), |deps| async move {
            run_refresh(&deps).await
        })?)
        .await?;

    scheduler
        .add(add_job(PUBLISH_SCHEDULE, "publish_scheduled", deps.clone(), |deps| async move {
            run_publish(&deps.db_pool).await.map(|_| ())
        })?)
        .await?;

    scheduler.start().await?;

    tracing::info!("Scheduled tasks started");
    Ok(scheduler)
}

/// Deletes rows past retention and closes elapsed trials.
pub async fn run_cleanup(pool: &PgPool, retention_days: i32) -> Result<CleanupReport> {
    let report = CleanupReport {
        mentions: Mention::delete_older_than(retention_days, pool).await?,
        articles: ScrapedArticle::delete_older_than(retention_days, pool).await?,
        runs: CollectionRun::delete_older_than(retention_days, pool).await?,
        expired_trials: User::expire_trials(Utc::now(), pool).await?,
    };

    tracing::info!(
        retention_days,
        mentions = report.mentions,
        articles = report.articles,
        runs = report.runs,
        expired_trials = report.expired_trials,
        "Cleanup complete"
    );
    Ok(report)
}

async fn run_refresh(deps: &ServerDeps) -> Result<()> {
    let refreshed = Candidate::refresh_recent(REFRESH_WINDOW_HOURS, &deps.db_pool).await?;
    let rescored = rescore_unanalyzed(RESCORE_DAYS, RESCORE_LIMIT, &deps.db_pool).await?;
    tracing::info!(refreshed, rescored, "Influence and sentiment refreshed");
    Ok(())
}

/// Marks scheduled content whose time has passed as published.
pub async fn run_publish(pool: &PgPool) -> Result<u64> {
    let published = GeneratedContent::publish_due(Utc::now(), pool).await?;
    if published > 0 {
        tracing::info!(published, "Scheduled content published");
    }
    Ok(published)
}
