//! Region-prioritised collection loop.

use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration as StdDuration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::collector::{CollectionTarget, Collector, HandleOwner, RawMention, SocialHandle};
use super::models::{CollectionRun, NewCollectionRun};
use super::pipeline::{process_mention, rescore_unanalyzed, CandidateMatcher, ProcessOutcome};
use super::scheduler::{RegionScheduler, TierStatus};
use super::scraper::WebScraper;
use crate::common::CandidateId;
use crate::config::CollectionSettings;
use crate::domains::auth::models::{SocialAccount, TenantHandle};
use crate::domains::candidates::{Candidate, CandidateSearch};
use crate::domains::mentions::Platform;
use crate::domains::regions::{Governorate, PriorityTier};

/// How often the loop asks the scheduler for due tiers.
pub const SCHEDULER_TICK: StdDuration = StdDuration::from_secs(30);

/// Candidates loaded per tier when looking up registered handles.
const MAX_TIER_CANDIDATES: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectKind {
    /// Platform APIs and web scraping.
    All,
    Api,
    Scraping,
    /// Everything, plus influence refresh and sentiment backfill.
    Comprehensive,
}

impl FromStr for CollectKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "api" => Ok(Self::Api),
            "scraping" => Ok(Self::Scraping),
            "comprehensive" => Ok(Self::Comprehensive),
            other => anyhow::bail!("unknown collection kind: {}", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Scheduled,
    Manual,
    Startup,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Manual => "manual",
            Self::Startup => "startup",
        }
    }
}

/// Real counts of one collection cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    pub tier: String,
    pub total_collected: usize,
    pub kurdistan_collected: usize,
    pub inserted: usize,
    pub updated: usize,
    pub rejected: usize,
    pub succeeded_collectors: usize,
    pub failed_collectors: usize,
    pub platform_counts: BTreeMap<String, usize>,
    pub errors: Vec<String>,
    pub candidates_refreshed: usize,
}

impl CycleReport {
    fn new(tier: &str) -> Self {
        Self {
            tier: tier.to_string(),
            ..Default::default()
        }
    }

    /// A cycle fails only when every collector failed.
    pub fn failed(&self) -> bool {
        self.failed_collectors > 0 && self.succeeded_collectors == 0
    }

    fn record_outcome(&mut self, outcome: &ProcessOutcome) {
        match outcome {
            ProcessOutcome::Inserted { .. } => self.inserted += 1,
            ProcessOutcome::Updated { .. } => self.updated += 1,
            ProcessOutcome::Rejected(_) => self.rejected += 1,
        }
        if outcome.is_kurdistan() {
            self.kurdistan_collected += 1;
        }
    }

    fn to_run(&self, trigger: Trigger, started_at: DateTime<Utc>) -> NewCollectionRun {
        NewCollectionRun {
            tier: self.tier.clone(),
            trigger_kind: trigger.as_str().to_string(),
            started_at,
            finished_at: Utc::now(),
            total_collected: self.total_collected as i32,
            kurdistan_collected: self.kurdistan_collected as i32,
            inserted: self.inserted as i32,
            updated: self.updated as i32,
            rejected: self.rejected as i32,
            succeeded_collectors: self.succeeded_collectors as i32,
            failed_collectors: self.failed_collectors as i32,
            platform_counts: serde_json::to_value(&self.platform_counts).unwrap_or_default(),
            errors: self.errors.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectNowReport {
    pub cycles: Vec<CycleReport>,
    pub articles_stored: Option<usize>,
    pub candidates_refreshed: Option<usize>,
    pub mentions_rescored: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkerStatus {
    pub running: bool,
    pub collectors: Vec<&'static str>,
    pub scraper_targets: usize,
    pub tiers: Vec<TierStatus>,
}

/// Platform handles registered on candidate profiles.
pub fn candidate_handles(candidates: &[Candidate]) -> Vec<SocialHandle> {
    const PLATFORMS: [Platform; 4] = [
        Platform::Facebook,
        Platform::Instagram,
        Platform::Youtube,
        Platform::Twitter,
    ];

    candidates
        .iter()
        .flat_map(|candidate| {
            PLATFORMS.iter().filter_map(move |platform| {
                candidate.social_handle(platform.as_str()).map(|handle| SocialHandle {
                    owner: HandleOwner::Candidate(candidate.id),
                    platform: *platform,
                    handle: handle.to_string(),
                    governorate: Governorate::parse(&candidate.governorate),
                })
            })
        })
        .collect()
}

/// Accounts tenants connected on their profiles. Only platforms with a
/// page reader are kept.
pub fn tenant_handles(accounts: Vec<TenantHandle>) -> Vec<SocialHandle> {
    accounts
        .into_iter()
        .filter_map(|account| {
            let platform = account.platform.parse::<Platform>().ok()?;
            (platform == Platform::Facebook).then(|| SocialHandle {
                owner: HandleOwner::Tenant(account.user_id),
                platform,
                handle: account.account_name,
                governorate: Governorate::parse(&account.governorate),
            })
        })
        .collect()
}

/// The background loop and the signal that ends it.
struct LoopHandle {
    task: JoinHandle<()>,
    shutdown: Arc<Notify>,
}

/// Runs collectors per priority tier and records what they found.
pub struct CollectionWorker {
    pool: PgPool,
    collectors: Vec<Arc<dyn Collector>>,
    scraper: Option<Arc<WebScraper>>,
    scheduler: Mutex<RegionScheduler>,
    settings: CollectionSettings,
    running: AtomicBool,
    background: StdMutex<Option<LoopHandle>>,
}

impl CollectionWorker {
    pub fn new(pool: PgPool, collectors: Vec<Arc<dyn Collector>>, settings: CollectionSettings) -> Self {
        Self {
            pool,
            collectors,
            scraper: None,
            scheduler: Mutex::new(RegionScheduler::new()),
            settings,
            running: AtomicBool::new(false),
            background: StdMutex::new(None),
        }
    }

    pub fn with_scraper(mut self, scraper: WebScraper) -> Self {
        self.scraper = Some(Arc::new(scraper));
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn build_target(&self, tier: PriorityTier) -> Result<CollectionTarget> {
        let mut candidates = Vec::new();
        for governorate in tier.governorates() {
            let search = CandidateSearch {
                governorate: Some(governorate.as_str().to_string()),
                limit: Some(MAX_TIER_CANDIDATES),
                ..Default::default()
            };
            candidates.extend(Candidate::search(&search, &self.pool).await?);
        }
        let mut handles = candidate_handles(&candidates);

        let governorates: Vec<String> = tier
            .governorates()
            .iter()
            .map(|g| g.as_str().to_string())
            .collect();
        let accounts = SocialAccount::connected_in(&governorates, &self.pool).await?;
        handles.extend(tenant_handles(accounts));

        Ok(CollectionTarget::for_tier(tier).with_handles(handles))
    }

    async fn run_collector(
        &self,
        collector: &Arc<dyn Collector>,
        target: &CollectionTarget,
    ) -> (&'static str, std::result::Result<Vec<RawMention>, String>) {
        let name = collector.name();
        let timeout = StdDuration::from_secs(self.settings.collector_timeout_secs);
        let result = match tokio::time::timeout(timeout, collector.collect(target)).await {
            Ok(Ok(raws)) => Ok(raws),
            Ok(Err(e)) => Err(format!("{}: {}", name, e)),
            Err(_) => Err(format!("{}: timed out after {}s", name, timeout.as_secs())),
        };
        (name, result)
    }

    /// One collection cycle for a tier: every collector concurrently
    /// (bounded), then classification, storage and influence refresh.
    pub async fn run_tier(&self, tier: PriorityTier, trigger: Trigger) -> Result<CycleReport> {
        let started_at = Utc::now();
        let target = self.build_target(tier).await?;
        let matcher = CandidateMatcher::load(&self.pool).await?;

        let runs: Vec<_> = self
            .collectors
            .iter()
            .map(|collector| self.run_collector(collector, &target))
            .collect();
        let results: Vec<_> = stream::iter(runs)
            .buffer_unordered(self.settings.max_concurrency.max(1))
            .collect()
            .await;

        let mut report = CycleReport::new(tier.as_str());
        let mut touched: HashSet<CandidateId> = HashSet::new();

        for (name, result) in results {
            let raws = match result {
                Ok(raws) => {
                    report.succeeded_collectors += 1;
                    raws
                }
                Err(message) => {
                    warn!(tier = %tier, collector = name, error = %message, "Collector failed");
                    report.failed_collectors += 1;
                    report.errors.push(message);
                    continue;
                }
            };

            for raw in raws {
                report.total_collected += 1;
                *report.platform_counts.entry(raw.platform.to_string()).or_default() += 1;

                match process_mention(&raw, &target, &matcher, &self.pool).await {
                    Ok(outcome) => {
                        touched.extend(outcome.candidates().iter().copied());
                        report.record_outcome(&outcome);
                    }
                    Err(e) => {
                        error!(tier = %tier, collector = name, error = %e, "Failed to store mention");
                        report.rejected += 1;
                        report.errors.push(format!("{}: store failed: {}", name, e));
                    }
                }
            }
        }

        for candidate_id in &touched {
            match Candidate::refresh_influence(*candidate_id, &self.pool).await {
                Ok(_) => report.candidates_refreshed += 1,
                Err(e) => warn!(candidate_id = %candidate_id, error = %e, "Influence refresh failed"),
            }
        }

        CollectionRun::insert(&report.to_run(trigger, started_at), &self.pool).await?;

        {
            let mut scheduler = self.scheduler.lock().await;
            if report.failed() {
                scheduler.record_failure(tier, Utc::now());
            } else {
                scheduler.record_success(tier, Utc::now());
            }
        }

        info!(
            tier = %tier,
            trigger = trigger.as_str(),
            collected = report.total_collected,
            kurdistan = report.kurdistan_collected,
            inserted = report.inserted,
            updated = report.updated,
            rejected = report.rejected,
            failed_collectors = report.failed_collectors,
            "Collection cycle complete"
        );

        Ok(report)
    }

    /// Runs every due tier in priority order.
    pub async fn run_due(&self, now: DateTime<Utc>, trigger: Trigger) -> Vec<CycleReport> {
        let due = self.scheduler.lock().await.due(now);
        if due.is_empty() {
            debug!("No tiers due");
            return Vec::new();
        }

        let mut reports = Vec::with_capacity(due.len());
        for item in due {
            debug!(tier = %item.tier, reason = ?item.reason, "Tier due");
            match self.run_tier(item.tier, trigger).await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    error!(tier = %item.tier, error = %e, "Collection cycle failed");
                    self.scheduler.lock().await.record_failure(item.tier, Utc::now());
                }
            }
        }
        reports
    }

    /// Runs the web scraper and records it as a cycle.
    pub async fn run_scraper(&self, trigger: Trigger) -> Result<usize> {
        let Some(scraper) = &self.scraper else {
            return Ok(0);
        };
        let started_at = Utc::now();
        let stored = scraper.scrape_all(&self.pool).await?;

        let mut report = CycleReport::new("web");
        report.total_collected = stored;
        report.inserted = stored;
        report.succeeded_collectors = 1;
        report.platform_counts.insert(Platform::News.to_string(), stored);
        CollectionRun::insert(&report.to_run(trigger, started_at), &self.pool).await?;

        Ok(stored)
    }

    /// Manual trigger. Tiers run regardless of the schedule.
    pub async fn collect_now(&self, kind: CollectKind) -> Result<CollectNowReport> {
        let mut report = CollectNowReport::default();

        if matches!(kind, CollectKind::All | CollectKind::Api | CollectKind::Comprehensive) {
            for tier in PriorityTier::all_in_order() {
                match self.run_tier(tier, Trigger::Manual).await {
                    Ok(cycle) => report.cycles.push(cycle),
                    Err(e) => error!(tier = %tier, error = %e, "Manual collection failed"),
                }
            }
        }

        if matches!(kind, CollectKind::All | CollectKind::Scraping | CollectKind::Comprehensive) {
            report.articles_stored = Some(self.run_scraper(Trigger::Manual).await?);
        }

        if kind == CollectKind::Comprehensive {
            report.candidates_refreshed = Some(Candidate::refresh_recent(24 * 7, &self.pool).await?);
            report.mentions_rescored = Some(rescore_unanalyzed(7, 1000, &self.pool).await?);
        }

        Ok(report)
    }

    /// Starts the background loop. Returns false when a loop is already
    /// running or still stopping.
    pub fn spawn(self: &Arc<Self>) -> bool {
        let mut background = self.background.lock().unwrap_or_else(PoisonError::into_inner);
        if background.is_some() || self.running.load(Ordering::SeqCst) {
            warn!("Collection worker already running");
            return false;
        }
        self.running.store(true, Ordering::SeqCst);

        let shutdown = Arc::new(Notify::new());
        let worker = Arc::clone(self);
        let signal = Arc::clone(&shutdown);
        let task = tokio::spawn(async move {
            info!(
                collectors = worker.collectors.len(),
                tick_secs = SCHEDULER_TICK.as_secs(),
                "Collection worker started"
            );

            // Every tier is due on the first pass.
            worker.run_due(Utc::now(), Trigger::Startup).await;

            let mut ticker = tokio::time::interval(SCHEDULER_TICK);
            ticker.tick().await;
            loop {
                tokio::select! {
                    biased;
                    _ = signal.notified() => break,
                    _ = ticker.tick() => {
                        worker.run_due(Utc::now(), Trigger::Scheduled).await;
                    }
                }
            }

            info!("Collection worker stopped");
        });

        *background = Some(LoopHandle { task, shutdown });
        true
    }

    /// Signals the loop and waits for the cycle in flight to finish.
    pub async fn stop(&self) {
        let handle = self
            .background
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(handle) = handle else {
            return;
        };

        // notify_one keeps the permit when the loop is mid-cycle.
        handle.shutdown.notify_one();
        if let Err(e) = handle.task.await {
            error!(error = %e, "Collection worker task failed");
        }
        self.running.store(false, Ordering::SeqCst);
    }

    pub async fn status(&self) -> WorkerStatus {
        WorkerStatus {
            running: self.is_running(),
            collectors: self.collectors.iter().map(|c| c.name()).collect(),
            scraper_targets: self.scraper.as_ref().map_or(0, |s| s.target_count()),
            tiers: self.scheduler.lock().await.snapshot(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_collect_kinds() {
        assert_eq!("API".parse::<CollectKind>().unwrap(), CollectKind::Api);
        assert_eq!(
            "comprehensive".parse::<CollectKind>().unwrap(),
            CollectKind::Comprehensive
        );
        assert!("everything".parse::<CollectKind>().is_err());
    }

    #[test]
    fn cycle_fails_only_when_all_collectors_fail() {
        let mut report = CycleReport::new("erbil");
        assert!(!report.failed());
        report.failed_collectors = 2;
        assert!(report.failed());
        report.succeeded_collectors = 1;
        assert!(!report.failed());
    }

    #[test]
    fn handles_come_from_social_media_json() {
        let now = Utc::now();
        let candidate = Candidate {
            id: CandidateId::new(),
            name_ar: "هيرو".into(),
            name_en: None,
            name_sorani: None,
            name_badini: None,
            name_kurmanji: None,
            party: None,
            governorate: "sulaymaniyah".into(),
            position: None,
            region_type: "kurdistan".into(),
            priority_order: 1,
            languages: vec![],
            social_media: json!({ "facebook": "hero.page", "twitter": " ", "tiktok": "x" }),
            contact: json!({}),
            influence_score: 0.0,
            follower_count: 0,
            engagement_rate: 0.0,
            sentiment_score: 0.0,
            data_quality: 0.0,
            last_trending_alert_at: None,
            last_updated: None,
            created_at: now,
            updated_at: now,
        };

        let handles = candidate_handles(&[candidate]);
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].platform, Platform::Facebook);
        assert_eq!(handles[0].handle, "hero.page");
        assert_eq!(
            handles[0].governorate,
            Some(Governorate::Sulaymaniyah)
        );
    }

    #[test]
    fn tenant_facebook_pages_become_private_handles() {
        let tenant = crate::common::UserId::new();
        let account = |platform: &str, name: &str| TenantHandle {
            user_id: tenant,
            platform: platform.into(),
            account_name: name.into(),
            governorate: "erbil".into(),
        };

        let handles = tenant_handles(vec![
            account("facebook", "my.page"),
            account("instagram", "my.photos"),
            account("myspace", "old"),
        ]);
        assert_eq!(
            handles,
            vec![SocialHandle {
                owner: HandleOwner::Tenant(tenant),
                platform: Platform::Facebook,
                handle: "my.page".into(),
                governorate: Some(Governorate::Erbil),
            }]
        );
    }
}
