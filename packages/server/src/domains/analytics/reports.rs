use std::collections::BTreeMap;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;

use super::metrics::{
    breakdown_map, half_trend, hourly_buckets, rising_candidates, round2, tier_reports, HourlyBucket,
    RisingCandidate, TierReport,
};
use super::queries::{self, Dimension};
use crate::common::CandidateId;
use crate::domains::candidates::Candidate;
use crate::domains::collection::{CollectionHealth, CollectionRun};
use crate::domains::mentions::Mention;
use crate::domains::regions::{regional_trends, Governorate, PriorityTier, RegionalTrends, Trend};

const TOP_CANDIDATES: i64 = 10;
const RISING_CANDIDATES: usize = 5;
const TREND_SAMPLE: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Period {
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl Period {
    pub fn duration(&self) -> Duration {
        match self {
            Self::Day => Duration::hours(24),
            Self::Week => Duration::days(7),
            Self::Month => Duration::days(30),
        }
    }
}

impl FromStr for Period {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "24h" => Ok(Self::Day),
            "7d" => Ok(Self::Week),
            "30d" => Ok(Self::Month),
            other => Err(anyhow!("unknown period: {} (expected 24h, 7d or 30d)", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateSummary {
    pub id: CandidateId,
    pub name: String,
    pub governorate: String,
    pub influence_score: f64,
    pub sentiment_score: f64,
    pub is_trending: bool,
}

impl From<&Candidate> for CandidateSummary {
    fn from(c: &Candidate) -> Self {
        Self {
            id: c.id,
            name: c.name_en.clone().unwrap_or_else(|| c.name_ar.clone()),
            governorate: c.governorate.clone(),
            influence_score: c.influence_score,
            sentiment_score: c.sentiment_score,
            is_trending: c.is_trending(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseHealth {
    pub healthy: bool,
    pub pool_size: u32,
    pub idle_connections: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionHealthReport {
    pub runs_last_hour: i64,
    pub success_rate: f64,
    pub errors: i64,
    pub last_update: Option<DateTime<Utc>>,
}

impl From<CollectionHealth> for CollectionHealthReport {
    fn from(h: CollectionHealth) -> Self {
        Self {
            runs_last_hour: h.runs,
            success_rate: round2(h.success_rate()),
            errors: h.errors,
            last_update: h.last_finished_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub total_mentions_24h: i64,
    pub kurdistan_mentions_24h: i64,
    pub mentions_last_5_min: i64,
    pub dialects: BTreeMap<String, i64>,
    pub governorates: BTreeMap<String, i64>,
    pub platforms: BTreeMap<String, i64>,
    pub top_candidates: Vec<CandidateSummary>,
    pub rising_candidates: Vec<RisingCandidate>,
    pub average_sentiment: f64,
    pub sentiment_trend: Trend,
    pub collection: CollectionHealthReport,
    pub database: DatabaseHealth,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KurdistanAnalytics {
    pub total_mentions_24h: i64,
    pub dialects: BTreeMap<String, i64>,
    pub governorates: BTreeMap<String, i64>,
    pub sentiment: BTreeMap<String, i64>,
    pub top_candidates: Vec<CandidateSummary>,
    pub hourly: Vec<HourlyBucket>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriorityAnalytics {
    pub period: Period,
    pub tiers: Vec<TierReport>,
    pub kurdistan_dialects: BTreeMap<String, i64>,
    pub generated_at: DateTime<Utc>,
}

async fn database_health(pool: &PgPool) -> DatabaseHealth {
    let healthy = sqlx::query("SELECT 1").execute(pool).await.is_ok();
    DatabaseHealth {
        healthy,
        pool_size: pool.size(),
        idle_connections: pool.num_idle(),
    }
}

fn kurdistan_governorates() -> Vec<String> {
    Governorate::ALL
        .into_iter()
        .filter(|g| g.is_kurdistan())
        .map(|g| g.as_str().to_string())
        .collect()
}

pub async fn dashboard(pool: &PgPool, now: DateTime<Utc>) -> Result<DashboardMetrics> {
    let since = now - Duration::hours(24);

    let totals = queries::totals(since, now, pool).await?;
    let dialects = queries::breakdown(Dimension::Dialect, since, false, pool).await?;
    let governorates = queries::breakdown(Dimension::Governorate, since, false, pool).await?;
    let platforms = queries::breakdown(Dimension::Platform, since, false, pool).await?;
    let top = Candidate::top_by_influence(None, TOP_CANDIDATES, pool).await?;
    let activity = queries::candidate_activity(now, pool).await?;
    let scores = queries::sentiment_scores(since, TREND_SAMPLE, pool).await?;
    let health = CollectionRun::health_since(now - Duration::hours(1), pool).await?;

    Ok(DashboardMetrics {
        total_mentions_24h: totals.total,
        kurdistan_mentions_24h: totals.kurdistan,
        mentions_last_5_min: totals.last_5_min,
        dialects: breakdown_map(dialects),
        governorates: breakdown_map(governorates),
        platforms: breakdown_map(platforms),
        top_candidates: top.iter().map(CandidateSummary::from).collect(),
        rising_candidates: rising_candidates(activity, RISING_CANDIDATES),
        average_sentiment: round2(totals.avg_sentiment.unwrap_or(0.0)),
        sentiment_trend: half_trend(&scores),
        collection: health.into(),
        database: database_health(pool).await,
        generated_at: now,
    })
}

pub async fn kurdistan(pool: &PgPool, now: DateTime<Utc>) -> Result<KurdistanAnalytics> {
    let since = now - Duration::hours(24);
    let governorate_keys = kurdistan_governorates();

    let totals = queries::totals(since, now, pool).await?;
    let dialects = queries::breakdown(Dimension::Dialect, since, true, pool).await?;
    let governorates = queries::breakdown(Dimension::Governorate, since, true, pool).await?;
    let sentiment = queries::breakdown(Dimension::Sentiment, since, true, pool).await?;
    let top = Candidate::top_by_influence(Some(&governorate_keys), TOP_CANDIDATES, pool).await?;
    let hourly = queries::kurdistan_hourly(now - Duration::hours(24), pool).await?;

    Ok(KurdistanAnalytics {
        total_mentions_24h: totals.kurdistan,
        dialects: breakdown_map(dialects),
        governorates: breakdown_map(governorates),
        sentiment: breakdown_map(sentiment),
        top_candidates: top.iter().map(CandidateSummary::from).collect(),
        hourly: hourly_buckets(&hourly, now),
        generated_at: now,
    })
}

pub async fn priority(period: Period, pool: &PgPool, now: DateTime<Utc>) -> Result<PriorityAnalytics> {
    let since = now - period.duration();
    let tiers = queries::tier_activity(since, now, pool).await?;
    let dialects = queries::breakdown(Dimension::Dialect, since, true, pool).await?;

    Ok(PriorityAnalytics {
        period,
        tiers: tier_reports(&tiers),
        kurdistan_dialects: breakdown_map(dialects),
        generated_at: now,
    })
}

/// Governorates a region name refers to: one governorate, or every
/// governorate of a priority tier.
pub fn resolve_region(region: &str) -> Option<Vec<Governorate>> {
    if let Some(governorate) = Governorate::parse(region) {
        return Some(vec![governorate]);
    }
    region.parse::<PriorityTier>().ok().map(|tier| tier.governorates())
}

pub async fn region_trends(region: &str, pool: &PgPool, now: DateTime<Utc>) -> Result<Option<RegionalTrends>> {
    let Some(governorates) = resolve_region(region) else {
        return Ok(None);
    };
    let keys: Vec<String> = governorates.iter().map(|g| g.as_str().to_string()).collect();

    let mentions = Mention::find_recent(now - Duration::hours(24), Some(&keys), 100, pool).await?;
    let candidates = Candidate::top_by_influence(Some(&keys), 5, pool).await?;

    Ok(Some(regional_trends(region, &mentions, &candidates, now)))
}
