//! Pure shaping of aggregated rows.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::Serialize;

use super::queries::{BreakdownRow, CandidateActivityRow, HourlyRow, TierRow};
use crate::common::CandidateId;
use crate::domains::regions::{PriorityTier, Trend};

/// Iraq is UTC+3 all year.
const IRAQ_OFFSET_HOURS: i64 = 3;
const TREND_DELTA: f64 = 0.1;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn breakdown_map(rows: Vec<BreakdownRow>) -> BTreeMap<String, i64> {
    rows.into_iter().map(|r| (r.key, r.count)).collect()
}

/// Percentage growth from `previous` to `current`. A candidate with no
/// previous mentions counts as +100% once mentioned.
pub fn growth_percent(current: i64, previous: i64) -> f64 {
    if previous == 0 {
        return if current > 0 { 100.0 } else { 0.0 };
    }
    let growth = (current - previous) as f64 / previous as f64 * 100.0;
    (growth * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RisingCandidate {
    pub candidate_id: CandidateId,
    pub name: String,
    pub mentions_24h: i64,
    pub mentions_previous_24h: i64,
    pub growth_percent: f64,
}

/// Candidates whose mentions grew, fastest first.
pub fn rising_candidates(rows: Vec<CandidateActivityRow>, limit: usize) -> Vec<RisingCandidate> {
    let mut rising: Vec<RisingCandidate> = rows
        .into_iter()
        .map(|r| RisingCandidate {
            growth_percent: growth_percent(r.current, r.previous),
            candidate_id: r.candidate_id,
            name: r.name,
            mentions_24h: r.current,
            mentions_previous_24h: r.previous,
        })
        .filter(|r| r.growth_percent > 0.0)
        .collect();

    rising.sort_by(|a, b| {
        b.growth_percent
            .total_cmp(&a.growth_percent)
            .then_with(|| b.mentions_24h.cmp(&a.mentions_24h))
            .then_with(|| a.name.cmp(&b.name))
    });
    rising.truncate(limit);
    rising
}

/// Newer half of `scores` (newest first) against the older half.
pub fn half_trend(scores: &[f64]) -> Trend {
    if scores.len() < 2 {
        return Trend::Stable;
    }
    let mid = scores.len() / 2;
    let mean = |s: &[f64]| s.iter().sum::<f64>() / s.len() as f64;
    let delta = mean(&scores[..mid]) - mean(&scores[mid..]);
    if delta > TREND_DELTA {
        Trend::Up
    } else if delta < -TREND_DELTA {
        Trend::Down
    } else {
        Trend::Stable
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyBucket {
    /// Hour of day in Iraq time, e.g. "14:00".
    pub hour: String,
    pub starts_at: DateTime<Utc>,
    pub count: i64,
    pub avg_sentiment: f64,
}

/// 24 hourly buckets ending with the current hour, oldest first; empty hours are zero.
pub fn hourly_buckets(rows: &[HourlyRow], now: DateTime<Utc>) -> Vec<HourlyBucket> {
    let current_hour = now.duration_trunc(Duration::hours(1)).unwrap_or(now);

    (0..24)
        .rev()
        .map(|hours_ago| {
            let starts_at = current_hour - Duration::hours(hours_ago);
            let row = rows.iter().find(|r| r.hour == starts_at);
            HourlyBucket {
                hour: (starts_at + Duration::hours(IRAQ_OFFSET_HOURS)).format("%H:00").to_string(),
                starts_at,
                count: row.map_or(0, |r| r.count),
                avg_sentiment: round2(row.and_then(|r| r.avg_sentiment).unwrap_or(0.0)),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierReport {
    pub tier: PriorityTier,
    pub priority_order: i32,
    pub frequency: f64,
    pub total: i64,
    pub last_hour: i64,
    pub avg_likes: f64,
    pub kurdish_dialect: i64,
}

/// One report per tier in priority order, zero-filled.
pub fn tier_reports(rows: &[TierRow]) -> Vec<TierReport> {
    PriorityTier::all_in_order()
        .into_iter()
        .map(|tier| {
            let row = rows.iter().find(|r| r.priority_order == tier.priority_order());
            TierReport {
                tier,
                priority_order: tier.priority_order(),
                frequency: tier.frequency(),
                total: row.map_or(0, |r| r.total),
                last_hour: row.map_or(0, |r| r.last_hour),
                avg_likes: round2(row.and_then(|r| r.avg_likes).unwrap_or(0.0)),
                kurdish_dialect: row.map_or(0, |r| r.kurdish_dialect),
            }
        })
        .collect()
}
