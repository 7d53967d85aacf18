use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::{info, warn};

use super::Notifier;
use crate::domains::analytics::queries;
use crate::domains::candidates::Candidate;
use crate::domains::collection::{CollectionHealth, CollectionRun};

/// Below this share of successful runs in the last hour, collection is unhealthy.
pub const MIN_SUCCESS_RATE: f64 = 0.8;

pub fn trending_message(candidate: &Candidate) -> String {
    let name = candidate.name_en.as_deref().unwrap_or(&candidate.name_ar);
    format!(
        "HamlatAI: {} is trending in {} (influence {:.0}).",
        name, candidate.governorate, candidate.influence_score
    )
}

/// Alerts once per trending candidate; a candidate is alerted again after 24 hours.
pub async fn send_trending_alerts(pool: &PgPool, notifier: &dyn Notifier) -> Result<usize> {
    let candidates = Candidate::find_trending_unalerted(pool).await?;
    let mut alerted = 0;

    for candidate in &candidates {
        match notifier.notify(&trending_message(candidate)).await {
            Ok(_) => {
                Candidate::mark_alerted(candidate.id, pool).await?;
                alerted += 1;
            }
            Err(e) => warn!(candidate_id = %candidate.id, error = %e, "Trending alert failed"),
        }
    }

    if alerted > 0 {
        info!(count = alerted, "Trending alerts sent");
    }
    Ok(alerted)
}

#[derive(Debug, Clone)]
pub struct Digest {
    pub total: i64,
    pub kurdistan: i64,
    pub top_candidate: Option<(String, f64)>,
}

impl Digest {
    pub fn kurdistan_share(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.kurdistan as f64 / self.total as f64 * 1000.0).round() / 10.0
        }
    }

    pub fn message(&self) -> String {
        let top = match &self.top_candidate {
            Some((name, score)) => format!(" Top candidate: {} ({:.0}).", name, score),
            None => String::new(),
        };
        format!(
            "HamlatAI daily digest: {} mentions in 24h, {} from Kurdistan ({}%).{}",
            self.total,
            self.kurdistan,
            self.kurdistan_share(),
            top
        )
    }
}

pub async fn send_daily_digest(
    pool: &PgPool,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
) -> Result<Digest> {
    let totals = queries::totals(now - Duration::hours(24), now, pool).await?;
    let top = Candidate::top_by_influence(None, 1, pool).await?;

    let digest = Digest {
        total: totals.total,
        kurdistan: totals.kurdistan,
        top_candidate: top.into_iter().next().map(|c| {
            let name = c.name_en.clone().unwrap_or_else(|| c.name_ar.clone());
            (name, c.influence_score)
        }),
    };

    notifier.notify(&digest.message()).await?;
    info!(total = digest.total, kurdistan = digest.kurdistan, "Daily digest sent");
    Ok(digest)
}

/// `None` when the last hour of collection looks healthy.
pub fn health_alert(health: &CollectionHealth) -> Option<String> {
    if health.runs == 0 {
        return Some("HamlatAI: no collection run finished in the last hour.".to_string());
    }

    let rate = health.success_rate();
    if rate < MIN_SUCCESS_RATE {
        return Some(format!(
            "HamlatAI: collection success rate is {:.0}% over the last hour ({} of {} runs failed).",
            rate * 100.0,
            health.runs - health.successful,
            health.runs
        ));
    }

    None
}

/// Returns whether an alert was raised.
pub async fn check_collection_health(
    pool: &PgPool,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
) -> Result<bool> {
    let health = CollectionRun::health_since(now - Duration::hours(1), pool).await?;

    match health_alert(&health) {
        Some(message) => {
            warn!(runs = health.runs, successful = health.successful, "Collection unhealthy");
            notifier.notify(&message).await?;
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn health(runs: i64, successful: i64) -> CollectionHealth {
        CollectionHealth {
            runs,
            successful,
            errors: runs - successful,
            last_finished_at: None,
        }
    }

    #[test]
    fn silent_hour_is_unhealthy() {
        assert!(health_alert(&health(0, 0)).unwrap().contains("no collection run"));
    }

    #[test]
    fn success_rate_threshold() {
        assert!(health_alert(&health(10, 8)).is_none());
        let alert = health_alert(&health(10, 7)).unwrap();
        assert!(alert.contains("70%"));
        assert!(alert.contains("3 of 10"));
    }

    #[test]
    fn digest_message() {
        let digest = Digest {
            total: 200,
            kurdistan: 50,
            top_candidate: Some(("Shaswar Ali".into(), 86.4)),
        };
        assert_eq!(digest.kurdistan_share(), 25.0);
        let message = digest.message();
        assert!(message.contains("200 mentions"));
        assert!(message.contains("(25%)"));
        assert!(message.contains("Shaswar Ali (86)"));
    }

    #[test]
    fn empty_digest() {
        let digest = Digest {
            total: 0,
            kurdistan: 0,
            top_candidate: None,
        };
        assert_eq!(digest.kurdistan_share(), 0.0);
        assert!(!digest.message().contains("Top candidate"));
    }
}
