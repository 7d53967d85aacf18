use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::common::CollectionRunId;

/// Statistics of one collection cycle.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CollectionRun {
    pub id: CollectionRunId,
    pub tier: String,
    pub trigger_kind: String, // 'scheduled' | 'manual' | 'startup'
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total_collected: i32,
    pub kurdistan_collected: i32,
    pub inserted: i32,
    pub updated: i32,
    pub rejected: i32,
    pub succeeded_collectors: i32,
    pub failed_collectors: i32,
    pub platform_counts: JsonValue, // { "facebook": 12, ... }
    pub errors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewCollectionRun {
    pub tier: String,
    pub trigger_kind: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total_collected: i32,
    pub kurdistan_collected: i32,
    pub inserted: i32,
    pub updated: i32,
    pub rejected: i32,
    pub succeeded_collectors: i32,
    pub failed_collectors: i32,
    pub platform_counts: JsonValue,
    pub errors: Vec<String>,
}

/// Collection health over a recent window. A run is successful unless all
/// of its collectors failed.
#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct CollectionHealth {
    pub runs: i64,
    pub successful: i64,
    pub errors: i64,
    pub last_finished_at: Option<DateTime<Utc>>,
}

impl CollectionHealth {
    /// Share of successful runs, 0 when nothing ran.
    pub fn success_rate(&self) -> f64 {
        if self.runs == 0 {
            0.0
        } else {
            self.successful as f64 / self.runs as f64
        }
    }
}

impl CollectionRun {
    pub async fn insert(run: &NewCollectionRun, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO collection_runs (
                id, tier, trigger_kind, started_at, finished_at, total_collected,
                kurdistan_collected, inserted, updated, rejected, succeeded_collectors,
                failed_collectors, platform_counts, errors
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(CollectionRunId::new())
        .bind(&run.tier)
        .bind(&run.trigger_kind)
        .bind(run.started_at)
        .bind(run.finished_at)
        .bind(run.total_collected)
        .bind(run.kurdistan_collected)
        .bind(run.inserted)
        .bind(run.updated)
        .bind(run.rejected)
        .bind(run.succeeded_collectors)
        .bind(run.failed_collectors)
        .bind(&run.platform_counts)
        .bind(&run.errors)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_recent(limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM collection_runs ORDER BY finished_at DESC LIMIT $1")
            .bind(limit)
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn health_since(since: DateTime<Utc>, pool: &PgPool) -> Result<CollectionHealth> {
        sqlx::query_as::<_, CollectionHealth>(
            r#"
            SELECT
                COUNT(*) AS runs,
                COUNT(*) FILTER (WHERE succeeded_collectors > 0 OR failed_collectors = 0) AS successful,
                COALESCE(SUM(cardinality(errors)), 0)::bigint AS errors,
                MAX(finished_at) AS last_finished_at
            FROM collection_runs
            WHERE finished_at >= $1
            "#,
        )
        .bind(since)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn delete_older_than(days: i32, pool: &PgPool) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM collection_runs WHERE finished_at < NOW() - make_interval(days => $1)",
        )
        .bind(days)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_handles_empty_window() {
        assert_eq!(CollectionHealth::default().success_rate(), 0.0);
        let health = CollectionHealth {
            runs: 5,
            successful: 4,
            ..Default::default()
        };
        assert!((health.success_rate() - 0.8).abs() < 1e-9);
    }
}
