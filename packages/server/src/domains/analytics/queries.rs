//! Aggregation queries over mentions. Shaping happens in pure functions
//! elsewhere in this module.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::CandidateId;

/// Mention columns that can be grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Dialect,
    Governorate,
    Platform,
    Sentiment,
}

impl Dimension {
    fn column(&self) -> &'static str {
        match self {
            Self::Dialect => "dialect",
            Self::Governorate => "governorate",
            Self::Platform => "platform",
            Self::Sentiment => "sentiment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct BreakdownRow {
    pub key: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct MentionTotals {
    pub total: i64,
    pub kurdistan: i64,
    pub last_5_min: i64,
    pub avg_sentiment: Option<f64>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CandidateActivityRow {
    pub candidate_id: CandidateId,
    pub name: String,
    pub current: i64,
    pub previous: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HourlyRow {
    pub hour: DateTime<Utc>,
    pub count: i64,
    pub avg_sentiment: Option<f64>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TierRow {
    pub priority_order: i32,
    pub total: i64,
    pub last_hour: i64,
    pub avg_likes: Option<f64>,
    pub kurdish_dialect: i64,
}

pub async fn breakdown(
    dimension: Dimension,
    since: DateTime<Utc>,
    kurdistan_only: bool,
    pool: &PgPool,
) -> Result<Vec<BreakdownRow>> {
    let sql = format!(
        r#"
        SELECT COALESCE({col}, 'unknown') AS key, COUNT(*) AS count
        FROM mentions
        WHERE detected_at >= $1 AND (NOT $2 OR is_kurdistan)
        GROUP BY 1
        ORDER BY count DESC, key
        "#,
        col = dimension.column()
    );
    sqlx::query_as::<_, BreakdownRow>(&sql)
        .bind(since)
        .bind(kurdistan_only)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
}

pub async fn totals(since: DateTime<Utc>, now: DateTime<Utc>, pool: &PgPool) -> Result<MentionTotals> {
    sqlx::query_as::<_, MentionTotals>(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE is_kurdistan) AS kurdistan,
            COUNT(*) FILTER (WHERE detected_at >= $2 - INTERVAL '5 minutes') AS last_5_min,
            AVG(sentiment_score)::float8 AS avg_sentiment
        FROM mentions
        WHERE detected_at >= $1
        "#,
    )
    .bind(since)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

/// Sentiment scores since `since`, newest first.
pub async fn sentiment_scores(since: DateTime<Utc>, limit: i64, pool: &PgPool) -> Result<Vec<f64>> {
    let rows: Vec<(f64,)> = sqlx::query_as(
        r#"
        SELECT sentiment_score FROM mentions
        WHERE detected_at >= $1
        ORDER BY detected_at DESC
        LIMIT $2
        "#,
    )
    .bind(since)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(s,)| s).collect())
}

/// Per-candidate mention counts for the last 24 hours and the 24 before.
pub async fn candidate_activity(now: DateTime<Utc>, pool: &PgPool) -> Result<Vec<CandidateActivityRow>> {
    sqlx::query_as::<_, CandidateActivityRow>(
        r#"
        SELECT c.id AS candidate_id,
            COALESCE(c.name_en, c.name_ar) AS name,
            COUNT(*) FILTER (WHERE m.detected_at >= $1 - INTERVAL '24 hours') AS current,
            COUNT(*) FILTER (WHERE m.detected_at < $1 - INTERVAL '24 hours') AS previous
        FROM candidates c
        JOIN mention_candidates mc ON mc.candidate_id = c.id
        JOIN mentions m ON m.id = mc.mention_id
        WHERE m.detected_at >= $1 - INTERVAL '48 hours'
        GROUP BY c.id, c.name_en, c.name_ar
        "#,
    )
    .bind(now)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

pub async fn kurdistan_hourly(since: DateTime<Utc>, pool: &PgPool) -> Result<Vec<HourlyRow>> {
    sqlx::query_as::<_, HourlyRow>(
        r#"
        SELECT date_trunc('hour', detected_at) AS hour,
            COUNT(*) AS count,
            AVG(sentiment_score)::float8 AS avg_sentiment
        FROM mentions
        WHERE is_kurdistan AND detected_at >= $1
        GROUP BY 1
        ORDER BY 1
        "#,
    )
    .bind(since)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

pub async fn tier_activity(since: DateTime<Utc>, now: DateTime<Utc>, pool: &PgPool) -> Result<Vec<TierRow>> {
    sqlx::query_as::<_, TierRow>(
        r#"
        SELECT priority_order,
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE detected_at >= $2 - INTERVAL '1 hour') AS last_hour,
            AVG(likes)::float8 AS avg_likes,
            COUNT(*) FILTER (WHERE dialect IN ('sorani', 'badini', 'kurmanji')) AS kurdish_dialect
        FROM mentions
        WHERE detected_at >= $1
        GROUP BY priority_order
        "#,
    )
    .bind(since)
    .bind(now)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}
