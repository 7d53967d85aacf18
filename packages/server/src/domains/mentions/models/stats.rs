use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use super::mention::Mention;
use crate::common::UserId;

/// Minimum mentions before an author or repeated post is reported.
pub const MIN_OCCURRENCES: i64 = 3;

/// Collection status per platform.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PlatformStats {
    pub platform: String,
    pub total: i64,
    pub last_24h: i64,
    pub last_7d: i64,
    pub last_detected_at: Option<DateTime<Utc>>,
}

impl Mention {
    pub async fn platform_stats(pool: &PgPool) -> Result<Vec<PlatformStats>> {
        sqlx::query_as::<_, PlatformStats>(
            r#"
            SELECT platform,
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE detected_at > NOW() - INTERVAL '24 hours') AS last_24h,
                COUNT(*) FILTER (WHERE detected_at > NOW() - INTERVAL '7 days') AS last_7d,
                MAX(detected_at) AS last_detected_at
            FROM mentions
            GROUP BY platform
            ORDER BY total DESC
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}

/// Authors with repeated mentions (influential voices).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuthorStats {
    pub author_name: String,
    pub author_handle: Option<String>,
    pub platform: String,
    pub mention_count: i64,
    pub avg_sentiment: f64,
    pub total_engagement: i64,
    pub last_seen_at: DateTime<Utc>,
}

impl Mention {
    pub async fn top_authors(
        user_id: Option<UserId>,
        limit: i64,
        pool: &PgPool,
    ) -> Result<Vec<AuthorStats>> {
        sqlx::query_as::<_, AuthorStats>(
            r#"
            SELECT author_name,
                MAX(author_handle) AS author_handle,
                platform,
                COUNT(*) AS mention_count,
                AVG(sentiment_score)::float8 AS avg_sentiment,
                SUM(likes + comments + shares)::bigint AS total_engagement,
                MAX(detected_at) AS last_seen_at
            FROM mentions
            WHERE author_name IS NOT NULL
              AND ($1::uuid IS NULL OR user_id IS NULL OR user_id = $1)
            GROUP BY author_name, platform
            HAVING COUNT(*) >= $2
            ORDER BY mention_count DESC, total_engagement DESC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(MIN_OCCURRENCES)
        .bind(limit.clamp(1, 100))
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}

/// Identical content seen repeatedly within a window (coordinated posting, viral text).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RepeatedContent {
    pub content_hash: String,
    pub sample: String,
    pub occurrences: i64,
    pub platforms: Vec<String>,
    pub avg_sentiment: f64,
    pub last_seen_at: DateTime<Utc>,
}

impl Mention {
    pub async fn repeated_content(
        hours: i32,
        user_id: Option<UserId>,
        pool: &PgPool,
    ) -> Result<Vec<RepeatedContent>> {
        sqlx::query_as::<_, RepeatedContent>(
            r#"
            SELECT content_hash,
                MIN(content) AS sample,
                COUNT(*) AS occurrences,
                ARRAY_AGG(DISTINCT platform) AS platforms,
                AVG(sentiment_score)::float8 AS avg_sentiment,
                MAX(detected_at) AS last_seen_at
            FROM mentions
            WHERE detected_at > NOW() - make_interval(hours => $1)
              AND ($2::uuid IS NULL OR user_id IS NULL OR user_id = $2)
            GROUP BY content_hash
            HAVING COUNT(*) >= $3
            ORDER BY occurrences DESC
            LIMIT 20
            "#,
        )
        .bind(hours.clamp(1, 24 * 30))
        .bind(user_id)
        .bind(MIN_OCCURRENCES)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
