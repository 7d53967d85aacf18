use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{ContentId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Draft,
    /// Generated for a free-tier account; the body is withheld until upgrade.
    Locked,
    /// Waiting for `scheduled_for`.
    Scheduled,
    Published,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Locked => "locked",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
        }
    }
}

impl FromStr for ContentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "locked" => Ok(Self::Locked),
            "scheduled" => Ok(Self::Scheduled),
            "published" => Ok(Self::Published),
            other => anyhow::bail!("unknown content status: {}", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GeneratedContent {
    pub id: ContentId,
    pub user_id: UserId,
    pub topic: String,
    pub content_type: String,
    pub platform: String,
    pub dialect: String,
    pub body: String,
    pub hashtags: Vec<String>,
    pub status: String,
    pub provider: String,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Platform-wide content counts; `recent` counts rows created since the cut-off.
#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct ContentStats {
    pub total: i64,
    pub published: i64,
    pub scheduled: i64,
    pub recent: i64,
}

#[derive(Debug, Clone)]
pub struct NewGeneratedContent {
    pub user_id: UserId,
    pub topic: String,
    pub content_type: String,
    pub platform: String,
    pub dialect: String,
    pub body: String,
    pub hashtags: Vec<String>,
    pub status: ContentStatus,
    pub provider: String,
}

impl GeneratedContent {
    pub fn status(&self) -> ContentStatus {
        self.status.parse().unwrap_or(ContentStatus::Draft)
    }

    pub fn is_locked(&self) -> bool {
        self.status() == ContentStatus::Locked
    }

    /// Locked content keeps its topic and hashtags but not its body.
    pub fn redacted(mut self) -> Self {
        if self.is_locked() {
            self.body = String::new();
        }
        self
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

impl GeneratedContent {
    pub async fn insert(new: &NewGeneratedContent, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO generated_contents (
                id, user_id, topic, content_type, platform, dialect, body, hashtags, status, provider
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(ContentId::new())
        .bind(new.user_id)
        .bind(&new.topic)
        .bind(&new.content_type)
        .bind(&new.platform)
        .bind(&new.dialect)
        .bind(&new.body)
        .bind(&new.hashtags)
        .bind(new.status.as_str())
        .bind(&new.provider)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn list_for_user(
        user_id: UserId,
        limit: i64,
        offset: i64,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM generated_contents
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_for_user(id: ContentId, user_id: UserId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM generated_contents WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn schedule(id: ContentId, at: DateTime<Utc>, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE generated_contents
            SET status = 'scheduled', scheduled_for = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(at)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn mark_published(id: ContentId, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE generated_contents
            SET status = 'published', published_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Publishes scheduled content whose time has come. Returns how many changed.
    pub async fn publish_due(now: DateTime<Utc>, pool: &PgPool) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE generated_contents
            SET status = 'published', published_at = $1, updated_at = NOW()
            WHERE status = 'scheduled' AND scheduled_for <= $1
            "#,
        )
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Returns false when the user owns no such content.
    pub async fn delete_for_user(id: ContentId, user_id: UserId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM generated_contents WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn stats(since: DateTime<Utc>, pool: &PgPool) -> Result<ContentStats> {
        sqlx::query_as::<_, ContentStats>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'published') AS published,
                COUNT(*) FILTER (WHERE status = 'scheduled') AS scheduled,
                COUNT(*) FILTER (WHERE created_at >= $1) AS recent
            FROM generated_contents
            "#,
        )
        .bind(since)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Whether the user already received generated content since `since`.
    pub async fn exists_since(user_id: UserId, since: DateTime<Utc>, pool: &PgPool) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM generated_contents WHERE user_id = $1 AND created_at >= $2)",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
