use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use typed_builder::TypedBuilder;

use super::filter::MentionFilter;
use crate::common::{generate_content_hash, CandidateId, MentionId, Page, UserId};
use crate::domains::language::{Detection, Dialect, Sentiment, SentimentAnalysis};
use crate::domains::regions::Governorate;

/// Priority order stored for mentions without a known governorate.
const UNKNOWN_PRIORITY_ORDER: i32 = 7;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Mention {
    pub id: MentionId,
    pub user_id: Option<UserId>,
    pub platform: String,
    pub content: String,
    pub author_name: Option<String>,
    pub author_handle: Option<String>,
    pub post_id: Option<String>,
    pub post_url: Option<String>,
    pub media_url: Option<String>,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub views: i64,
    pub sentiment: String,
    pub sentiment_score: f64,
    pub dialect: Option<String>,
    pub dialect_confidence: f64,
    pub governorate: Option<String>,
    pub is_kurdistan: bool,
    pub priority_order: i32,
    pub topics: Vec<String>,
    pub content_hash: String,
    /// Per-tenant read state; only populated by tenant-scoped queries.
    #[sqlx(default)]
    pub is_read: bool,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub detected_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload. Kurdistan flag, priority order and content hash are
/// derived on insert.
#[derive(Debug, Clone, TypedBuilder)]
pub struct NewMention {
    #[builder(setter(into))]
    pub platform: String,
    #[builder(setter(into))]
    pub content: String,
    #[builder(default)]
    pub user_id: Option<UserId>,
    #[builder(default)]
    pub author_name: Option<String>,
    #[builder(default)]
    pub author_handle: Option<String>,
    #[builder(default)]
    pub post_id: Option<String>,
    #[builder(default)]
    pub post_url: Option<String>,
    #[builder(default)]
    pub media_url: Option<String>,
    #[builder(default)]
    pub likes: i64,
    #[builder(default)]
    pub comments: i64,
    #[builder(default)]
    pub shares: i64,
    #[builder(default)]
    pub views: i64,
    #[builder(default = Sentiment::Neutral)]
    pub sentiment: Sentiment,
    #[builder(default)]
    pub sentiment_score: f64,
    #[builder(default)]
    pub dialect: Option<Dialect>,
    #[builder(default)]
    pub dialect_confidence: f64,
    #[builder(default)]
    pub governorate: Option<Governorate>,
    #[builder(default)]
    pub topics: Vec<String>,
    /// Whether sentiment/dialect were computed for this payload.
    #[builder(default)]
    pub analyzed: bool,
    #[builder(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[builder(default)]
    pub candidate_ids: Vec<CandidateId>,
}

impl NewMention {
    fn normalized_post_id(&self) -> Option<&str> {
        self.post_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    fn priority_order(&self) -> i32 {
        self.governorate
            .map(|g| g.priority_order())
            .unwrap_or(UNKNOWN_PRIORITY_ORDER)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub id: MentionId,
    pub inserted: bool,
}

impl Mention {
    /// Inserts the mention or refreshes the existing copy.
    ///
    /// Duplicates are the same `(platform, post_id)`, or the same
    /// `(platform, content_hash)` for posts without an id. A single
    /// `INSERT .. ON CONFLICT` keeps this correct under concurrent collectors.
    pub async fn upsert(new: &NewMention, pool: &PgPool) -> Result<UpsertOutcome> {
        let content = new.content.trim();
        if content.is_empty() {
            anyhow::bail!("mention content is empty");
        }

        let post_id = new.normalized_post_id();
        let conflict_target = if post_id.is_some() {
            "(platform, post_id) WHERE post_id IS NOT NULL"
        } else {
            "(platform, content_hash) WHERE post_id IS NULL"
        };

        let sql = format!(
            r#"
            INSERT INTO mentions (
                id, user_id, platform, content, author_name, author_handle, post_id,
                post_url, media_url, likes, comments, shares, views, sentiment,
                sentiment_score, dialect, dialect_confidence, governorate, is_kurdistan,
                priority_order, topics, content_hash, analyzed_at, published_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18, $19, $20, $21, $22, $23, $24)
            ON CONFLICT {conflict_target} DO UPDATE SET
                likes = EXCLUDED.likes,
                comments = EXCLUDED.comments,
                shares = EXCLUDED.shares,
                views = EXCLUDED.views,
                sentiment = CASE WHEN EXCLUDED.analyzed_at IS NULL
                    THEN mentions.sentiment ELSE EXCLUDED.sentiment END,
                sentiment_score = CASE WHEN EXCLUDED.analyzed_at IS NULL
                    THEN mentions.sentiment_score ELSE EXCLUDED.sentiment_score END,
                analyzed_at = COALESCE(EXCLUDED.analyzed_at, mentions.analyzed_at),
                updated_at = NOW()
            RETURNING id, (xmax = 0) AS inserted
            "#
        );

        let analyzed_at = new.analyzed.then(Utc::now);

        let mut tx = pool.begin().await?;

        let (id, inserted): (MentionId, bool) = sqlx::query_as(&sql)
            .bind(MentionId::new())
            .bind(new.user_id)
            .bind(new.platform.trim().to_lowercase())
            .bind(content)
            .bind(&new.author_name)
            .bind(&new.author_handle)
            .bind(post_id)
            .bind(&new.post_url)
            .bind(&new.media_url)
            .bind(new.likes.max(0))
            .bind(new.comments.max(0))
            .bind(new.shares.max(0))
            .bind(new.views.max(0))
            .bind(new.sentiment.as_str())
            .bind(new.sentiment_score.clamp(-1.0, 1.0))
            .bind(new.dialect.map(|d| d.as_str()))
            .bind(new.dialect_confidence)
            .bind(new.governorate.map(|g| g.as_str()))
            .bind(new.governorate.is_some_and(|g| g.is_kurdistan()))
            .bind(new.priority_order())
            .bind(&new.topics)
            .bind(generate_content_hash(content))
            .bind(analyzed_at)
            .bind(new.published_at)
            .fetch_one(&mut *tx)
            .await?;

        if !new.candidate_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO mention_candidates (mention_id, candidate_id)
                SELECT $1, c FROM unnest($2::uuid[]) AS c
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(id)
            .bind(&new.candidate_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(UpsertOutcome { id, inserted })
    }

    pub async fn find_by_id(id: MentionId, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM mentions WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    /// The mention if the tenant may see it (own or shared).
    pub async fn find_visible(id: MentionId, user_id: UserId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT m.*,
                EXISTS (SELECT 1 FROM mention_reads r WHERE r.mention_id = m.id AND r.user_id = $2) AS is_read
            FROM mentions m
            WHERE m.id = $1 AND (m.user_id IS NULL OR m.user_id = $2)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Tenant-scoped, filtered, newest-first page.
    pub async fn list(filter: &MentionFilter, pool: &PgPool) -> Result<Page<Self>> {
        let limit = filter.effective_limit();

        let rows = sqlx::query_as::<_, Self>(
            r#"
            SELECT m.*,
                CASE WHEN $1::uuid IS NULL THEN FALSE
                     ELSE EXISTS (SELECT 1 FROM mention_reads r WHERE r.mention_id = m.id AND r.user_id = $1)
                END AS is_read
            FROM mentions m
            WHERE ($1::uuid IS NULL OR m.user_id IS NULL OR m.user_id = $1)
              AND ($2::text IS NULL OR m.sentiment = $2)
              AND ($3::text IS NULL OR m.platform = $3)
              AND ($4::text IS NULL OR m.governorate = $4)
              AND ($5::text IS NULL OR m.dialect = $5)
              AND ($6::uuid IS NULL OR EXISTS (
                    SELECT 1 FROM mention_candidates mc
                    WHERE mc.mention_id = m.id AND mc.candidate_id = $6))
              AND (NOT $7 OR m.is_kurdistan)
              AND (NOT $8 OR $1::uuid IS NULL OR NOT EXISTS (
                    SELECT 1 FROM mention_reads r WHERE r.mention_id = m.id AND r.user_id = $1))
              AND ($9::timestamptz IS NULL OR m.detected_at >= $9)
              AND ($10::timestamptz IS NULL OR m.detected_at <= $10)
              AND ($11::uuid IS NULL OR m.id < $11)
            ORDER BY m.id DESC
            LIMIT $12
            "#,
        )
        .bind(filter.user_id)
        .bind(&filter.sentiment)
        .bind(&filter.platform)
        .bind(&filter.governorate)
        .bind(&filter.dialect)
        .bind(filter.candidate_id)
        .bind(filter.kurdistan_only)
        .bind(filter.unread_only)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(filter.before)
        .bind(limit + 1)
        .fetch_all(pool)
        .await?;

        Ok(Page::from_overfetch(rows, limit as usize, |m| m.id.into_uuid()))
    }

    /// Marks a mention read for the tenant. Returns false when the mention
    /// does not exist or is not visible to the tenant.
    pub async fn mark_read(id: MentionId, user_id: UserId, pool: &PgPool) -> Result<bool> {
        if Self::find_visible(id, user_id, pool).await?.is_none() {
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO mention_reads (user_id, mention_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(true)
    }

    /// Retention: removes mentions detected more than `days` ago.
    pub async fn delete_older_than(days: i32, pool: &PgPool) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM mentions WHERE detected_at < NOW() - make_interval(days => $1)",
        )
        .bind(days)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn recent_for_candidate(
        candidate_id: CandidateId,
        since: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT m.* FROM mentions m
            JOIN mention_candidates mc ON mc.mention_id = m.id
            WHERE mc.candidate_id = $1 AND m.detected_at >= $2
            ORDER BY m.detected_at DESC
            "#,
        )
        .bind(candidate_id)
        .bind(since)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Newest mentions since `since`, optionally limited to governorates.
    pub async fn find_recent(
        since: DateTime<Utc>,
        governorates: Option<&[String]>,
        limit: i64,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM mentions
            WHERE detected_at >= $1
              AND ($2::text[] IS NULL OR governorate = ANY($2))
            ORDER BY detected_at DESC
            LIMIT $3
            "#,
        )
        .bind(since)
        .bind(governorates)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Mentions stored without sentiment analysis since `since`.
    pub async fn find_unscored_since(
        since: DateTime<Utc>,
        limit: i64,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM mentions
            WHERE analyzed_at IS NULL AND detected_at >= $1
            ORDER BY detected_at
            LIMIT $2
            "#,
        )
        .bind(since)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn update_sentiment(
        id: MentionId,
        analysis: &SentimentAnalysis,
        detection: &Detection,
        pool: &PgPool,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE mentions SET
                sentiment = $2,
                sentiment_score = $3,
                dialect = $4,
                dialect_confidence = $5,
                topics = $6,
                analyzed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(analysis.sentiment.as_str())
        .bind(analysis.score)
        .bind(detection.dialect.as_str())
        .bind(detection.confidence)
        .bind(&analysis.topics)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub fn engagement(&self) -> i64 {
        self.likes + self.comments + self.shares
    }

    /// Neutral, unengaged mention detected now; tests adjust fields.
    #[cfg(test)]
    pub(crate) fn sample() -> Self {
        let now = Utc::now();
        Mention {
            id: MentionId::new(),
            user_id: None,
            platform: "facebook".into(),
            content: "sample".into(),
            author_name: None,
            author_handle: None,
            post_id: None,
            post_url: None,
            media_url: None,
            likes: 0,
            comments: 0,
            shares: 0,
            views: 0,
            sentiment: "neutral".into(),
            sentiment_score: 0.0,
            dialect: None,
            dialect_confidence: 0.0,
            governorate: None,
            is_kurdistan: false,
            priority_order: UNKNOWN_PRIORITY_ORDER,
            topics: Vec::new(),
            content_hash: generate_content_hash("sample"),
            is_read: false,
            analyzed_at: None,
            published_at: None,
            detected_at: now,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let new = NewMention::builder()
            .platform("twitter")
            .content("الانتخابات")
            .build();
        assert_eq!(new.sentiment, Sentiment::Neutral);
        assert!(new.candidate_ids.is_empty());
        assert_eq!(new.priority_order(), 7);
    }

    #[test]
    fn blank_post_id_falls_back_to_hash() {
        let new = NewMention::builder()
            .platform("facebook")
            .content("x")
            .post_id(Some("  ".to_string()))
            .build();
        assert_eq!(new.normalized_post_id(), None);
    }

    #[test]
    fn governorate_drives_priority() {
        let new = NewMention::builder()
            .platform("facebook")
            .content("x")
            .governorate(Some(Governorate::Halabja))
            .build();
        assert_eq!(new.priority_order(), 1);
    }
}
