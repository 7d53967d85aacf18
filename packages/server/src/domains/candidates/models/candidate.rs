use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use super::search::CandidateSearch;
use crate::common::CandidateId;
use crate::domains::candidates::influence::{
    compute_influence, is_trending, INFLUENCE_WINDOW_DAYS, TRENDING_THRESHOLD,
};
use crate::domains::mentions::Mention;
use crate::domains::regions::Governorate;

/// Tracked candidate profile.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Candidate {
    pub id: CandidateId,
    pub name_ar: String,
    pub name_en: Option<String>,
    pub name_sorani: Option<String>,
    pub name_badini: Option<String>,
    pub name_kurmanji: Option<String>,
    pub party: Option<String>,
    pub governorate: String,
    pub position: Option<String>,
    pub region_type: String,
    pub priority_order: i32,
    pub languages: Vec<String>,
    pub social_media: JsonValue, // { facebook, instagram, twitter, youtube }
    pub contact: JsonValue,
    pub influence_score: f64,
    pub follower_count: i64,
    pub engagement_rate: f64,
    pub sentiment_score: f64,
    pub data_quality: f64,
    pub last_trending_alert_at: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCandidate {
    pub name_ar: String,
    pub name_en: Option<String>,
    pub name_sorani: Option<String>,
    pub name_badini: Option<String>,
    pub name_kurmanji: Option<String>,
    pub party: Option<String>,
    pub governorate: String,
    pub position: Option<String>,
    pub languages: Option<Vec<String>>,
    pub social_media: Option<JsonValue>,
    pub contact: Option<JsonValue>,
    pub follower_count: Option<i64>,
}

/// Partial update; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateUpdate {
    pub name_ar: Option<String>,
    pub name_en: Option<String>,
    pub name_sorani: Option<String>,
    pub name_badini: Option<String>,
    pub name_kurmanji: Option<String>,
    pub party: Option<String>,
    pub governorate: Option<String>,
    pub position: Option<String>,
    pub languages: Option<Vec<String>>,
    pub social_media: Option<JsonValue>,
    pub contact: Option<JsonValue>,
    pub follower_count: Option<i64>,
}

/// Every spelling of a candidate's name, for matching against post text.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CandidateNames {
    pub id: CandidateId,
    pub name_ar: String,
    pub name_en: Option<String>,
    pub name_sorani: Option<String>,
    pub name_badini: Option<String>,
    pub name_kurmanji: Option<String>,
}

impl CandidateNames {
    pub fn names(&self) -> Vec<String> {
        std::iter::once(Some(&self.name_ar))
            .chain([
                self.name_en.as_ref(),
                self.name_sorani.as_ref(),
                self.name_badini.as_ref(),
                self.name_kurmanji.as_ref(),
            ])
            .flatten()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect()
    }
}

fn parse_governorate(name: &str) -> Result<Governorate> {
    Governorate::parse(name).ok_or_else(|| anyhow!("unknown governorate: {}", name))
}

fn validate_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("candidate name_ar is required");
    }
    Ok(name)
}

// =============================================================================
// SQL Queries
// =============================================================================

impl Candidate {
    pub async fn find_by_id(id: CandidateId, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM candidates WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_optional(id: CandidateId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM candidates WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Kurdistan first, then by influence and freshness.
    pub async fn search(search: &CandidateSearch, pool: &PgPool) -> Result<Vec<Self>> {
        let governorate = match search.governorate.as_deref() {
            Some(name) => Some(parse_governorate(name)?.as_str()),
            None => None,
        };

        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM candidates
            WHERE ($1::text IS NULL
                   OR name_ar ILIKE $1 OR name_en ILIKE $1 OR name_sorani ILIKE $1
                   OR name_badini ILIKE $1 OR name_kurmanji ILIKE $1)
              AND ($2::text IS NULL OR governorate = $2)
              AND ($3::text IS NULL OR party ILIKE $3)
              AND ($4::float8 IS NULL OR influence_score >= $4)
            ORDER BY priority_order ASC, influence_score DESC, updated_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(search.name_pattern())
        .bind(governorate)
        .bind(&search.party)
        .bind(search.min_influence)
        .bind(search.effective_limit())
        .bind(search.effective_offset())
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Inserts a new candidate; `None` when one with the same Arabic name
    /// already exists in the governorate.
    pub async fn create(new: &NewCandidate, pool: &PgPool) -> Result<Option<Self>> {
        let name_ar = validate_name(&new.name_ar)?;
        let governorate = parse_governorate(&new.governorate)?;

        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO candidates (
                id, name_ar, name_en, name_sorani, name_badini, name_kurmanji, party,
                governorate, position, region_type, priority_order, languages,
                social_media, contact, follower_count
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (name_ar, governorate) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(CandidateId::new())
        .bind(name_ar)
        .bind(&new.name_en)
        .bind(&new.name_sorani)
        .bind(&new.name_badini)
        .bind(&new.name_kurmanji)
        .bind(&new.party)
        .bind(governorate.as_str())
        .bind(&new.position)
        .bind(governorate.region_type().as_str())
        .bind(governorate.priority_order())
        .bind(new.languages.clone().unwrap_or_else(|| default_languages(governorate)))
        .bind(new.social_media.clone().unwrap_or_else(|| JsonValue::Object(Default::default())))
        .bind(new.contact.clone().unwrap_or_else(|| JsonValue::Object(Default::default())))
        .bind(new.follower_count.unwrap_or(0))
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Inserts or refreshes the candidate keyed on (name_ar, governorate).
    pub async fn upsert(new: &NewCandidate, pool: &PgPool) -> Result<Self> {
        let name_ar = validate_name(&new.name_ar)?;
        let governorate = parse_governorate(&new.governorate)?;

        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO candidates (
                id, name_ar, name_en, name_sorani, name_badini, name_kurmanji, party,
                governorate, position, region_type, priority_order, languages,
                social_media, contact, follower_count
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (name_ar, governorate) DO UPDATE SET
                name_en = COALESCE(EXCLUDED.name_en, candidates.name_en),
                name_sorani = COALESCE(EXCLUDED.name_sorani, candidates.name_sorani),
                name_badini = COALESCE(EXCLUDED.name_badini, candidates.name_badini),
                name_kurmanji = COALESCE(EXCLUDED.name_kurmanji, candidates.name_kurmanji),
                party = COALESCE(EXCLUDED.party, candidates.party),
                position = COALESCE(EXCLUDED.position, candidates.position),
                social_media = candidates.social_media || EXCLUDED.social_media,
                contact = candidates.contact || EXCLUDED.contact,
                follower_count = GREATEST(EXCLUDED.follower_count, candidates.follower_count),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(CandidateId::new())
        .bind(name_ar)
        .bind(&new.name_en)
        .bind(&new.name_sorani)
        .bind(&new.name_badini)
        .bind(&new.name_kurmanji)
        .bind(&new.party)
        .bind(governorate.as_str())
        .bind(&new.position)
        .bind(governorate.region_type().as_str())
        .bind(governorate.priority_order())
        .bind(new.languages.clone().unwrap_or_else(|| default_languages(governorate)))
        .bind(new.social_media.clone().unwrap_or_else(|| JsonValue::Object(Default::default())))
        .bind(new.contact.clone().unwrap_or_else(|| JsonValue::Object(Default::default())))
        .bind(new.follower_count.unwrap_or(0))
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Applies a partial update. Moving a candidate to another governorate
    /// re-derives its region type and priority order.
    pub async fn update(id: CandidateId, changes: &CandidateUpdate, pool: &PgPool) -> Result<Option<Self>> {
        let governorate = match changes.governorate.as_deref() {
            Some(name) => Some(parse_governorate(name)?),
            None => None,
        };
        let name_ar = match changes.name_ar.as_deref() {
            Some(name) => Some(validate_name(name)?),
            None => None,
        };

        sqlx::query_as::<_, Self>(
            r#"
            UPDATE candidates SET
                name_ar = COALESCE($2, name_ar),
                name_en = COALESCE($3, name_en),
                name_sorani = COALESCE($4, name_sorani),
                name_badini = COALESCE($5, name_badini),
                name_kurmanji = COALESCE($6, name_kurmanji),
                party = COALESCE($7, party),
                governorate = COALESCE($8, governorate),
                region_type = COALESCE($9, region_type),
                priority_order = COALESCE($10, priority_order),
                position = COALESCE($11, position),
                languages = COALESCE($12, languages),
                social_media = COALESCE($13, social_media),
                contact = COALESCE($14, contact),
                follower_count = COALESCE($15, follower_count),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name_ar)
        .bind(&changes.name_en)
        .bind(&changes.name_sorani)
        .bind(&changes.name_badini)
        .bind(&changes.name_kurmanji)
        .bind(&changes.party)
        .bind(governorate.map(|g| g.as_str()))
        .bind(governorate.map(|g| g.region_type().as_str()))
        .bind(governorate.map(|g| g.priority_order()))
        .bind(&changes.position)
        .bind(&changes.languages)
        .bind(&changes.social_media)
        .bind(&changes.contact)
        .bind(changes.follower_count)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn all_names(pool: &PgPool) -> Result<Vec<CandidateNames>> {
        sqlx::query_as::<_, CandidateNames>(
            "SELECT id, name_ar, name_en, name_sorani, name_badini, name_kurmanji FROM candidates",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Highest-influence candidates, optionally within governorates.
    pub async fn top_by_influence(
        governorates: Option<&[String]>,
        limit: i64,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM candidates
            WHERE ($1::text[] IS NULL OR governorate = ANY($1))
            ORDER BY influence_score DESC, updated_at DESC
            LIMIT $2
            "#,
        )
        .bind(governorates)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Recomputes and stores the influence score from the last week of mentions.
    pub async fn refresh_influence(id: CandidateId, pool: &PgPool) -> Result<f64> {
        let now = Utc::now();
        let since = now - Duration::days(INFLUENCE_WINDOW_DAYS);
        let mentions = Mention::recent_for_candidate(id, since, pool).await?;
        let influence = compute_influence(&mentions, now);
        let sentiment = if mentions.is_empty() {
            0.0
        } else {
            mentions.iter().map(|m| m.sentiment_score).sum::<f64>() / mentions.len() as f64
        };

        sqlx::query(
            r#"
            UPDATE candidates SET
                influence_score = $2,
                sentiment_score = $3,
                last_updated = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(influence)
        .bind(sentiment)
        .execute(pool)
        .await?;

        tracing::debug!(candidate_id = %id, influence, mentions = mentions.len(), "Influence refreshed");
        Ok(influence)
    }

    /// Candidates mentioned in the last `hours`.
    pub async fn find_with_recent_mentions(hours: i32, pool: &PgPool) -> Result<Vec<CandidateId>> {
        let ids: Vec<(CandidateId,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT mc.candidate_id
            FROM mention_candidates mc
            JOIN mentions m ON m.id = mc.mention_id
            WHERE m.detected_at > NOW() - make_interval(hours => $1)
            "#,
        )
        .bind(hours)
        .fetch_all(pool)
        .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    /// Refreshes influence for every candidate mentioned in the last `hours`.
    pub async fn refresh_recent(hours: i32, pool: &PgPool) -> Result<usize> {
        let ids = Self::find_with_recent_mentions(hours, pool).await?;
        for id in &ids {
            Self::refresh_influence(*id, pool).await?;
        }
        Ok(ids.len())
    }

    /// Trending candidates that have not been alerted on in the last day.
    pub async fn find_trending_unalerted(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM candidates
            WHERE influence_score > $1
              AND (last_trending_alert_at IS NULL
                   OR last_trending_alert_at < NOW() - INTERVAL '24 hours')
            ORDER BY influence_score DESC
            "#,
        )
        .bind(TRENDING_THRESHOLD)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn mark_alerted(id: CandidateId, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE candidates SET last_trending_alert_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn count(pool: &PgPool) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM candidates")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Platform handle registered in `social_media`, e.g. a Facebook page id.
    pub fn social_handle(&self, platform: &str) -> Option<&str> {
        self.social_media
            .get(platform)
            .and_then(JsonValue::as_str)
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }

    pub fn is_trending(&self) -> bool {
        is_trending(self.influence_score)
    }
}

fn default_languages(governorate: Governorate) -> Vec<String> {
    governorate
        .tier()
        .languages()
        .iter()
        .map(|d| d.as_str().to_string())
        .collect()
}
