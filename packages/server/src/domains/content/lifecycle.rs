//! Scheduling, publishing and deleting generated content.
//!
//! Publishing marks the content as published; posting to the platforms is
//! left to the candidate's team.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;

use super::generator::ContentError;
use super::models::{ContentStatus, GeneratedContent};
use crate::common::{ContentId, UserId};

/// Parses an RFC 3339 time that must lie after `now`.
pub fn parse_schedule_time(raw: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ContentError> {
    let at = DateTime::parse_from_rfc3339(raw.trim())
        .map_err(|_| ContentError::InvalidInput("scheduled_time must be an RFC 3339 timestamp".into()))?
        .with_timezone(&Utc);
    if at <= now {
        return Err(ContentError::InvalidInput(
            "scheduled_time must be in the future".into(),
        ));
    }
    Ok(at)
}

fn ensure_movable(content: &GeneratedContent) -> Result<(), ContentError> {
    match content.status() {
        ContentStatus::Locked => Err(ContentError::Locked),
        ContentStatus::Published => Err(ContentError::AlreadyPublished),
        ContentStatus::Draft | ContentStatus::Scheduled => Ok(()),
    }
}

async fn owned(id: ContentId, user_id: UserId, pool: &PgPool) -> Result<GeneratedContent, ContentError> {
    GeneratedContent::find_for_user(id, user_id, pool)
        .await?
        .ok_or(ContentError::NotFound)
}

/// Schedules a draft, or moves an already scheduled item.
pub async fn schedule_content(
    id: ContentId,
    user_id: UserId,
    at: DateTime<Utc>,
    pool: &PgPool,
) -> Result<GeneratedContent, ContentError> {
    let content = owned(id, user_id, pool).await?;
    ensure_movable(&content)?;

    let scheduled = GeneratedContent::schedule(content.id, at, pool).await?;
    info!(content_id = %scheduled.id, user_id = %user_id, at = %at, "Content scheduled");
    Ok(scheduled)
}

pub async fn publish_content(
    id: ContentId,
    user_id: UserId,
    pool: &PgPool,
) -> Result<GeneratedContent, ContentError> {
    let content = owned(id, user_id, pool).await?;
    ensure_movable(&content)?;

    let published = GeneratedContent::mark_published(content.id, pool).await?;
    info!(content_id = %published.id, user_id = %user_id, "Content published");
    Ok(published)
}

pub async fn delete_content(id: ContentId, user_id: UserId, pool: &PgPool) -> Result<(), ContentError> {
    if GeneratedContent::delete_for_user(id, user_id, pool).await? {
        Ok(())
    } else {
        Err(ContentError::NotFound)
    }
}
