//! Test fixtures. They go through the model methods, with unique values so
//! parallel tests on the shared database never collide.

use anyhow::{Context, Result};
use chrono::Utc;
use hamlat_core::domains::auth::models::NewUser;
use hamlat_core::domains::auth::{SubscriptionStatus, Tier, User};
use hamlat_core::domains::candidates::{Candidate, NewCandidate};
use hamlat_core::domains::language::{Dialect, Sentiment};
use hamlat_core::domains::mentions::{Mention, NewMention, UpsertOutcome};
use hamlat_core::domains::regions::Governorate;
use sqlx::PgPool;
use uuid::Uuid;

/// Short unique suffix for names and content.
pub fn unique() -> String {
    Uuid::new_v4().simple().to_string()[..10].to_string()
}

/// A fresh E.164 Iraqi mobile number.
pub fn unique_phone() -> String {
    let n = Uuid::new_v4().as_u128() % 100_000_000;
    format!("+96475{:08}", n)
}

pub async fn create_user(pool: &PgPool, tier: Tier, status: SubscriptionStatus) -> Result<User> {
    let new = NewUser {
        phone_number: unique_phone(),
        email: None,
        name: format!("Candidate {}", unique()),
        governorate: Governorate::Erbil.as_str().to_string(),
        party: None,
        language: "ku".to_string(),
        dialect: Some(Dialect::Sorani.as_str().to_string()),
    };
    let user = User::create(&new, Utc::now(), pool)
        .await?
        .context("phone number collision")?;
    User::update_subscription(user.id, Some(tier), Some(status), pool)
        .await?
        .context("user vanished")
}

pub async fn create_candidate(pool: &PgPool, name_en: &str, governorate: Governorate) -> Result<Candidate> {
    let new = NewCandidate {
        name_ar: format!("مرشح {}", unique()),
        name_en: Some(name_en.to_string()),
        name_sorani: None,
        name_badini: None,
        name_kurmanji: None,
        party: Some("Test Party".to_string()),
        governorate: governorate.as_str().to_string(),
        position: None,
        languages: None,
        social_media: None,
        contact: None,
        follower_count: None,
    };
    Candidate::create(&new, pool)
        .await?
        .context("candidate name collision")
}

/// Shared (collector) mention with unique content.
pub async fn insert_mention(
    pool: &PgPool,
    governorate: Governorate,
    sentiment: Sentiment,
    score: f64,
) -> Result<UpsertOutcome> {
    let new = NewMention::builder()
        .platform("facebook")
        .content(format!("election post {}", unique()))
        .sentiment(sentiment)
        .sentiment_score(score)
        .dialect(Some(Dialect::Sorani))
        .dialect_confidence(0.9)
        .governorate(Some(governorate))
        .analyzed(true)
        .build();
    Mention::upsert(&new, pool).await
}
