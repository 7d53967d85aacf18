use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::UserId;

/// New accounts start on the free tier with this many trial days.
pub const TRIAL_DAYS: i64 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Candidate,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Candidate => "candidate",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "candidate" => Ok(Self::Candidate),
            "admin" => Ok(Self::Admin),
            other => anyhow::bail!("unknown role: {}", other),
        }
    }
}

/// Subscription tier. Ordered, so `tier >= Tier::Professional` reads as "professional or better".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Basic,
    Professional,
    Premium,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Basic => "basic",
            Self::Professional => "professional",
            Self::Premium => "premium",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "basic" => Ok(Self::Basic),
            "professional" => Ok(Self::Professional),
            "premium" => Ok(Self::Premium),
            other => anyhow::bail!("unknown tier: {}", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    Expired,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trial" => Ok(Self::Trial),
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            other => anyhow::bail!("unknown subscription status: {}", other),
        }
    }
}

/// Active subscriptions pass; trials pass until `trial_ends_at`.
pub fn subscription_allows(
    status: SubscriptionStatus,
    trial_ends_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    match status {
        SubscriptionStatus::Active => true,
        SubscriptionStatus::Trial => trial_ends_at.map_or(true, |end| end > now),
        SubscriptionStatus::Expired | SubscriptionStatus::Cancelled => false,
    }
}

/// Candidate account (tenant).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub phone_number: String,
    pub email: Option<String>,
    pub name: String,
    pub governorate: String,
    pub party: Option<String>,
    pub language: String,
    pub dialect: Option<String>,
    pub role: String,
    pub tier: String,
    pub subscription_status: String,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub phone_number: String,
    pub email: Option<String>,
    pub name: String,
    pub governorate: String,
    pub party: Option<String>,
    pub language: String,
    pub dialect: Option<String>,
}

/// Profile fields to overwrite; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub party: Option<String>,
    pub language: Option<String>,
    pub dialect: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl User {
    /// Unknown values fall back to the least privileged variant.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::Candidate)
    }

    pub fn tier(&self) -> Tier {
        self.tier.parse().unwrap_or(Tier::Free)
    }

    pub fn subscription_status(&self) -> SubscriptionStatus {
        self.subscription_status
            .parse()
            .unwrap_or(SubscriptionStatus::Expired)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }

    pub fn has_active_subscription(&self, now: DateTime<Utc>) -> bool {
        subscription_allows(self.subscription_status(), self.trial_ends_at, now)
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

impl User {
    pub async fn find_by_id(id: UserId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1 AND is_active = TRUE")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_phone(phone_number: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM users WHERE phone_number = $1 AND is_active = TRUE",
        )
        .bind(phone_number)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Inserts a free-tier trial account. Returns `None` when the phone number is taken.
    pub async fn create(new: &NewUser, now: DateTime<Utc>, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO users (
                id, phone_number, email, name, governorate, party, language, dialect,
                role, tier, subscription_status, trial_ends_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'candidate', 'free', 'trial', $9)
            ON CONFLICT (phone_number) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(UserId::new())
        .bind(&new.phone_number)
        .bind(&new.email)
        .bind(&new.name)
        .bind(&new.governorate)
        .bind(&new.party)
        .bind(&new.language)
        .bind(&new.dialect)
        .bind(now + Duration::days(TRIAL_DAYS))
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn touch_login(id: UserId, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE users SET last_login_at = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn list(limit: i64, offset: i64, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Trial and active accounts, for the daily content job.
    pub async fn find_subscribed(now: DateTime<Utc>, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM users
            WHERE is_active = TRUE
              AND role = 'candidate'
              AND (
                subscription_status = 'active'
                OR (subscription_status = 'trial' AND (trial_ends_at IS NULL OR trial_ends_at > $1))
              )
            ORDER BY created_at
            "#,
        )
        .bind(now)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Admin override of tier and/or subscription status. `None` when the user does not exist.
    pub async fn update_subscription(
        id: UserId,
        tier: Option<Tier>,
        status: Option<SubscriptionStatus>,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE users SET
                tier = COALESCE($2, tier),
                subscription_status = COALESCE($3, subscription_status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tier.map(|t| t.as_str()))
        .bind(status.map(|s| s.as_str()))
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Overwrites the given profile fields. `None` when the account is missing or inactive.
    pub async fn update_profile(
        id: UserId,
        changes: &ProfileChanges,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                party = COALESCE($4, party),
                language = COALESCE($5, language),
                dialect = COALESCE($6, dialect),
                updated_at = NOW()
            WHERE id = $1 AND is_active = TRUE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(&changes.party)
        .bind(&changes.language)
        .bind(&changes.dialect)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Flips elapsed trials to `expired`. Returns how many accounts changed.
    pub async fn expire_trials(now: DateTime<Utc>, pool: &PgPool) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE users SET subscription_status = 'expired', updated_at = NOW()
            WHERE subscription_status = 'trial' AND trial_ends_at <= $1
            "#,
        )
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_by_tier(pool: &PgPool) -> Result<Vec<(String, i64)>> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT tier, COUNT(*) FROM users WHERE is_active = TRUE GROUP BY tier ORDER BY tier",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<(String, i64)>> {
        sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT subscription_status, COUNT(*) FROM users
            WHERE is_active = TRUE AND role = 'candidate'
            GROUP BY subscription_status
            ORDER BY subscription_status
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Accounts that logged in since `since`.
    pub async fn count_active_since(since: DateTime<Utc>, pool: &PgPool) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE is_active = TRUE AND last_login_at >= $1",
        )
        .bind(since)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
