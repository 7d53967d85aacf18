use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{SocialAccountId, UserId};
use crate::domains::mentions::Platform;

/// A platform account a tenant registered on their profile.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SocialAccount {
    pub id: SocialAccountId,
    pub user_id: UserId,
    pub platform: String,
    pub account_name: String,
    pub account_url: Option<String>,
    pub status: String,
    pub followers_count: i64,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSocialAccount {
    pub platform: Platform,
    pub account_name: String,
    pub account_url: Option<String>,
}

/// A connected account together with its owner's governorate.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TenantHandle {
    pub user_id: UserId,
    pub platform: String,
    pub account_name: String,
    pub governorate: String,
}

// =============================================================================
// SQL Queries
// =============================================================================

impl SocialAccount {
    /// Registers the account, or reconnects it when the tenant already has it.
    pub async fn upsert(user_id: UserId, new: &NewSocialAccount, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO social_accounts (id, user_id, platform, account_name, account_url)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, platform, account_name) DO UPDATE SET
                account_url = COALESCE(EXCLUDED.account_url, social_accounts.account_url),
                status = 'connected',
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(SocialAccountId::new())
        .bind(user_id)
        .bind(new.platform.as_str())
        .bind(&new.account_name)
        .bind(&new.account_url)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn list_for_user(user_id: UserId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM social_accounts WHERE user_id = $1 ORDER BY platform, account_name",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Connected accounts of active tenants registered in `governorates`.
    pub async fn connected_in(governorates: &[String], pool: &PgPool) -> Result<Vec<TenantHandle>> {
        sqlx::query_as::<_, TenantHandle>(
            r#"
            SELECT s.user_id, s.platform, s.account_name, u.governorate
            FROM social_accounts s
            JOIN users u ON u.id = s.user_id
            WHERE s.status = 'connected'
              AND u.is_active = TRUE
              AND u.governorate = ANY($1)
            ORDER BY s.created_at
            "#,
        )
        .bind(governorates)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
