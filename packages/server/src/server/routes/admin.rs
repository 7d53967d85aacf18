use std::collections::BTreeMap;

use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{ok, ApiError, ApiResult, UserId};
use crate::domains::auth::{SubscriptionStatus, Tier, User};
use crate::domains::collection::WorkerStatus;
use crate::domains::content::{ContentStats, GeneratedContent};
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

#[derive(Debug, Default, Deserialize)]
pub struct UsersQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UserList {
    pub users: Vec<User>,
    pub tiers: BTreeMap<String, i64>,
}

pub async fn users_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Query(query): Query<UsersQuery>,
) -> ApiResult<UserList> {
    user.require_admin()?;

    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let offset = query.offset.unwrap_or(0).max(0);
    let users = User::list(limit, offset, state.pool()).await?;
    let tiers = User::count_by_tier(state.pool()).await?.into_iter().collect();

    ok(UserList { users, tiers })
}

/// Activity window for the stats endpoint.
const STATS_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Serialize)]
pub struct PlatformStats {
    pub tiers: BTreeMap<String, i64>,
    pub subscriptions: BTreeMap<String, i64>,
    pub active_users: i64,
    pub content: ContentStats,
}

/// `GET /api/admin/stats`: tier mix, subscription funnel, weekly logins and
/// content output.
pub async fn stats_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> ApiResult<PlatformStats> {
    user.require_admin()?;

    let since = Utc::now() - Duration::days(STATS_WINDOW_DAYS);
    let pool = state.pool();
    let tiers = User::count_by_tier(pool).await?.into_iter().collect();
    let mut subscriptions: BTreeMap<String, i64> = [
        SubscriptionStatus::Trial,
        SubscriptionStatus::Active,
        SubscriptionStatus::Expired,
        SubscriptionStatus::Cancelled,
    ]
    .into_iter()
    .map(|s| (s.as_str().to_string(), 0))
    .collect();
    subscriptions.extend(User::count_by_status(pool).await?);

    ok(PlatformStats {
        tiers,
        subscriptions,
        active_users: User::count_active_since(since, pool).await?,
        content: GeneratedContent::stats(since, pool).await?,
    })
}

pub async fn scheduler_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> ApiResult<WorkerStatus> {
    user.require_admin()?;
    ok(state.worker.status().await)
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionUpdate {
    pub tier: Option<Tier>,
    pub subscription_status: Option<SubscriptionStatus>,
}

/// Manual tier or subscription change. Takes effect on the user's next login,
/// since issued tokens carry the old tier.
pub async fn update_subscription_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(update): Json<SubscriptionUpdate>,
) -> ApiResult<User> {
    user.require_admin()?;
    if update.tier.is_none() && update.subscription_status.is_none() {
        return Err(ApiError::BadRequest(
            "tier or subscription_status is required".into(),
        ));
    }

    let updated = User::update_subscription(
        UserId::from_uuid(id),
        update.tier,
        update.subscription_status,
        state.pool(),
    )
    .await?
    .ok_or(ApiError::NotFound("User"))?;

    tracing::info!(
        admin_id = %user.user_id,
        user_id = %updated.id,
        tier = %updated.tier,
        status = %updated.subscription_status,
        "Subscription updated"
    );
    ok(updated)
}
