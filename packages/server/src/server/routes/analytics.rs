use axum::extract::{Extension, Path, Query};
use chrono::Utc;
use serde::Deserialize;

use crate::common::{ok, ApiError, ApiResult};
use crate::domains::analytics::{self, DashboardMetrics, KurdistanAnalytics, Period, PriorityAnalytics};
use crate::domains::auth::Tier;
use crate::domains::regions::RegionalTrends;
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

pub async fn dashboard_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
) -> ApiResult<DashboardMetrics> {
    ok(analytics::dashboard(state.pool(), Utc::now()).await?)
}

/// `GET /api/analytics/regions/:region`, a governorate or priority tier name.
pub async fn region_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    Path(region): Path<String>,
) -> ApiResult<RegionalTrends> {
    let trends = analytics::region_trends(&region, state.pool(), Utc::now())
        .await?
        .ok_or(ApiError::NotFound("Region"))?;
    ok(trends)
}

pub async fn kurdistan_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> ApiResult<KurdistanAnalytics> {
    user.require_tier(Tier::Professional)?;
    ok(analytics::kurdistan(state.pool(), Utc::now()).await?)
}

pub async fn priority_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<PriorityAnalytics> {
    user.require_tier(Tier::Professional)?;

    let period = match query.period.as_deref() {
        Some(p) => p
            .parse::<Period>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => Period::Day,
    };
    ok(analytics::priority(period, state.pool(), Utc::now()).await?)
}
