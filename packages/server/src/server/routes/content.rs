use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{ok, ApiError, ApiResponse, ApiResult, ContentId};
use crate::domains::content::{
    delete_content, generate_content, parse_schedule_time, publish_content, schedule_content,
    ContentRequest, GeneratedContent,
};
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub scheduled_time: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `POST /api/content/generate`. Free-tier output comes back locked, without its body.
pub async fn generate_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Json(request): Json<ContentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<GeneratedContent>>), ApiError> {
    let account = user.require_active_subscription(state.pool()).await?;
    let brief = request.validate()?;

    let content = generate_content(&account, &brief, state.deps.ai.as_deref(), state.pool()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            success: true,
            data: content.redacted(),
        }),
    ))
}

pub async fn list_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<GeneratedContent>> {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = query.offset.unwrap_or(0).max(0);

    let items = GeneratedContent::list_for_user(user.user_id, limit, offset, state.pool())
        .await?
        .into_iter()
        .map(GeneratedContent::redacted)
        .collect();
    ok(items)
}

/// `POST /api/content/:id/schedule` with an RFC 3339 `scheduled_time`.
pub async fn schedule_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<ScheduleRequest>,
) -> ApiResult<GeneratedContent> {
    user.require_active_subscription(state.pool()).await?;
    let raw = body
        .scheduled_time
        .ok_or_else(|| ApiError::BadRequest("scheduled_time is required".into()))?;
    let at = parse_schedule_time(&raw, Utc::now())?;

    let content = schedule_content(ContentId::from_uuid(id), user.user_id, at, state.pool()).await?;
    ok(content)
}

pub async fn publish_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<GeneratedContent> {
    user.require_active_subscription(state.pool()).await?;
    let content = publish_content(ContentId::from_uuid(id), user.user_id, state.pool()).await?;
    ok(content)
}

pub async fn delete_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Deleted> {
    delete_content(ContentId::from_uuid(id), user.user_id, state.pool()).await?;
    ok(Deleted { deleted: true })
}
