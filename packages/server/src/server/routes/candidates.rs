use axum::{
    extract::{Extension, Path, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::common::{ok, ApiError, ApiResponse, ApiResult, CandidateId};
use crate::domains::auth::Tier;
use crate::domains::candidates::{
    export_candidates, Candidate, CandidateSearch, CandidateUpdate, ExportFormat, NewCandidate,
};
use crate::domains::candidates::models::search::MAX_LIMIT;
use crate::domains::regions::Governorate;
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

fn check_governorate(name: Option<&str>) -> Result<(), ApiError> {
    match name {
        Some(name) if Governorate::parse(name).is_none() => {
            Err(ApiError::BadRequest(format!("Unknown governorate: {}", name)))
        }
        _ => Ok(()),
    }
}

fn check_name(name: Option<&str>) -> Result<(), ApiError> {
    match name {
        Some(name) if name.trim().is_empty() => {
            Err(ApiError::BadRequest("name_ar is required".into()))
        }
        _ => Ok(()),
    }
}

pub async fn list_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    Query(search): Query<CandidateSearch>,
) -> ApiResult<Vec<Candidate>> {
    check_governorate(search.governorate.as_deref())?;
    ok(Candidate::search(&search, state.pool()).await?)
}

pub async fn get_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Candidate> {
    let candidate = Candidate::find_optional(CandidateId::from_uuid(id), state.pool())
        .await?
        .ok_or(ApiError::NotFound("Candidate"))?;
    ok(candidate)
}

pub async fn create_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Json(new): Json<NewCandidate>,
) -> Result<(StatusCode, Json<ApiResponse<Candidate>>), ApiError> {
    user.require_admin()?;
    check_name(Some(&new.name_ar))?;
    check_governorate(Some(&new.governorate))?;

    let candidate = Candidate::create(&new, state.pool()).await?.ok_or_else(|| {
        ApiError::Conflict("A candidate with this name already exists in the governorate".into())
    })?;

    tracing::info!(candidate_id = %candidate.id, governorate = %candidate.governorate, "Candidate created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            success: true,
            data: candidate,
        }),
    ))
}

pub async fn update_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(changes): Json<CandidateUpdate>,
) -> ApiResult<Candidate> {
    user.require_admin()?;
    check_name(changes.name_ar.as_deref())?;
    check_governorate(changes.governorate.as_deref())?;

    let candidate = Candidate::update(CandidateId::from_uuid(id), &changes, state.pool())
        .await?
        .ok_or(ApiError::NotFound("Candidate"))?;
    ok(candidate)
}

/// `GET /api/candidates/export?format=csv|json`, professional tier and up.
pub async fn export_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Query(query): Query<ExportQuery>,
    Query(mut search): Query<CandidateSearch>,
) -> Result<Response, ApiError> {
    user.require_tier(Tier::Professional)?;

    let format: ExportFormat = query
        .format
        .as_deref()
        .unwrap_or("csv")
        .parse()
        .map_err(|e: anyhow::Error| ApiError::BadRequest(e.to_string()))?;
    check_governorate(search.governorate.as_deref())?;

    search.limit = Some(search.limit.unwrap_or(MAX_LIMIT));
    let candidates = Candidate::search(&search, state.pool()).await?;
    let body = export_candidates(&candidates, format)?;

    let disposition = format!(
        "attachment; filename=\"candidates.{}\"",
        format.extension()
    );
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
