use axum::{extract::Extension, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::common::{ok, ApiError, ApiResponse, ApiResult};
use crate::domains::auth::{
    self, ProfileUpdate, RegisterInput, Session, SocialAccount, SocialAccountInput, User,
};
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    pub phone_number: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub phone_number: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct CodeSent {
    pub sent: bool,
}

/// `POST /api/auth/register`: creates the account and texts a login code.
pub async fn register_handler(
    Extension(state): Extension<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let user = auth::register(input, &state.deps).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            success: true,
            data: user,
        }),
    ))
}

pub async fn send_code_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<SendCodeRequest>,
) -> ApiResult<CodeSent> {
    auth::send_code(&body.phone_number, &state.deps).await?;
    ok(CodeSent { sent: true })
}

pub async fn verify_code_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<VerifyCodeRequest>,
) -> ApiResult<Session> {
    let session = auth::verify_code(&body.phone_number, &body.code, &state.deps).await?;
    ok(session)
}

pub async fn me_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> ApiResult<User> {
    let account = User::find_by_id(user.user_id, state.pool())
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    ok(account)
}

/// `PUT /api/auth/profile`: changes name, email, party, language or dialect.
pub async fn update_profile_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<User> {
    let account = auth::update_profile(user.user_id, &update, state.pool()).await?;
    ok(account)
}

pub async fn social_accounts_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> ApiResult<Vec<SocialAccount>> {
    ok(SocialAccount::list_for_user(user.user_id, state.pool()).await?)
}

/// `POST /api/auth/social-accounts`: registers a page or handle for collection.
pub async fn add_social_account_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Json(input): Json<SocialAccountInput>,
) -> Result<(StatusCode, Json<ApiResponse<SocialAccount>>), ApiError> {
    let account = auth::add_social_account(user.user_id, &input, state.pool()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            success: true,
            data: account,
        }),
    ))
}
