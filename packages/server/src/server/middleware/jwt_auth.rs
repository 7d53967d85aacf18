use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts, middleware::Next, response::Response};
use chrono::Utc;
use sqlx::PgPool;
use tracing::debug;

use crate::common::{ApiError, UserId};
use crate::domains::auth::{JwtService, Role, Tier, User};

/// Authenticated user taken from a verified bearer token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: UserId,
    pub role: Role,
    pub tier: Tier,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin access required".into()))
        }
    }

    /// Admins pass every tier check.
    pub fn require_tier(&self, min: Tier) -> Result<(), ApiError> {
        if self.is_admin() || self.tier >= min {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "This feature requires the {} tier or higher",
                min
            )))
        }
    }

    /// Loads the account and checks that it is active, or on a trial that has not ended.
    pub async fn require_active_subscription(&self, pool: &PgPool) -> Result<User, ApiError> {
        let user = User::find_by_id(self.user_id, pool)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        if self.is_admin() || user.has_active_subscription(Utc::now()) {
            Ok(user)
        } else {
            Err(ApiError::Forbidden("Subscription expired or inactive".into()))
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(ApiError::Unauthorized)
    }
}

/// Verifies the bearer token, if any, and stores the [`AuthUser`] in request
/// extensions. Requests without a valid token continue unauthenticated.
pub async fn jwt_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    if let Some(user) = extract_auth_user(&request, &jwt_service) {
        debug!(user_id = %user.user_id, role = user.role.as_str(), "Authenticated request");
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}

fn extract_auth_user(
    request: &axum::http::Request<axum::body::Body>,
    jwt_service: &JwtService,
) -> Option<AuthUser> {
    let auth_str = request.headers().get("authorization")?.to_str().ok()?;

    // "Bearer <token>" or the raw token
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str);

    let claims = jwt_service.verify_token(token).ok()?;

    Some(AuthUser {
        user_id: claims.user_id,
        role: claims.role,
        tier: claims.tier,
    })
}
