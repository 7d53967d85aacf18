use serde::Serialize;
use tracing::{info, warn};

use crate::domains::auth::error::AuthError;
use crate::domains::auth::models::{
    is_test_identifier, normalize_phone, phone_fingerprint, User, TEST_CODE,
};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Checks the code and issues a token. The test identifier accepts only [`TEST_CODE`].
pub async fn verify_code(
    phone_number: &str,
    code: &str,
    deps: &ServerDeps,
) -> Result<Session, AuthError> {
    let phone_number = normalize_phone(phone_number)
        .ok_or_else(|| AuthError::InvalidInput("Invalid phone number".into()))?;
    let code = code.trim();
    if code.is_empty() {
        return Err(AuthError::InvalidInput("Code is required".into()));
    }

    let user = User::find_by_phone(&phone_number, &deps.db_pool)
        .await?
        .ok_or(AuthError::NotRegistered)?;

    if deps.test_identifier_enabled && is_test_identifier(&phone_number) {
        if code != TEST_CODE {
            return Err(AuthError::VerificationFailed);
        }
        info!("Test identifier: skipping Twilio verification");
    } else if let Err(e) = deps.twilio.verify_otp(&phone_number, code).await {
        warn!(phone = %phone_fingerprint(&phone_number), error = %e, "Code verification failed");
        return Err(AuthError::VerificationFailed);
    }

    User::touch_login(user.id, &deps.db_pool).await?;

    let token = deps
        .jwt_service
        .create_token(user.id, user.role(), user.tier())?;

    info!(user_id = %user.id, "User signed in");
    Ok(Session { token, user })
}
