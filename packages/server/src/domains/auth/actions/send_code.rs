use tracing::{error, info};

use crate::domains::auth::error::AuthError;
use crate::domains::auth::models::{is_test_identifier, normalize_phone, phone_fingerprint, User};
use crate::kernel::ServerDeps;

/// Sends a one-time code to a registered phone number.
pub async fn send_code(phone_number: &str, deps: &ServerDeps) -> Result<(), AuthError> {
    let phone_number = normalize_phone(phone_number)
        .ok_or_else(|| AuthError::InvalidInput("Invalid phone number".into()))?;

    if User::find_by_phone(&phone_number, &deps.db_pool).await?.is_none() {
        info!(phone = %phone_fingerprint(&phone_number), "Code requested for unknown number");
        return Err(AuthError::NotRegistered);
    }

    deliver_code(&phone_number, deps).await
}

pub(super) async fn deliver_code(phone_number: &str, deps: &ServerDeps) -> Result<(), AuthError> {
    if deps.test_identifier_enabled && !cfg!(debug_assertions) {
        error!("SECURITY WARNING: TEST_IDENTIFIER_ENABLED is true in a release build");
    }

    if deps.test_identifier_enabled && is_test_identifier(phone_number) {
        info!("Test identifier: skipping Twilio delivery");
        return Ok(());
    }

    deps.twilio.send_otp(phone_number).await.map_err(|e| {
        error!(phone = %phone_fingerprint(phone_number), error = %e, "Failed to send code");
        AuthError::DeliveryFailed
    })?;

    info!(phone = %phone_fingerprint(phone_number), "Code sent");
    Ok(())
}
