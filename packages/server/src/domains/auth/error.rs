use thiserror::Error;

use crate::common::ApiError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Phone number is already registered")]
    PhoneTaken,

    #[error("Email is already in use")]
    EmailTaken,

    #[error("Phone number is not registered")]
    NotRegistered,

    #[error("Verification failed")]
    VerificationFailed,

    #[error("Could not send verification code")]
    DeliveryFailed,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidInput(msg) => ApiError::BadRequest(msg),
            AuthError::PhoneTaken | AuthError::EmailTaken => ApiError::Conflict(err.to_string()),
            AuthError::NotRegistered => ApiError::NotFound("User"),
            AuthError::VerificationFailed => ApiError::Unauthorized,
            AuthError::DeliveryFailed => ApiError::ServiceUnavailable(err.to_string()),
            AuthError::Internal(e) => ApiError::Internal(e),
        }
    }
}
