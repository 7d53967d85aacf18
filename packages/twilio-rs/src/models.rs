use serde::Deserialize;

/// Verify API response to a verification request.
#[derive(Debug, Clone, Deserialize)]
pub struct OTPResponse {
    pub sid: String,
    pub status: String,
    pub to: String,
    pub channel: String,
}

/// Verify API response to a verification check.
#[derive(Debug, Clone, Deserialize)]
pub struct OTPVerifyResponse {
    pub status: String,
    #[serde(default)]
    pub valid: bool,
}

/// Messages API response.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub sid: String,
    pub status: String,
    pub to: String,
    pub error_code: Option<i64>,
    pub error_message: Option<String>,
}

/// Error body returned by every Twilio API on non-2xx.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: Option<i64>,
    pub message: Option<String>,
}
