use thiserror::Error;

pub type Result<T> = std::result::Result<T, SocialApiError>;

#[derive(Debug, Error)]
pub enum SocialApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{platform} API error (status {status}): {message}")]
    Api {
        platform: &'static str,
        status: u16,
        message: String,
    },

    #[error("{platform} rate limit exceeded")]
    RateLimited { platform: &'static str },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl SocialApiError {
    /// Rate limits and 5xx responses are worth retrying on the next cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500,
            Self::RateLimited { .. } => true,
            Self::InvalidRequest(_) => false,
        }
    }
}
