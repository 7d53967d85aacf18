//! REST clients for the social platforms used by mention collection.
//!
//! Each platform gets its own small client holding the credential it needs.
//! All of them return normalized [`SocialPost`] values so callers never deal
//! with per-platform payload shapes.
//!
//! # Example
//!
//! ```rust,ignore
//! use social_client::TwitterClient;
//!
//! let client = TwitterClient::new("bearer-token".into());
//! let posts = client.search_recent("انتخابات lang:ar", 50).await?;
//! for post in &posts {
//!     println!("{}: {}", post.author_handle.as_deref().unwrap_or("?"), post.text);
//! }
//! ```

pub mod error;
pub mod facebook;
pub mod instagram;
pub mod twitter;
pub mod types;
pub mod youtube;

pub use error::{Result, SocialApiError};
pub use facebook::FacebookClient;
pub use instagram::InstagramClient;
pub use twitter::TwitterClient;
pub use types::{Engagement, SocialPost};
pub use youtube::YouTubeClient;

use serde::de::DeserializeOwned;

/// Sends a GET and decodes the JSON body, mapping non-2xx statuses to
/// [`SocialApiError`].
pub(crate) async fn get_json<T: DeserializeOwned>(
    platform: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<T> {
    let resp = request.send().await?;

    let status = resp.status();
    if status.as_u16() == 429 {
        tracing::warn!(platform, "Rate limited");
        return Err(SocialApiError::RateLimited { platform });
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!(platform, status = %status, error = %body, "Platform API error");
        return Err(SocialApiError::Api {
            platform,
            status: status.as_u16(),
            message: body,
        });
    }

    Ok(resp.json::<T>().await?)
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .unwrap_or_default()
}
