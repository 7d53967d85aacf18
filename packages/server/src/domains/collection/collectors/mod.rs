//! Platform collectors backed by `social-client`.

mod facebook;
mod instagram;
mod twitter;
mod youtube;

use std::sync::Arc;

use tracing::warn;

pub use facebook::FacebookCollector;
pub use instagram::InstagramCollector;
pub use twitter::TwitterCollector;
pub use youtube::YouTubeCollector;

use super::collector::Collector;
use crate::config::PlatformCredentials;

/// Builds a collector for every platform with credentials. Missing
/// credentials are reported once here.
pub fn platform_collectors(credentials: &PlatformCredentials) -> Vec<Arc<dyn Collector>> {
    let mut collectors: Vec<Arc<dyn Collector>> = Vec::new();

    match &credentials.facebook_access_token {
        Some(token) => collectors.push(Arc::new(FacebookCollector::new(token.clone()))),
        None => warn!(platform = "facebook", "FACEBOOK_ACCESS_TOKEN not set, collector disabled"),
    }

    match (
        &credentials.instagram_access_token,
        &credentials.instagram_business_account_id,
    ) {
        (Some(token), Some(account)) => collectors.push(Arc::new(InstagramCollector::new(
            token.clone(),
            account.clone(),
        ))),
        _ => warn!(
            platform = "instagram",
            "INSTAGRAM_ACCESS_TOKEN or INSTAGRAM_BUSINESS_ACCOUNT_ID not set, collector disabled"
        ),
    }

    match &credentials.youtube_api_key {
        Some(key) => collectors.push(Arc::new(YouTubeCollector::new(key.clone()))),
        None => warn!(platform = "youtube", "YOUTUBE_API_KEY not set, collector disabled"),
    }

    match &credentials.twitter_bearer_token {
        Some(token) => collectors.push(Arc::new(TwitterCollector::new(token.clone()))),
        None => warn!(platform = "twitter", "TWITTER_BEARER_TOKEN not set, collector disabled"),
    }

    collectors
}

/// Folds per-request results: partial failures are logged, a collector
/// fails only when every request it made failed.
pub(crate) fn merge_results<T>(
    collector: &'static str,
    results: Vec<social_client::Result<Vec<T>>>,
) -> anyhow::Result<Vec<T>> {
    if results.is_empty() {
        return Ok(Vec::new());
    }

    let attempted = results.len();
    let mut items = Vec::new();
    let mut last_error = None;
    let mut failures = 0;

    for result in results {
        match result {
            Ok(batch) => items.extend(batch),
            Err(e) => {
                warn!(collector, error = %e, "Collector request failed");
                failures += 1;
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if failures == attempted => Err(anyhow::anyhow!("{}: all {} requests failed: {}", collector, attempted, e)),
        _ => Ok(items),
    }
}
