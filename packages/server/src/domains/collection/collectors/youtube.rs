use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use futures::future::join_all;
use social_client::YouTubeClient;

use super::merge_results;
use crate::domains::collection::collector::{CollectionTarget, Collector, RawMention};
use crate::domains::language::Dialect;
use crate::domains::mentions::Platform;

const TERMS_PER_QUERY: usize = 3;
const VIDEOS_PER_QUERY: u32 = 25;
const LOOKBACK_HOURS: i64 = 24;

/// Video search in Iraq, one query per tier dialect.
pub struct YouTubeCollector {
    client: YouTubeClient,
}

impl YouTubeCollector {
    pub fn new(api_key: String) -> Self {
        Self {
            client: YouTubeClient::new(api_key),
        }
    }
}

/// YouTube treats `|` as OR.
fn build_query(dialect: Dialect) -> String {
    dialect
        .search_terms()
        .iter()
        .take(TERMS_PER_QUERY)
        .copied()
        .collect::<Vec<_>>()
        .join("|")
}

#[async_trait]
impl Collector for YouTubeCollector {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    async fn collect(&self, target: &CollectionTarget) -> Result<Vec<RawMention>> {
        let published_after = Utc::now() - Duration::hours(LOOKBACK_HOURS);

        let results = join_all(target.dialects.iter().map(|dialect| async move {
            let query = build_query(*dialect);
            self.client
                .search_videos(&query, Some(dialect.lang_code()), Some(published_after), VIDEOS_PER_QUERY)
                .await
                .map(|posts| {
                    posts
                        .into_iter()
                        .map(|post| RawMention::from_post(Platform::Youtube, post))
                        .collect::<Vec<_>>()
                })
        }))
        .await;

        merge_results(self.name(), results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_joins_terms_with_or() {
        let query = build_query(Dialect::English);
        assert_eq!(query.matches('|').count(), TERMS_PER_QUERY - 1);
    }
}
