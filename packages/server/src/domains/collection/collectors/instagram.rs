use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use social_client::InstagramClient;

use super::merge_results;
use crate::domains::collection::collector::{CollectionTarget, Collector, RawMention};
use crate::domains::mentions::Platform;

/// Instagram caps hashtag lookups per week, so each cycle queries a few.
const HASHTAGS_PER_CYCLE: usize = 3;
const MEDIA_PER_HASHTAG: u32 = 25;

/// Recent media for the tier's election hashtags.
pub struct InstagramCollector {
    client: InstagramClient,
}

impl InstagramCollector {
    pub fn new(access_token: String, business_account_id: String) -> Self {
        Self {
            client: InstagramClient::new(access_token, business_account_id),
        }
    }
}

#[async_trait]
impl Collector for InstagramCollector {
    fn name(&self) -> &'static str {
        "instagram"
    }

    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn collect(&self, target: &CollectionTarget) -> Result<Vec<RawMention>> {
        let hashtags = target.hashtags(HASHTAGS_PER_CYCLE);

        let results = join_all(hashtags.iter().map(|tag| async move {
            self.client
                .hashtag_recent_media(tag, MEDIA_PER_HASHTAG)
                .await
                .map(|posts| {
                    posts
                        .into_iter()
                        .map(|post| RawMention::from_post(Platform::Instagram, post))
                        .collect::<Vec<_>>()
                })
        }))
        .await;

        merge_results(self.name(), results)
    }
}
