use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use social_client::FacebookClient;
use tracing::debug;

use super::merge_results;
use crate::domains::collection::collector::{CollectionTarget, Collector, RawMention};
use crate::domains::mentions::Platform;

const POSTS_PER_PAGE: u32 = 25;

/// Recent posts from candidates' registered Facebook pages.
pub struct FacebookCollector {
    client: FacebookClient,
}

impl FacebookCollector {
    pub fn new(access_token: String) -> Self {
        Self {
            client: FacebookClient::new(access_token),
        }
    }
}

#[async_trait]
impl Collector for FacebookCollector {
    fn name(&self) -> &'static str {
        "facebook"
    }

    fn platform(&self) -> Platform {
        Platform::Facebook
    }

    async fn collect(&self, target: &CollectionTarget) -> Result<Vec<RawMention>> {
        let handles: Vec<_> = target.handles_for(Platform::Facebook).collect();
        if handles.is_empty() {
            debug!(tier = %target.tier, "No Facebook pages registered for tier");
            return Ok(Vec::new());
        }

        let results = join_all(handles.iter().map(|handle| async move {
            self.client
                .page_posts(&handle.handle, POSTS_PER_PAGE)
                .await
                .map(|posts| {
                    posts
                        .into_iter()
                        .map(|post| RawMention::from_post(Platform::Facebook, post).from_handle(handle))
                        .collect::<Vec<_>>()
                })
        }))
        .await;

        merge_results(self.name(), results)
    }
}
