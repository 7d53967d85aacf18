use serde::Deserialize;

use crate::facebook::{parse_graph_time, GRAPH_URL};
use crate::types::{Engagement, GraphList, SocialPost};
use crate::{get_json, Result, SocialApiError};

const MEDIA_FIELDS: &str = "id,caption,media_url,permalink,timestamp,like_count,comments_count,username";

/// Instagram Graph client. Hashtag search requires a business account id.
pub struct InstagramClient {
    client: reqwest::Client,
    access_token: String,
    business_account_id: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct HashtagRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Media {
    id: String,
    caption: Option<String>,
    media_url: Option<String>,
    permalink: Option<String>,
    timestamp: Option<String>,
    like_count: Option<i64>,
    comments_count: Option<i64>,
    username: Option<String>,
}

impl InstagramClient {
    pub fn new(access_token: String, business_account_id: String) -> Self {
        Self {
            client: crate::http_client(),
            access_token,
            business_account_id,
            base_url: GRAPH_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Recent media for a hashtag (without the leading `#`).
    pub async fn hashtag_recent_media(&self, hashtag: &str, limit: u32) -> Result<Vec<SocialPost>> {
        let tag = hashtag.trim().trim_start_matches('#');
        if tag.is_empty() {
            return Err(SocialApiError::InvalidRequest("empty hashtag".into()));
        }

        let search = self
            .client
            .get(format!("{}/ig_hashtag_search", self.base_url))
            .query(&[
                ("user_id", self.business_account_id.as_str()),
                ("q", tag),
                ("access_token", self.access_token.as_str()),
            ]);
        let found: GraphList<HashtagRef> = get_json("instagram", search).await?;

        let Some(hashtag) = found.data.into_iter().next() else {
            tracing::debug!(hashtag = tag, "Hashtag not found on Instagram");
            return Ok(Vec::new());
        };

        let request = self
            .client
            .get(format!("{}/{}/recent_media", self.base_url, hashtag.id))
            .query(&[
                ("user_id", self.business_account_id.as_str()),
                ("fields", MEDIA_FIELDS),
                ("limit", &limit.min(50).to_string()),
                ("access_token", self.access_token.as_str()),
            ]);
        let media: GraphList<Media> = get_json("instagram", request).await?;

        Ok(media.data.into_iter().filter_map(normalize).collect())
    }
}

fn normalize(media: Media) -> Option<SocialPost> {
    let text = media.caption.filter(|c| !c.trim().is_empty())?;
    Some(SocialPost {
        platform: "instagram".into(),
        post_id: media.id,
        text,
        author_name: None,
        author_handle: media.username,
        url: media.permalink,
        media_url: media.media_url,
        language: None,
        engagement: Engagement {
            likes: media.like_count.unwrap_or(0),
            comments: media.comments_count.unwrap_or(0),
            shares: 0,
            views: 0,
        },
        published_at: media.timestamp.as_deref().and_then(parse_graph_time),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captionless_media_is_dropped() {
        let media = Media {
            id: "1".into(),
            caption: Some("   ".into()),
            media_url: None,
            permalink: None,
            timestamp: None,
            like_count: Some(5),
            comments_count: None,
            username: None,
        };
        assert!(normalize(media).is_none());
    }

    #[test]
    fn counters_default_to_zero() {
        let raw = serde_json::json!({
            "id": "17900",
            "caption": "#انتخابات_العراق",
            "timestamp": "2024-05-01T10:00:00+0000"
        });
        let media: Media = serde_json::from_value(raw).unwrap();
        let post = normalize(media).unwrap();
        assert_eq!(post.engagement, Engagement::default());
        assert_eq!(post.platform, "instagram");
    }
}
