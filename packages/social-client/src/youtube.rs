use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::{Engagement, SocialPost};
use crate::{get_json, Result, SocialApiError};

const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// YouTube Data API v3 client (API-key auth).
pub struct YouTubeClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
    channel_id: Option<String>,
    channel_title: Option<String>,
    published_at: Option<DateTime<Utc>>,
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl YouTubeClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: crate::http_client(),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Searches videos published in Iraq matching `query`, newest first.
    pub async fn search_videos(
        &self,
        query: &str,
        language: Option<&str>,
        published_after: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<SocialPost>> {
        if query.trim().is_empty() {
            return Err(SocialApiError::InvalidRequest("empty query".into()));
        }

        let mut params: Vec<(&str, String)> = vec![
            ("part", "snippet".into()),
            ("type", "video".into()),
            ("order", "date".into()),
            ("regionCode", "IQ".into()),
            ("q", query.to_string()),
            ("maxResults", limit.clamp(1, 50).to_string()),
            ("key", self.api_key.clone()),
        ];
        if let Some(lang) = language {
            params.push(("relevanceLanguage", lang.to_string()));
        }
        if let Some(after) = published_after {
            params.push(("publishedAfter", after.to_rfc3339()));
        }

        let request = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&params);
        let response: SearchResponse = get_json("youtube", request).await?;

        Ok(response
            .items
            .into_iter()
            .filter_map(|item| normalize(item, language))
            .collect())
    }
}

fn normalize(item: SearchItem, language: Option<&str>) -> Option<SocialPost> {
    let video_id = item.id.video_id?;
    let snippet = item.snippet;
    let text = if snippet.description.trim().is_empty() {
        snippet.title
    } else {
        format!("{}\n{}", snippet.title, snippet.description)
    };

    Some(SocialPost {
        platform: "youtube".into(),
        url: Some(format!("https://www.youtube.com/watch?v={}", video_id)),
        post_id: video_id,
        text,
        author_name: snippet.channel_title,
        author_handle: snippet.channel_id,
        media_url: snippet.thumbnails.and_then(|t| t.high).map(|t| t.url),
        language: language.map(str::to_string),
        // Search results carry no statistics.
        engagement: Engagement::default(),
        published_at: snippet.published_at,
    })
}
