use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::{Engagement, SocialPost};
use crate::{get_json, Result, SocialApiError};

const BASE_URL: &str = "https://api.twitter.com/2";

/// X (Twitter) API v2 client using an app bearer token.
pub struct TwitterClient {
    client: reqwest::Client,
    bearer_token: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Tweet>,
    includes: Option<Includes>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: String,
    text: String,
    author_id: Option<String>,
    lang: Option<String>,
    created_at: Option<DateTime<Utc>>,
    public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Default, Deserialize)]
struct PublicMetrics {
    #[serde(default)]
    like_count: i64,
    #[serde(default)]
    reply_count: i64,
    #[serde(default)]
    retweet_count: i64,
    #[serde(default)]
    quote_count: i64,
    #[serde(default)]
    impression_count: i64,
}

#[derive(Debug, Deserialize)]
struct Includes {
    #[serde(default)]
    users: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
    name: String,
    username: String,
}

impl TwitterClient {
    pub fn new(bearer_token: String) -> Self {
        Self {
            client: crate::http_client(),
            bearer_token,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Recent search (last 7 days). The API accepts 10..=100 results per page.
    pub async fn search_recent(&self, query: &str, limit: u32) -> Result<Vec<SocialPost>> {
        if query.trim().is_empty() {
            return Err(SocialApiError::InvalidRequest("empty query".into()));
        }

        let max_results = limit.clamp(10, 100).to_string();
        let request = self
            .client
            .get(format!("{}/tweets/search/recent", self.base_url))
            .bearer_auth(&self.bearer_token)
            .query(&[
                ("query", query),
                ("max_results", max_results.as_str()),
                ("tweet.fields", "created_at,public_metrics,lang,author_id"),
                ("expansions", "author_id"),
                ("user.fields", "username,name"),
            ]);

        let response: SearchResponse = get_json("twitter", request).await?;
        Ok(normalize(response))
    }
}

fn normalize(response: SearchResponse) -> Vec<SocialPost> {
    let users: HashMap<String, User> = response
        .includes
        .map(|i| i.users)
        .unwrap_or_default()
        .into_iter()
        .map(|u| (u.id.clone(), u))
        .collect();

    response
        .data
        .into_iter()
        .map(|tweet| {
            let author = tweet.author_id.as_ref().and_then(|id| users.get(id));
            let metrics = tweet.public_metrics.unwrap_or_default();
            let url = author
                .map(|u| format!("https://x.com/{}/status/{}", u.username, tweet.id))
                .or_else(|| Some(format!("https://x.com/i/web/status/{}", tweet.id)));

            SocialPost {
                platform: "twitter".into(),
                url,
                post_id: tweet.id,
                text: tweet.text,
                author_name: author.map(|u| u.name.clone()),
                author_handle: author.map(|u| u.username.clone()),
                media_url: None,
                language: tweet.lang,
                engagement: Engagement {
                    likes: metrics.like_count,
                    comments: metrics.reply_count,
                    shares: metrics.retweet_count + metrics.quote_count,
                    views: metrics.impression_count,
                },
                published_at: tweet.created_at,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_authors_from_includes() {
        let raw = serde_json::json!({
            "data": [{
                "id": "1",
                "text": "الانتخابات في بغداد",
                "author_id": "u1",
                "lang": "ar",
                "created_at": "2024-05-01T10:00:00.000Z",
                "public_metrics": {"like_count": 10, "reply_count": 2, "retweet_count": 3, "quote_count": 1}
            }, {
                "id": "2",
                "text": "no author",
                "author_id": "missing"
            }],
            "includes": {"users": [{"id": "u1", "name": "Voter", "username": "voter_iq"}]}
        });

        let response: SearchResponse = serde_json::from_value(raw).unwrap();
        let posts = normalize(response);

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].author_handle.as_deref(), Some("voter_iq"));
        assert_eq!(posts[0].engagement.shares, 4);
        assert_eq!(posts[0].url.as_deref(), Some("https://x.com/voter_iq/status/1"));
        assert!(posts[1].author_handle.is_none());
        assert_eq!(posts[1].url.as_deref(), Some("https://x.com/i/web/status/2"));
    }

    #[test]
    fn empty_result_has_no_data_key() {
        let raw = serde_json::json!({"meta": {"result_count": 0}});
        let response: SearchResponse = serde_json::from_value(raw).unwrap();
        assert!(normalize(response).is_empty());
    }
}
