use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::{Engagement, GraphList, GraphSummaryEdge, SocialPost};
use crate::{get_json, Result, SocialApiError};

pub(crate) const GRAPH_URL: &str = "https://graph.facebook.com/v18.0";

const POST_FIELDS: &str =
    "id,message,created_time,permalink_url,full_picture,from,shares,reactions.summary(true),comments.summary(true)";

/// Facebook Graph client for public page posts.
pub struct FacebookClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PagePost {
    id: String,
    message: Option<String>,
    created_time: Option<String>,
    permalink_url: Option<String>,
    full_picture: Option<String>,
    from: Option<PageRef>,
    shares: Option<ShareCount>,
    #[serde(default)]
    reactions: GraphSummaryEdge,
    #[serde(default)]
    comments: GraphSummaryEdge,
}

#[derive(Debug, Deserialize)]
struct PageRef {
    id: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShareCount {
    count: i64,
}

impl FacebookClient {
    pub fn new(access_token: String) -> Self {
        Self {
            client: crate::http_client(),
            access_token,
            base_url: GRAPH_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Latest posts of a page. Posts without a message are skipped.
    pub async fn page_posts(&self, page_id: &str, limit: u32) -> Result<Vec<SocialPost>> {
        if page_id.trim().is_empty() {
            return Err(SocialApiError::InvalidRequest("empty page id".into()));
        }

        tracing::debug!(page_id, limit, "Fetching Facebook page posts");

        let url = format!("{}/{}/posts", self.base_url, page_id);
        let request = self.client.get(&url).query(&[
            ("fields", POST_FIELDS),
            ("limit", &limit.min(100).to_string()),
            ("access_token", &self.access_token),
        ]);

        let list: GraphList<PagePost> = get_json("facebook", request).await?;
        Ok(list.data.into_iter().filter_map(normalize).collect())
    }
}

fn normalize(post: PagePost) -> Option<SocialPost> {
    let text = post.message.filter(|m| !m.trim().is_empty())?;
    let (author_handle, author_name) = match post.from {
        Some(page) => (page.id, page.name),
        None => (None, None),
    };

    Some(SocialPost {
        platform: "facebook".into(),
        post_id: post.id,
        text,
        author_name,
        author_handle,
        url: post.permalink_url,
        media_url: post.full_picture,
        language: None,
        engagement: Engagement {
            likes: post.reactions.summary.total_count,
            comments: post.comments.summary.total_count,
            shares: post.shares.map(|s| s.count).unwrap_or(0),
            views: 0,
        },
        published_at: post.created_time.as_deref().and_then(parse_graph_time),
    })
}

/// Graph timestamps look like `2024-05-01T10:00:00+0000`, which is not RFC 3339.
pub(crate) fn parse_graph_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_page_post_with_summaries() {
        let raw = serde_json::json!({
            "data": [{
                "id": "123_456",
                "message": "هەڵبژاردن نزیکە",
                "created_time": "2024-05-01T10:00:00+0000",
                "permalink_url": "https://facebook.com/123/posts/456",
                "from": {"id": "123", "name": "Page"},
                "shares": {"count": 4},
                "reactions": {"summary": {"total_count": 20}},
                "comments": {"summary": {"total_count": 3}}
            }, {
                "id": "123_789"
            }]
        });

        let list: GraphList<PagePost> = serde_json::from_value(raw).unwrap();
        let posts: Vec<_> = list.data.into_iter().filter_map(normalize).collect();

        assert_eq!(posts.len(), 1);
        let post = &posts[0];
        assert_eq!(post.post_id, "123_456");
        assert_eq!(post.engagement.likes, 20);
        assert_eq!(post.engagement.comments, 3);
        assert_eq!(post.engagement.shares, 4);
        assert_eq!(post.author_name.as_deref(), Some("Page"));
        assert!(post.published_at.is_some());
    }

    #[test]
    fn parses_graph_offsets() {
        assert!(parse_graph_time("2024-05-01T10:00:00+0000").is_some());
        assert!(parse_graph_time("2024-05-01T10:00:00Z").is_some());
        assert!(parse_graph_time("yesterday").is_none());
    }
}
