use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Engagement counters as reported by the platform. Missing counters are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub views: i64,
}

/// A post normalized across platforms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialPost {
    pub platform: String,
    pub post_id: String,
    pub text: String,
    pub author_name: Option<String>,
    pub author_handle: Option<String>,
    pub url: Option<String>,
    pub media_url: Option<String>,
    pub language: Option<String>,
    pub engagement: Engagement,
    pub published_at: Option<DateTime<Utc>>,
}

/// Graph API list envelope (`{"data": [...]}`), shared by Facebook and Instagram.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GraphList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Graph API `{"summary": {"total_count": n}}` edge.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GraphSummaryEdge {
    #[serde(default)]
    pub summary: GraphSummary,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GraphSummary {
    #[serde(default)]
    pub total_count: i64,
}
