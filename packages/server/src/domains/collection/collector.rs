use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use social_client::SocialPost;

use crate::common::{CandidateId, UserId};
use crate::domains::language::Dialect;
use crate::domains::mentions::Platform;
use crate::domains::regions::{Governorate, PriorityTier};

/// A post as produced by a collector, before classification.
#[derive(Debug, Clone, Serialize)]
pub struct RawMention {
    pub platform: Platform,
    pub content: String,
    pub author_name: Option<String>,
    pub author_handle: Option<String>,
    pub post_id: Option<String>,
    pub post_url: Option<String>,
    pub media_url: Option<String>,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub views: i64,
    /// Set when the source already knows the dialect.
    pub dialect: Option<Dialect>,
    /// Set when the source is tied to a governorate (e.g. a candidate's page).
    pub governorate: Option<Governorate>,
    /// Candidate owning the registered account the post came from.
    pub candidate_id: Option<CandidateId>,
    /// Tenant owning the account; their posts are stored privately.
    pub user_id: Option<UserId>,
    pub published_at: Option<DateTime<Utc>>,
}

impl RawMention {
    pub fn new(platform: Platform, content: impl Into<String>) -> Self {
        Self {
            platform,
            content: content.into(),
            author_name: None,
            author_handle: None,
            post_id: None,
            post_url: None,
            media_url: None,
            likes: 0,
            comments: 0,
            shares: 0,
            views: 0,
            dialect: None,
            governorate: None,
            candidate_id: None,
            user_id: None,
            published_at: None,
        }
    }

    /// Normalizes a social-client post. The platform's language hint is kept
    /// only when it names a dialect we recognise.
    pub fn from_post(platform: Platform, post: SocialPost) -> Self {
        Self {
            platform,
            content: post.text,
            author_name: post.author_name,
            author_handle: post.author_handle,
            post_id: Some(post.post_id).filter(|id| !id.is_empty()),
            post_url: post.url,
            media_url: post.media_url,
            likes: post.engagement.likes,
            comments: post.engagement.comments,
            shares: post.engagement.shares,
            views: post.engagement.views,
            dialect: post.language.as_deref().and_then(|l| l.parse().ok()),
            governorate: None,
            candidate_id: None,
            user_id: None,
            published_at: post.published_at,
        }
    }

    pub fn with_governorate(mut self, governorate: Option<Governorate>) -> Self {
        self.governorate = governorate;
        self
    }

    /// Attributes the post to whoever registered `handle`.
    pub fn from_handle(mut self, handle: &SocialHandle) -> Self {
        match handle.owner {
            HandleOwner::Candidate(id) => self.candidate_id = Some(id),
            HandleOwner::Tenant(id) => self.user_id = Some(id),
        }
        self.governorate = self.governorate.or(handle.governorate);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOwner {
    /// Listed on a public candidate profile.
    Candidate(CandidateId),
    /// Connected by a tenant on their own account.
    Tenant(UserId),
}

/// A platform account whose posts are collected directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialHandle {
    pub owner: HandleOwner,
    pub platform: Platform,
    pub handle: String,
    pub governorate: Option<Governorate>,
}

/// What one collection cycle for a tier looks for.
#[derive(Debug, Clone)]
pub struct CollectionTarget {
    pub tier: PriorityTier,
    pub governorates: Vec<Governorate>,
    pub dialects: Vec<Dialect>,
    pub search_terms: Vec<String>,
    pub handles: Vec<SocialHandle>,
}

impl CollectionTarget {
    /// Target for a tier with its languages' election keywords and no handles.
    pub fn for_tier(tier: PriorityTier) -> Self {
        let dialects = tier.languages().to_vec();
        let mut search_terms: Vec<String> = Vec::new();
        for dialect in &dialects {
            for term in dialect.search_terms() {
                if !search_terms.iter().any(|t| t == term) {
                    search_terms.push(term.to_string());
                }
            }
        }

        Self {
            tier,
            governorates: tier.governorates(),
            dialects,
            search_terms,
            handles: Vec::new(),
        }
    }

    pub fn with_handles(mut self, handles: Vec<SocialHandle>) -> Self {
        self.handles = handles;
        self
    }

    pub fn handles_for(&self, platform: Platform) -> impl Iterator<Item = &SocialHandle> {
        self.handles.iter().filter(move |h| h.platform == platform)
    }

    /// Terms usable as hashtags (no whitespace), at most `limit`.
    pub fn hashtags(&self, limit: usize) -> Vec<String> {
        self.search_terms
            .iter()
            .map(|t| t.split_whitespace().collect::<Vec<_>>().join("_"))
            .filter(|t| !t.is_empty())
            .take(limit)
            .collect()
    }

    /// Governorate assumed for posts that name none.
    pub fn default_governorate(&self) -> Option<Governorate> {
        self.governorates.first().copied()
    }
}

/// A source of raw mentions.
#[async_trait]
pub trait Collector: Send + Sync {
    fn name(&self) -> &'static str;

    fn platform(&self) -> Platform;

    async fn collect(&self, target: &CollectionTarget) -> Result<Vec<RawMention>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use social_client::Engagement;

    #[test]
    fn target_merges_dialect_terms() {
        let target = CollectionTarget::for_tier(PriorityTier::Kirkuk);
        assert_eq!(target.dialects, vec![Dialect::Kurmanji, Dialect::Arabic]);
        assert_eq!(target.governorates, vec![Governorate::Kirkuk]);
        for term in Dialect::Arabic.search_terms() {
            assert!(target.search_terms.iter().any(|t| t == term));
        }
        assert_eq!(target.default_governorate(), Some(Governorate::Kirkuk));
    }

    #[test]
    fn hashtags_have_no_spaces() {
        let target = CollectionTarget::for_tier(PriorityTier::Baghdad);
        let tags = target.hashtags(3);
        assert!(tags.len() <= 3);
        assert!(tags.iter().all(|t| !t.contains(' ')));
    }

    #[test]
    fn from_post_keeps_engagement_and_known_language() {
        let post = SocialPost {
            platform: "twitter".into(),
            post_id: "123".into(),
            text: "hello".into(),
            author_name: Some("A".into()),
            author_handle: Some("a".into()),
            url: None,
            media_url: None,
            language: Some("ar".into()),
            engagement: Engagement {
                likes: 3,
                comments: 2,
                shares: 1,
                views: 0,
            },
            published_at: None,
        };
        let raw = RawMention::from_post(Platform::Twitter, post);
        assert_eq!(raw.post_id.as_deref(), Some("123"));
        assert_eq!(raw.likes, 3);
        assert_eq!(raw.dialect, Some(Dialect::Arabic));

        let mut unknown = RawMention::from_post(
            Platform::Twitter,
            SocialPost {
                platform: "twitter".into(),
                post_id: String::new(),
                text: "x".into(),
                author_name: None,
                author_handle: None,
                url: None,
                media_url: None,
                language: Some("und".into()),
                engagement: Engagement::default(),
                published_at: None,
            },
        );
        assert_eq!(unknown.dialect, None);
        assert_eq!(unknown.post_id, None);
        unknown = unknown.with_governorate(Some(Governorate::Erbil));
        assert_eq!(unknown.governorate, Some(Governorate::Erbil));
    }

    #[test]
    fn handle_posts_carry_their_owner() {
        let candidate = CandidateId::new();
        let handle = SocialHandle {
            owner: HandleOwner::Candidate(candidate),
            platform: Platform::Facebook,
            handle: "page".into(),
            governorate: Some(Governorate::Duhok),
        };
        let raw = RawMention::new(Platform::Facebook, "Thanks for coming").from_handle(&handle);
        assert_eq!(raw.candidate_id, Some(candidate));
        assert_eq!(raw.user_id, None);
        assert_eq!(raw.governorate, Some(Governorate::Duhok));
    }

    #[test]
    fn tenant_posts_stay_private_to_the_tenant() {
        let tenant = UserId::new();
        let handle = SocialHandle {
            owner: HandleOwner::Tenant(tenant),
            platform: Platform::Facebook,
            handle: "my.page".into(),
            governorate: Some(Governorate::Erbil),
        };
        let raw = RawMention::new(Platform::Facebook, "Visit to Kirkuk")
            .with_governorate(Some(Governorate::Kirkuk))
            .from_handle(&handle);
        assert_eq!(raw.user_id, Some(tenant));
        assert_eq!(raw.candidate_id, None);
        assert_eq!(raw.governorate, Some(Governorate::Kirkuk));
    }
}
