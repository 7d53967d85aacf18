//! Typed ids for every persisted entity.
//!
//! ```rust,ignore
//! let candidate: CandidateId = CandidateId::new();
//! let mention: MentionId = MentionId::new();
//! // let wrong: MentionId = candidate; // does not compile
//! ```

pub use super::id::Id;

/// Signed-in candidate account (tenant).
pub struct User;

/// Tracked political candidate profile.
pub struct Candidate;

pub struct Mention;

/// Article stored by the web scraper.
pub struct ScrapedArticle;

/// One recorded collection cycle.
pub struct CollectionRun;

pub struct GeneratedContent;

/// Platform account registered by a tenant.
pub struct SocialAccount;

pub type UserId = Id<User>;
pub type CandidateId = Id<Candidate>;
pub type MentionId = Id<Mention>;
pub type ScrapedArticleId = Id<ScrapedArticle>;
pub type CollectionRunId = Id<CollectionRun>;
pub type ContentId = Id<GeneratedContent>;
pub type SocialAccountId = Id<SocialAccount>;
