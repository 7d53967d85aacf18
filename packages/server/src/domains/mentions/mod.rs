//! Mentions domain: deduplicated storage and tenant-scoped queries over
//! social posts that reference candidates.

pub mod models;
pub mod platform;

pub use models::{
    AuthorStats, Mention, MentionFilter, NewMention, PlatformStats, RepeatedContent, UpsertOutcome,
};
pub use platform::Platform;
