pub mod filter;
pub mod mention;
pub mod stats;

pub use filter::MentionFilter;
pub use mention::{Mention, NewMention, UpsertOutcome};
pub use stats::{AuthorStats, PlatformStats, RepeatedContent};
