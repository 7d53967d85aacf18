pub mod generated_content;

pub use generated_content::{ContentStats, ContentStatus, GeneratedContent, NewGeneratedContent};
