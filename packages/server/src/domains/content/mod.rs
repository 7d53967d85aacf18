//! Content domain: AI-assisted campaign posts per candidate account.

pub mod daily;
pub mod generator;
pub mod lifecycle;
pub mod models;

pub use daily::{daily_topic, generate_daily_content};
pub use generator::{
    content_dialect, generate_content, parse_generated, ContentError, ContentRequest, ContentBrief,
    ParsedContent,
};
pub use lifecycle::{delete_content, parse_schedule_time, publish_content, schedule_content};
pub use models::{ContentStats, ContentStatus, GeneratedContent};
