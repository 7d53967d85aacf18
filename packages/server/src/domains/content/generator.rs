use anyhow::anyhow;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

use super::models::{ContentStatus, GeneratedContent, NewGeneratedContent};
use crate::common::ApiError;
use crate::domains::auth::{Tier, User};
use crate::domains::language::Dialect;
use crate::domains::mentions::Platform;
use crate::domains::regions::Governorate;
use crate::kernel::BaseAI;

const CONTENT_TYPES: [&str; 4] = ["post", "speech", "slogan", "response"];
const MAX_TOPIC_CHARS: usize = 300;
const MAX_HASHTAGS: usize = 10;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Content generation is not configured")]
    NotConfigured,

    #[error("Content generation failed")]
    GenerationFailed(#[source] anyhow::Error),

    #[error("Content not found")]
    NotFound,

    #[error("Upgrade your plan to use locked content")]
    Locked,

    #[error("Content is already published")]
    AlreadyPublished,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::InvalidInput(msg) => ApiError::BadRequest(msg),
            ContentError::NotConfigured | ContentError::GenerationFailed(_) => {
                ApiError::ServiceUnavailable(err.to_string())
            }
            ContentError::NotFound => ApiError::NotFound("Content"),
            ContentError::Locked => ApiError::Forbidden(err.to_string()),
            ContentError::AlreadyPublished => ApiError::Conflict(err.to_string()),
            ContentError::Internal(e) => ApiError::Internal(e),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentRequest {
    pub topic: String,
    pub content_type: Option<String>,
    pub platform: Option<String>,
}

/// Validated request. Type defaults to `post`, platform to `facebook`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentBrief {
    pub topic: String,
    pub content_type: String,
    pub platform: Platform,
}

impl ContentRequest {
    pub fn validate(&self) -> Result<ContentBrief, ContentError> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(ContentError::InvalidInput("Topic is required".into()));
        }
        if topic.chars().count() > MAX_TOPIC_CHARS {
            return Err(ContentError::InvalidInput("Topic is too long".into()));
        }

        let content_type = self
            .content_type
            .as_deref()
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "post".to_string());
        if !CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(ContentError::InvalidInput(format!(
                "Content type must be one of {}",
                CONTENT_TYPES.join(", ")
            )));
        }

        let platform = match self.platform.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(raw) => raw
                .parse::<Platform>()
                .map_err(|_| ContentError::InvalidInput("Unknown platform".into()))?,
            None => Platform::Facebook,
        };

        Ok(ContentBrief {
            topic: topic.to_string(),
            content_type,
            platform,
        })
    }
}

/// Dialect to write in: the account's own, else the default for its language.
pub fn content_dialect(user: &User) -> Dialect {
    if let Some(dialect) = user.dialect.as_deref().and_then(|d| d.parse().ok()) {
        return dialect;
    }
    match user.language.as_str() {
        "ku" => match Governorate::parse(&user.governorate) {
            Some(Governorate::Duhok) => Dialect::Badini,
            _ => Dialect::Sorani,
        },
        "en" => Dialect::English,
        _ => Dialect::Arabic,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedContent {
    pub body: String,
    pub hashtags: Vec<String>,
}

#[derive(Deserialize)]
struct ContentJson {
    content: String,
    #[serde(default)]
    hashtags: Vec<String>,
}

/// Reads a `{content, hashtags}` reply, tolerating code fences; anything else is
/// taken as plain text with its `#tags` collected.
pub fn parse_generated(raw: &str) -> ParsedContent {
    let trimmed = strip_fences(raw.trim());

    if let Ok(json) = serde_json::from_str::<ContentJson>(trimmed) {
        if !json.content.trim().is_empty() {
            let mut hashtags: Vec<String> = Vec::new();
            for tag in json.hashtags.iter().map(|h| normalize_hashtag(h)) {
                if tag.len() > 1 && !hashtags.contains(&tag) {
                    hashtags.push(tag);
                }
            }
            if hashtags.is_empty() {
                hashtags = hashtags_in(&json.content);
            }
            hashtags.truncate(MAX_HASHTAGS);
            return ParsedContent {
                body: json.content.trim().to_string(),
                hashtags,
            };
        }
    }

    let mut hashtags = hashtags_in(trimmed);
    hashtags.truncate(MAX_HASHTAGS);
    ParsedContent {
        body: trimmed.to_string(),
        hashtags,
    }
}

fn strip_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn normalize_hashtag(tag: &str) -> String {
    let tag = tag.trim().trim_start_matches('#');
    format!("#{}", tag.replace(char::is_whitespace, "_"))
}

lazy_static! {
    static ref HASHTAG: Regex = Regex::new(r"#[\p{L}\p{N}_]+").unwrap();
}

fn hashtags_in(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for m in HASHTAG.find_iter(text) {
        let tag = m.as_str().to_string();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

fn instructions(user: &User, dialect: Dialect, brief: &ContentBrief) -> (String, String) {
    let system = format!(
        "You write {} campaign {}s for Iraqi election candidates. Write in {}. \
         Reply with a JSON object {{\"content\": string, \"hashtags\": [string]}}.",
        brief.platform, brief.content_type, dialect
    );
    let mut prompt = format!(
        "Candidate: {}\nGovernorate: {}\nTopic: {}",
        user.name, user.governorate, brief.topic
    );
    if let Some(party) = &user.party {
        prompt.push_str(&format!("\nParty: {}", party));
    }
    (system, prompt)
}

/// Generates and stores one piece of content. Free-tier output is stored `locked`.
pub async fn generate_content(
    user: &User,
    brief: &ContentBrief,
    ai: Option<&dyn BaseAI>,
    pool: &PgPool,
) -> Result<GeneratedContent, ContentError> {
    let ai = ai.ok_or(ContentError::NotConfigured)?;
    let dialect = content_dialect(user);
    let (system, prompt) = instructions(user, dialect, brief);

    let completion = ai.complete_json(&system, &prompt).await.map_err(|e| {
        warn!(user_id = %user.id, error = %e, "Content generation failed");
        ContentError::GenerationFailed(e)
    })?;

    let parsed = parse_generated(&completion.text);
    if parsed.body.is_empty() {
        return Err(ContentError::GenerationFailed(anyhow!("empty completion")));
    }

    let status = if user.tier() == Tier::Free {
        ContentStatus::Locked
    } else {
        ContentStatus::Draft
    };

    let content = GeneratedContent::insert(
        &NewGeneratedContent {
            user_id: user.id,
            topic: brief.topic.clone(),
            content_type: brief.content_type.clone(),
            platform: brief.platform.as_str().to_string(),
            dialect: dialect.as_str().to_string(),
            body: parsed.body,
            hashtags: parsed.hashtags,
            status,
            provider: completion.provider,
        },
        pool,
    )
    .await?;

    info!(
        user_id = %user.id,
        content_id = %content.id,
        provider = %content.provider,
        status = status.as_str(),
        "Content generated"
    );
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_reply() {
        let parsed = parse_generated(
            r##"{"content": "نوێکردنەوەی کارەبا", "hashtags": ["هەڵبژاردن", "#سلێمانی", "#هەڵبژاردن"]}"##,
        );
        assert_eq!(parsed.body, "نوێکردنەوەی کارەبا");
        assert_eq!(
            parsed.hashtags,
            vec!["#هەڵبژاردن".to_string(), "#سلێمانی".to_string()]
        );
    }

    #[test]
    fn parses_fenced_json() {
        let parsed = parse_generated("```json\n{\"content\": \"Vote for change\", \"hashtags\": []}\n```");
        assert_eq!(parsed.body, "Vote for change");
        assert!(parsed.hashtags.is_empty());
    }

    #[test]
    fn plain_text_collects_hashtags() {
        let parsed = parse_generated("Better schools for Erbil. #Erbil #Education, #Erbil");
        assert_eq!(parsed.body, "Better schools for Erbil. #Erbil #Education, #Erbil");
        assert_eq!(parsed.hashtags, vec!["#Erbil".to_string(), "#Education".to_string()]);
    }

    #[test]
    fn request_defaults_and_validation() {
        let brief = ContentRequest {
            topic: "  water ".into(),
            content_type: None,
            platform: None,
        }
        .validate()
        .unwrap();
        assert_eq!(brief.topic, "water");
        assert_eq!(brief.content_type, "post");
        assert_eq!(brief.platform, Platform::Facebook);

        let bad = ContentRequest {
            topic: "".into(),
            content_type: None,
            platform: None,
        };
        assert!(matches!(bad.validate(), Err(ContentError::InvalidInput(_))));

        let bad = ContentRequest {
            topic: "x".into(),
            content_type: Some("novel".into()),
            platform: None,
        };
        assert!(matches!(bad.validate(), Err(ContentError::InvalidInput(_))));
    }
}
