use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub allowed_origins: Vec<String>,
    pub test_identifier_enabled: bool,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_verify_service_sid: String,
    pub twilio_from_number: Option<String>,
    pub alert_phone_numbers: Vec<String>,
    pub llm: LlmKeys,
    pub platforms: PlatformCredentials,
    pub collection: CollectionSettings,
}

/// Keys for the OpenAI-compatible providers, tried in order Groq, OpenAI, Gemini.
#[derive(Debug, Clone, Default)]
pub struct LlmKeys {
    pub groq_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
}

/// A platform collector is enabled only when its credentials are present.
#[derive(Debug, Clone, Default)]
pub struct PlatformCredentials {
    pub facebook_access_token: Option<String>,
    pub instagram_access_token: Option<String>,
    pub instagram_business_account_id: Option<String>,
    pub youtube_api_key: Option<String>,
    pub twitter_bearer_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CollectionSettings {
    pub enabled: bool,
    pub max_concurrency: usize,
    pub collector_timeout_secs: u64,
    pub retention_days: i32,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_concurrency: 4,
            collector_timeout_secs: 60,
            retention_days: 30,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "hamlatai".to_string()),
            allowed_origins: list_var("ALLOWED_ORIGINS"),
            test_identifier_enabled: flag_var("TEST_IDENTIFIER_ENABLED", false)?,
            twilio_account_sid: env::var("TWILIO_ACCOUNT_SID")
                .context("TWILIO_ACCOUNT_SID must be set")?,
            twilio_auth_token: env::var("TWILIO_AUTH_TOKEN")
                .context("TWILIO_AUTH_TOKEN must be set")?,
            twilio_verify_service_sid: env::var("TWILIO_VERIFY_SERVICE_SID")
                .context("TWILIO_VERIFY_SERVICE_SID must be set")?,
            twilio_from_number: optional_var("TWILIO_FROM_NUMBER"),
            alert_phone_numbers: list_var("ALERT_PHONE_NUMBERS"),
            llm: LlmKeys {
                groq_api_key: optional_var("GROQ_API_KEY"),
                openai_api_key: optional_var("OPENAI_API_KEY"),
                gemini_api_key: optional_var("GEMINI_API_KEY"),
            },
            platforms: PlatformCredentials::from_env(),
            collection: CollectionSettings::from_env()?,
        })
    }
}

impl PlatformCredentials {
    pub fn from_env() -> Self {
        Self {
            facebook_access_token: optional_var("FACEBOOK_ACCESS_TOKEN"),
            instagram_access_token: optional_var("INSTAGRAM_ACCESS_TOKEN"),
            instagram_business_account_id: optional_var("INSTAGRAM_BUSINESS_ACCOUNT_ID"),
            youtube_api_key: optional_var("YOUTUBE_API_KEY"),
            twitter_bearer_token: optional_var("TWITTER_BEARER_TOKEN"),
        }
    }
}

impl CollectionSettings {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            enabled: flag_var("COLLECTION_ENABLED", defaults.enabled)?,
            max_concurrency: parsed_var("COLLECTION_MAX_CONCURRENCY", defaults.max_concurrency)?,
            collector_timeout_secs: parsed_var(
                "COLLECTION_TIMEOUT_SECS",
                defaults.collector_timeout_secs,
            )?,
            retention_days: parsed_var("MENTION_RETENTION_DAYS", defaults.retention_days)?,
        })
    }
}

/// Unset and blank both count as missing.
fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn list_var(key: &str) -> Vec<String> {
    optional_var(key)
        .map(|v| split_list(&v))
        .unwrap_or_default()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn flag_var(key: &str, default: bool) -> Result<bool> {
    match optional_var(key) {
        None => Ok(default),
        Some(v) => parse_flag(&v).with_context(|| format!("{} must be true or false", key)),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parsed_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match optional_var(key) {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .ok()
            .with_context(|| format!("{} has an invalid value", key)),
    }
}
