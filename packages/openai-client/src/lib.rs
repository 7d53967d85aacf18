//! Chat completion client for OpenAI-compatible providers.
//!
//! # Example
//!
//! ```rust,ignore
//! use openai_client::{ChatRequest, Message, OpenAIClient, Provider};
//!
//! let client = OpenAIClient::for_provider(Provider::Groq, "gsk-...");
//! let response = client
//!     .chat_completion(
//!         ChatRequest::new(client.default_model())
//!             .message(Message::user("Hello!"))
//!             .max_tokens(200),
//!     )
//!     .await?;
//! ```

pub mod error;
pub mod types;

pub use error::{OpenAIError, Result};
pub use types::*;

use reqwest::Client;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    provider: Provider,
}

impl OpenAIClient {
    /// OpenAI client with the default base URL.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::for_provider(Provider::OpenAI, api_key)
    }

    pub fn for_provider(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: provider.base_url().to_string(),
            provider,
        }
    }

    /// Reads the provider's key variable (`OPENAI_API_KEY`, `GROQ_API_KEY`, ...).
    pub fn from_env(provider: Provider) -> Result<Self> {
        let api_key = std::env::var(provider.env_key())
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| OpenAIError::Config(format!("{} not set", provider.env_key())))?;
        Ok(Self::for_provider(provider, api_key))
    }

    /// Set a custom base URL (proxies, local test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn default_model(&self) -> &'static str {
        self.provider.default_model()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();
        let provider = self.provider.name();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(provider, error = %e, "Chat completion request failed");
                OpenAIError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(provider, status = %status, error = %error_text, "Chat completion API error");
            return Err(OpenAIError::Api {
                provider,
                status: status.as_u16(),
                message: error_text,
            });
        }

        let raw: types::ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| OpenAIError::Parse(e.to_string()))?;

        let response = into_response(raw, &request.model)?;

        debug!(
            provider,
            model = %response.model,
            duration_ms = start.elapsed().as_millis(),
            "Chat completion"
        );

        Ok(response)
    }
}

fn into_response(raw: types::ChatResponseRaw, requested_model: &str) -> Result<ChatResponse> {
    let content = raw
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| OpenAIError::Parse("response contained no message content".into()))?;

    Ok(ChatResponse {
        content,
        model: raw.model.unwrap_or_else(|| requested_model.to_string()),
        usage: raw.usage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_presets() {
        let client = OpenAIClient::for_provider(Provider::Groq, "gsk-test");
        assert_eq!(client.base_url(), "https://api.groq.com/openai/v1");
        assert_eq!(client.default_model(), "llama-3.3-70b-versatile");

        let client = OpenAIClient::new("sk-test").with_base_url("http://localhost:9999");
        assert_eq!(client.provider(), Provider::OpenAI);
        assert_eq!(client.base_url(), "http://localhost:9999");
    }

    #[test]
    fn json_object_request_serializes_response_format() {
        let request = ChatRequest::new("gpt-4o-mini")
            .message(Message::system("Reply in JSON"))
            .message(Message::user("hi"))
            .json_object();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn empty_choice_is_a_parse_error() {
        let raw: types::ChatResponseRaw = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        }))
        .unwrap();
        assert!(matches!(into_response(raw, "m"), Err(OpenAIError::Parse(_))));
    }

    #[test]
    fn falls_back_to_requested_model_name() {
        let raw: types::ChatResponseRaw = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"content": "hello"}}],
            "usage": {"prompt_tokens": 1, "completion_tokens": 2, "total_tokens": 3}
        }))
        .unwrap();
        let response = into_response(raw, "llama").unwrap();
        assert_eq!(response.model, "llama");
        assert_eq!(response.usage.unwrap().total_tokens, 3);
    }
}
