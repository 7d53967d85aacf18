// BaseAI implementation over the OpenAI-compatible providers.
//
// Providers are tried in order; a failure moves on to the next one.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use openai_client::{ChatRequest, Message, OpenAIClient, Provider};
use tracing::warn;

use super::{BaseAI, Completion};
use crate::config::LlmKeys;

const MAX_TOKENS: u32 = 800;
const TEMPERATURE: f32 = 0.7;

pub struct FallbackAI {
    clients: Vec<OpenAIClient>,
}

impl FallbackAI {
    pub fn new(clients: Vec<OpenAIClient>) -> Self {
        Self { clients }
    }

    /// Groq, then OpenAI, then Gemini; providers without a key are skipped.
    /// Returns `None` when no key is configured.
    pub fn from_keys(keys: &LlmKeys) -> Option<Self> {
        let clients: Vec<OpenAIClient> = [
            (Provider::Groq, keys.groq_api_key.as_ref()),
            (Provider::OpenAI, keys.openai_api_key.as_ref()),
            (Provider::Gemini, keys.gemini_api_key.as_ref()),
        ]
        .into_iter()
        .filter_map(|(provider, key)| key.map(|k| OpenAIClient::for_provider(provider, k.clone())))
        .collect();

        if clients.is_empty() {
            None
        } else {
            Some(Self::new(clients))
        }
    }

    pub fn providers(&self) -> Vec<&'static str> {
        self.clients.iter().map(|c| c.provider().name()).collect()
    }

    async fn run(&self, system: &str, prompt: &str, json: bool) -> Result<Completion> {
        let mut last_error = None;

        for client in &self.clients {
            let mut request = ChatRequest::new(client.default_model())
                .message(Message::system(system))
                .message(Message::user(prompt))
                .temperature(TEMPERATURE)
                .max_tokens(MAX_TOKENS);
            if json {
                request = request.json_object();
            }

            match client.chat_completion(request).await {
                Ok(response) => {
                    return Ok(Completion {
                        text: response.content,
                        provider: client.provider().name().to_string(),
                    })
                }
                Err(e) => {
                    warn!(provider = client.provider().name(), error = %e, "Provider failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(e) => anyhow!("all language model providers failed: {}", e),
            None => anyhow!("no language model provider configured"),
        })
    }
}

#[async_trait]
impl BaseAI for FallbackAI {
    async fn complete(&self, system: &str, prompt: &str) -> Result<Completion> {
        self.run(system, prompt, false).await
    }

    async fn complete_json(&self, system: &str, prompt: &str) -> Result<Completion> {
        self.run(system, prompt, true).await
    }
}
