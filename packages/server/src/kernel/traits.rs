// Infrastructure traits for dependency injection.
//
// No business logic here; domains call these through ServerDeps so tests can
// swap in the mocks from test_dependencies.rs.

use anyhow::Result;
use async_trait::async_trait;

// =============================================================================
// AI Trait (chat completion)
// =============================================================================

/// Text produced by a language model and the provider that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub provider: String,
}

#[async_trait]
pub trait BaseAI: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<Completion>;

    /// Same as `complete` but asks the provider for a JSON object.
    async fn complete_json(&self, system: &str, prompt: &str) -> Result<Completion> {
        self.complete(system, prompt).await
    }
}

// =============================================================================
// Twilio Trait (one-time codes)
// =============================================================================

#[async_trait]
pub trait BaseTwilioService: Send + Sync {
    async fn send_otp(&self, phone_number: &str) -> Result<()>;

    async fn verify_otp(&self, phone_number: &str, code: &str) -> Result<()>;
}
