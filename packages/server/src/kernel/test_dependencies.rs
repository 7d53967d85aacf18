// TestDependencies - mock implementations for testing
//
// Every mock records its calls so tests can assert on what the code under
// test asked the outside world to do.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::domains::auth::JwtService;
use crate::domains::notifications::Notifier;
use crate::kernel::{BaseAI, BaseTwilioService, Completion, ServerDeps};

pub const TEST_JWT_SECRET: &str = "test_secret";
pub const TEST_JWT_ISSUER: &str = "hamlatai-test";

// =============================================================================
// Mock AI
// =============================================================================

pub struct MockAI {
    responses: Mutex<Vec<String>>,
    calls: Mutex<Vec<String>>,
    fail: bool,
}

impl MockAI {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// A provider whose every call errors.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Add a text response to the queue
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push(response.into());
        self
    }

    /// Prompts sent so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockAI {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseAI for MockAI {
    async fn complete(&self, _system: &str, prompt: &str) -> Result<Completion> {
        self.calls.lock().unwrap().push(prompt.to_string());

        if self.fail {
            anyhow::bail!("mock provider unavailable");
        }

        let mut responses = self.responses.lock().unwrap();
        let text = if responses.is_empty() {
            r##"{"content": "Mock campaign post", "hashtags": ["#mock"]}"##.to_string()
        } else {
            responses.remove(0)
        };

        Ok(Completion {
            text,
            provider: "mock".to_string(),
        })
    }
}

// =============================================================================
// Mock Twilio
// =============================================================================

/// Accepts `valid_code` for any number and records the numbers codes were sent to.
pub struct MockTwilio {
    valid_code: String,
    sent: Mutex<Vec<String>>,
}

impl MockTwilio {
    pub fn new(valid_code: impl Into<String>) -> Self {
        Self {
            valid_code: valid_code.into(),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent_to(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseTwilioService for MockTwilio {
    async fn send_otp(&self, phone_number: &str) -> Result<()> {
        self.sent.lock().unwrap().push(phone_number.to_string());
        Ok(())
    }

    async fn verify_otp(&self, _phone_number: &str, code: &str) -> Result<()> {
        if code == self.valid_code {
            Ok(())
        } else {
            anyhow::bail!("verification code rejected")
        }
    }
}

// =============================================================================
// Mock Notifier
// =============================================================================

#[derive(Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<String>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn was_sent_containing(&self, text: &str) -> bool {
        self.sent.lock().unwrap().iter().any(|m| m.contains(text))
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, body: &str) -> Result<usize> {
        self.sent.lock().unwrap().push(body.to_string());
        Ok(1)
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub ai: Option<Arc<MockAI>>,
    pub twilio: Arc<MockTwilio>,
    pub notifier: Arc<MockNotifier>,
    pub test_identifier_enabled: bool,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            ai: Some(Arc::new(MockAI::new())),
            twilio: Arc::new(MockTwilio::new("000000")),
            notifier: Arc::new(MockNotifier::new()),
            test_identifier_enabled: false,
        }
    }

    pub fn mock_ai(mut self, ai: MockAI) -> Self {
        self.ai = Some(Arc::new(ai));
        self
    }

    pub fn without_ai(mut self) -> Self {
        self.ai = None;
        self
    }

    pub fn mock_twilio(mut self, twilio: MockTwilio) -> Self {
        self.twilio = Arc::new(twilio);
        self
    }

    pub fn with_test_identifier(mut self) -> Self {
        self.test_identifier_enabled = true;
        self
    }

    pub fn jwt_service() -> JwtService {
        JwtService::new(TEST_JWT_SECRET, TEST_JWT_ISSUER.to_string())
    }

    pub fn into_server_deps(self, db_pool: PgPool) -> ServerDeps {
        ServerDeps::new(
            db_pool,
            self.twilio,
            self.ai.map(|ai| ai as Arc<dyn BaseAI>),
            self.notifier,
            Arc::new(Self::jwt_service()),
            self.test_identifier_enabled,
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
