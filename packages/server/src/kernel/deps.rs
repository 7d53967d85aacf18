//! Server dependencies shared by HTTP handlers, scheduled jobs and the CLI.
//!
//! External services sit behind traits so tests can swap in mocks.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, warn};
use twilio::{TwilioOptions, TwilioService};

use crate::config::Config;
use crate::domains::auth::JwtService;
use crate::domains::notifications::{LoggingNotifier, Notifier, TwilioNotifier};
use crate::kernel::{BaseAI, BaseTwilioService, FallbackAI};

// =============================================================================
// TwilioService Adapter (implements BaseTwilioService trait)
// =============================================================================

pub struct TwilioAdapter(pub Arc<TwilioService>);

impl TwilioAdapter {
    pub fn new(service: Arc<TwilioService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BaseTwilioService for TwilioAdapter {
    async fn send_otp(&self, phone_number: &str) -> Result<()> {
        self.0
            .send_otp(phone_number)
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("{}", e))
    }

    async fn verify_otp(&self, phone_number: &str, code: &str) -> Result<()> {
        self.0
            .verify_otp(phone_number, code)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub twilio: Arc<dyn BaseTwilioService>,
    /// `None` when no language model key is configured.
    pub ai: Option<Arc<dyn BaseAI>>,
    pub notifier: Arc<dyn Notifier>,
    pub jwt_service: Arc<JwtService>,
    pub test_identifier_enabled: bool,
}

impl ServerDeps {
    pub fn new(
        db_pool: PgPool,
        twilio: Arc<dyn BaseTwilioService>,
        ai: Option<Arc<dyn BaseAI>>,
        notifier: Arc<dyn Notifier>,
        jwt_service: Arc<JwtService>,
        test_identifier_enabled: bool,
    ) -> Self {
        Self {
            db_pool,
            twilio,
            ai,
            notifier,
            jwt_service,
            test_identifier_enabled,
        }
    }
}

impl ServerDeps {
    /// Production wiring: Twilio Verify, the LLM fallback chain and SMS alerts.
    pub fn from_config(db_pool: PgPool, config: &Config) -> Self {
        let twilio = Arc::new(TwilioService::new(TwilioOptions {
            account_sid: config.twilio_account_sid.clone(),
            auth_token: config.twilio_auth_token.clone(),
            service_id: config.twilio_verify_service_sid.clone(),
            from_number: config.twilio_from_number.clone(),
        }));

        let ai: Option<Arc<dyn BaseAI>> = match FallbackAI::from_keys(&config.llm) {
            Some(ai) => {
                info!(providers = ?ai.providers(), "Content generation enabled");
                Some(Arc::new(ai))
            }
            None => {
                warn!("No LLM API key set, content generation disabled");
                None
            }
        };

        let notifier: Arc<dyn Notifier> =
            if config.twilio_from_number.is_some() && !config.alert_phone_numbers.is_empty() {
                Arc::new(TwilioNotifier::new(
                    twilio.clone(),
                    config.alert_phone_numbers.clone(),
                ))
            } else {
                warn!("TWILIO_FROM_NUMBER or ALERT_PHONE_NUMBERS not set, alerts are only logged");
                Arc::new(LoggingNotifier)
            };

        let jwt_service = Arc::new(JwtService::new(
            &config.jwt_secret,
            config.jwt_issuer.clone(),
        ));

        Self::new(
            db_pool,
            Arc::new(TwilioAdapter::new(twilio)),
            ai,
            notifier,
            jwt_service,
            config.test_identifier_enabled,
        )
    }
}
