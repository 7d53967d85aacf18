use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};
use twilio::TwilioService;

/// Delivers operator alerts. Returns how many recipients were reached.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, body: &str) -> Result<usize>;
}

/// Sends every alert as an SMS (or WhatsApp for `whatsapp:` recipients).
pub struct TwilioNotifier {
    twilio: Arc<TwilioService>,
    recipients: Vec<String>,
}

impl TwilioNotifier {
    pub fn new(twilio: Arc<TwilioService>, recipients: Vec<String>) -> Self {
        Self { twilio, recipients }
    }
}

#[async_trait]
impl Notifier for TwilioNotifier {
    async fn notify(&self, body: &str) -> Result<usize> {
        let mut delivered = 0;
        for to in &self.recipients {
            match self.twilio.send_sms(to, body).await {
                Ok(_) => delivered += 1,
                Err(e) => warn!(error = %e, "Alert delivery failed"),
            }
        }
        if delivered == 0 && !self.recipients.is_empty() {
            anyhow::bail!("alert could not be delivered to any recipient");
        }
        Ok(delivered)
    }
}

/// Used when no sender or recipients are configured.
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn notify(&self, body: &str) -> Result<usize> {
        info!(alert = %body, "Alert (no SMS recipients configured)");
        Ok(0)
    }
}
