//! Twilio Verify (one-time codes) and Messages (SMS / WhatsApp) client.

pub mod models;

use std::collections::HashMap;

use reqwest::Client;
use thiserror::Error;

use crate::models::{ApiErrorBody, MessageResponse, OTPResponse, OTPVerifyResponse};

const VERIFY_URL: &str = "https://verify.twilio.com/v2";
const API_URL: &str = "https://api.twilio.com/2010-04-01";

#[derive(Debug, Error)]
pub enum TwilioError {
    #[error("request to Twilio failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Twilio returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("verification code rejected")]
    CodeRejected,

    #[error("no sender number configured")]
    MissingSender,
}

pub type Result<T> = std::result::Result<T, TwilioError>;

#[derive(Debug, Clone)]
pub struct TwilioOptions {
    pub account_sid: String,
    pub auth_token: String,
    pub service_id: String,
    /// Sender for outbound SMS. `whatsapp:` prefixed recipients reuse it with the same prefix.
    pub from_number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TwilioService {
    options: TwilioOptions,
    client: Client,
}

/// Verify channel for a recipient: email addresses get email, everything else SMS.
pub fn channel_for(recipient: &str) -> &'static str {
    if recipient.contains('@') {
        "email"
    } else {
        "sms"
    }
}

impl TwilioService {
    pub fn new(options: TwilioOptions) -> Self {
        Self {
            options,
            client: Client::new(),
        }
    }

    pub async fn send_otp(&self, recipient: &str) -> Result<OTPResponse> {
        let url = format!(
            "{}/Services/{}/Verifications",
            VERIFY_URL, self.options.service_id
        );

        let mut form = HashMap::new();
        form.insert("To", recipient);
        form.insert("Channel", channel_for(recipient));

        self.post_form(&url, &form).await
    }

    pub async fn verify_otp(&self, recipient: &str, code: &str) -> Result<()> {
        let url = format!(
            "{}/Services/{}/VerificationCheck",
            VERIFY_URL, self.options.service_id
        );

        let mut form = HashMap::new();
        form.insert("To", recipient);
        form.insert("Code", code);

        let result: OTPVerifyResponse = self.post_form(&url, &form).await?;
        if result.status == "approved" {
            Ok(())
        } else {
            Err(TwilioError::CodeRejected)
        }
    }

    pub async fn send_sms(&self, to: &str, body: &str) -> Result<MessageResponse> {
        let from = self
            .options
            .from_number
            .as_deref()
            .ok_or(TwilioError::MissingSender)?;
        let from = sender_for(to, from);

        let url = format!(
            "{}/Accounts/{}/Messages.json",
            API_URL, self.options.account_sid
        );

        let mut form = HashMap::new();
        form.insert("To", to);
        form.insert("From", from.as_str());
        form.insert("Body", body);

        let message: MessageResponse = self.post_form(&url, &form).await?;
        tracing::debug!(sid = %message.sid, status = %message.status, "Twilio message queued");
        Ok(message)
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        form: &HashMap<&str, &str>,
    ) -> Result<T> {
        let response = self
            .client
            .post(url)
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .map(|e| match (e.code, e.message) {
                    (Some(code), Some(msg)) => format!("{} ({})", msg, code),
                    (_, Some(msg)) => msg,
                    _ => body.clone(),
                })
                .unwrap_or(body);
            tracing::warn!(status = %status, error = %message, "Twilio returned an error");
            return Err(TwilioError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

fn sender_for(to: &str, from: &str) -> String {
    if to.starts_with("whatsapp:") && !from.starts_with("whatsapp:") {
        format!("whatsapp:{}", from)
    } else {
        from.to_string()
    }
}
