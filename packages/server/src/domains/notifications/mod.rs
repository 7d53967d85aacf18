//! Notifications domain: SMS alerts for trending candidates, the daily digest
//! and collection health.

pub mod alerts;
pub mod notifier;

pub use alerts::{
    check_collection_health, health_alert, send_daily_digest, send_trending_alerts,
    trending_message, Digest, MIN_SUCCESS_RATE,
};
pub use notifier::{LoggingNotifier, Notifier, TwilioNotifier};
