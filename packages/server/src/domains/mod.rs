// Business domains
pub mod analytics;
pub mod auth;
pub mod candidates;
pub mod collection;
pub mod content;
pub mod language;
pub mod mentions;
pub mod notifications;
pub mod regions;
