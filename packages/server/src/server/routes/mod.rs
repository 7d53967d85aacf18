// HTTP routes
pub mod admin;
pub mod analytics;
pub mod auth;
pub mod candidates;
pub mod content;
pub mod health;
pub mod social;

pub use health::*;
