// HamlatAI - API core
//
// Backend for Iraqi election candidates: priority-weighted social mention
// collection across governorates and dialects, candidate influence scoring,
// campaign analytics and AI-assisted content.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
