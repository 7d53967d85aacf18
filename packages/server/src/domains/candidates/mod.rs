//! Candidates domain: tracked candidate profiles, their rolling influence
//! score and bulk export.

pub mod export;
pub mod influence;
pub mod models;

pub use export::{export_candidates, ExportFormat};
pub use influence::{compute_influence, is_trending, INFLUENCE_WINDOW_DAYS, TRENDING_THRESHOLD};
pub use models::{Candidate, CandidateNames, CandidateSearch, CandidateUpdate, NewCandidate};
