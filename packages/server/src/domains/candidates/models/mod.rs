pub mod candidate;
pub mod search;

pub use candidate::{Candidate, CandidateNames, CandidateUpdate, NewCandidate};
pub use search::CandidateSearch;
