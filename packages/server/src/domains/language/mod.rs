//! Language domain: dialect detection, sentiment, topics and election keywords
//! for Sorani, Badini, Kurmanji, Arabic and English text.

pub mod dialect;
pub mod lexicon;
pub mod sentiment;
pub mod text;
pub mod topics;

pub use dialect::{detect_dialect, Detection, Dialect};
pub use sentiment::{analyze_sentiment, Sentiment, SentimentAnalysis};
pub use topics::{election_relevance, extract_topics, is_election_related, match_candidates};
