use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::lexicon::{NEGATIONS, NEGATIVE_WORDS, POSITIVE_WORDS};
use super::text::{token_matches, tokenize};
use super::topics::extract_topics;

/// Score contributed by one lexicon hit.
const HIT_WEIGHT: f64 = 0.2;

/// Scores within this band around zero are neutral.
const NEUTRAL_BAND: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }

    pub fn from_score(score: f64) -> Self {
        if score > NEUTRAL_BAND {
            Self::Positive
        } else if score < -NEUTRAL_BAND {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            other => anyhow::bail!("unknown sentiment: {}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentAnalysis {
    pub sentiment: Sentiment,
    /// In [-1, 1].
    pub score: f64,
    /// In [0, 1]; equals |score|.
    pub confidence: f64,
    pub emotions: Vec<String>,
    pub topics: Vec<String>,
}

/// Lexicon sentiment over Arabic, Kurdish and English words.
///
/// Each positive hit adds 0.2 and each negative hit subtracts 0.2; a negation
/// word flips the polarity of the next hit. The score is clamped to [-1, 1].
pub fn analyze_sentiment(text: &str) -> SentimentAnalysis {
    let mut score = 0.0_f64;
    let mut positive_hits = 0;
    let mut negative_hits = 0;
    let mut negate_next = false;

    for token in tokenize(text) {
        if NEGATIONS.contains(&token.as_str()) {
            negate_next = true;
            continue;
        }

        let polarity = if POSITIVE_WORDS.iter().any(|w| token_matches(&token, w)) {
            1.0
        } else if NEGATIVE_WORDS.iter().any(|w| token_matches(&token, w)) {
            -1.0
        } else {
            continue;
        };

        let polarity = if negate_next { -polarity } else { polarity };
        negate_next = false;

        if polarity > 0.0 {
            positive_hits += 1;
        } else {
            negative_hits += 1;
        }
        score += polarity * HIT_WEIGHT;
    }

    let score = round2(score.clamp(-1.0, 1.0));

    let mut emotions = Vec::new();
    if positive_hits > 0 {
        emotions.push("hopeful".to_string());
    }
    if negative_hits > 0 {
        emotions.push("angry".to_string());
    }

    SentimentAnalysis {
        sentiment: Sentiment::from_score(score),
        score,
        confidence: score.abs(),
        emotions,
        topics: extract_topics(text),
    }
}

/// Rounds away float noise so repeated hits land on exact multiples of 0.2.
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_arabic() {
        let a = analyze_sentiment("المرشح قوي وناجح");
        assert_eq!(a.sentiment, Sentiment::Positive);
        assert_eq!(a.score, 0.4);
        assert_eq!(a.emotions, vec!["hopeful"]);
    }

    #[test]
    fn negative_kurdish_corruption() {
        let a = analyze_sentiment("گەندەڵی لە حکومەت زۆرە");
        assert_eq!(a.sentiment, Sentiment::Negative);
        assert!(a.topics.contains(&"corruption".to_string()));
        assert!(a.topics.contains(&"government".to_string()));
    }

    #[test]
    fn negation_flips_polarity() {
        let a = analyze_sentiment("this plan is not good");
        assert_eq!(a.score, -0.2);
        assert_eq!(a.sentiment, Sentiment::Negative);
    }

    #[test]
    fn score_is_clamped() {
        let a = analyze_sentiment("good great excellent best strong success win hope");
        assert_eq!(a.score, 1.0);
        assert_eq!(a.confidence, 1.0);
    }

    #[test]
    fn mixed_hits_cancel_to_neutral() {
        let a = analyze_sentiment("good but corrupt");
        assert_eq!(a.score, 0.0);
        assert_eq!(a.sentiment, Sentiment::Neutral);
        assert_eq!(a.emotions, vec!["hopeful", "angry"]);
    }

    #[test]
    fn no_lexicon_words_is_neutral() {
        let a = analyze_sentiment("بغداد");
        assert_eq!(a.sentiment, Sentiment::Neutral);
        assert_eq!(a.confidence, 0.0);
        assert!(a.emotions.is_empty());
    }
}
