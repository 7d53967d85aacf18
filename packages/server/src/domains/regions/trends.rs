use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::common::CandidateId;
use crate::domains::candidates::Candidate;
use crate::domains::mentions::Mention;

const TREND_SAMPLE: usize = 100;
const TOP_N: usize = 5;
const MIN_TREND_SCORES: usize = 10;
const TREND_DELTA: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateTrend {
    pub id: CandidateId,
    pub name: String,
    pub influence_score: f64,
    pub is_trending: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionalTrends {
    pub region: String,
    pub mention_count: usize,
    pub average_sentiment: f64,
    pub sentiment_trend: Trend,
    pub top_candidates: Vec<CandidateTrend>,
    pub trending_topics: Vec<TopicCount>,
}

/// Compares the newest five scores with the five before them.
/// `scores` must be ordered newest first.
pub fn sentiment_trend(scores: &[f64]) -> Trend {
    if scores.len() < MIN_TREND_SCORES {
        return Trend::Stable;
    }
    let recent = scores[..5].iter().sum::<f64>() / 5.0;
    let previous = scores[5..10].iter().sum::<f64>() / 5.0;
    let delta = recent - previous;
    if delta > TREND_DELTA {
        Trend::Up
    } else if delta < -TREND_DELTA {
        Trend::Down
    } else {
        Trend::Stable
    }
}

/// Summarises a region from its mentions and candidates.
pub fn regional_trends(
    region: &str,
    mentions: &[Mention],
    candidates: &[Candidate],
    now: DateTime<Utc>,
) -> RegionalTrends {
    let since = now - Duration::hours(24);
    let mut recent: Vec<&Mention> = mentions.iter().filter(|m| m.detected_at >= since).collect();
    recent.sort_by(|a, b| b.detected_at.cmp(&a.detected_at));
    recent.truncate(TREND_SAMPLE);

    let scores: Vec<f64> = recent.iter().map(|m| m.sentiment_score).collect();
    let average_sentiment = if scores.is_empty() {
        0.0
    } else {
        let avg = scores.iter().sum::<f64>() / scores.len() as f64;
        (avg * 100.0).round() / 100.0
    };

    let mut ranked: Vec<&Candidate> = candidates.iter().collect();
    ranked.sort_by(|a, b| b.influence_score.total_cmp(&a.influence_score));
    let top_candidates = ranked
        .into_iter()
        .take(TOP_N)
        .map(|c| CandidateTrend {
            id: c.id,
            name: c.name_en.clone().unwrap_or_else(|| c.name_ar.clone()),
            influence_score: c.influence_score,
            is_trending: c.is_trending(),
        })
        .collect();

    RegionalTrends {
        region: region.to_string(),
        mention_count: recent.len(),
        average_sentiment,
        sentiment_trend: sentiment_trend(&scores),
        top_candidates,
        trending_topics: top_topics(&recent),
    }
}

fn top_topics(mentions: &[&Mention]) -> Vec<TopicCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for topic in mentions.iter().flat_map(|m| m.topics.iter()) {
        *counts.entry(topic.as_str()).or_default() += 1;
    }
    let mut topics: Vec<TopicCount> = counts
        .into_iter()
        .map(|(topic, count)| TopicCount {
            topic: topic.to_string(),
            count,
        })
        .collect();
    topics.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.topic.cmp(&b.topic)));
    topics.truncate(TOP_N);
    topics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_series_is_stable() {
        assert_eq!(sentiment_trend(&[0.9; 9]), Trend::Stable);
    }

    #[test]
    fn detects_direction() {
        let mut rising = vec![0.5; 5];
        rising.extend([0.1; 5]);
        assert_eq!(sentiment_trend(&rising), Trend::Up);

        let mut falling = vec![-0.3; 5];
        falling.extend([0.0; 5]);
        assert_eq!(sentiment_trend(&falling), Trend::Down);

        let mut flat = vec![0.2; 5];
        flat.extend([0.15; 5]);
        assert_eq!(sentiment_trend(&flat), Trend::Stable);
    }

    #[test]
    fn ignores_mentions_older_than_a_day() {
        let now = Utc::now();
        let mut old = Mention::sample();
        old.detected_at = now - Duration::hours(30);
        old.topics = vec!["security".into()];
        let mut fresh = Mention::sample();
        fresh.topics = vec!["election".into(), "economy".into()];
        let mut fresh2 = Mention::sample();
        fresh2.topics = vec!["election".into()];

        let trends = regional_trends("erbil", &[old, fresh, fresh2], &[], now);
        assert_eq!(trends.mention_count, 2);
        assert_eq!(
            trends.trending_topics,
            vec![
                TopicCount { topic: "election".into(), count: 2 },
                TopicCount { topic: "economy".into(), count: 1 },
            ]
        );
        assert_eq!(trends.sentiment_trend, Trend::Stable);
    }

    #[test]
    fn serializes_trend_lowercase() {
        assert_eq!(serde_json::to_string(&Trend::Up).unwrap(), "\"up\"");
    }
}
