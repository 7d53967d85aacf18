//! Rolling influence score.
//!
//! Each mention contributes its weighted engagement scaled by its
//! sentiment: `(likes*0.1 + comments*0.2 + shares*0.3) * (1 + 0.5*sentiment)`.
//! The score is the mean contribution over the last week, rounded.

use chrono::{DateTime, Duration, Utc};

use crate::domains::mentions::Mention;

pub const INFLUENCE_WINDOW_DAYS: i64 = 7;

/// Candidates above this score are trending.
pub const TRENDING_THRESHOLD: f64 = 80.0;

const LIKE_WEIGHT: f64 = 0.1;
const COMMENT_WEIGHT: f64 = 0.2;
const SHARE_WEIGHT: f64 = 0.3;
const SENTIMENT_WEIGHT: f64 = 0.5;

fn contribution(mention: &Mention) -> f64 {
    let engagement = mention.likes as f64 * LIKE_WEIGHT
        + mention.comments as f64 * COMMENT_WEIGHT
        + mention.shares as f64 * SHARE_WEIGHT;
    engagement * (1.0 + SENTIMENT_WEIGHT * mention.sentiment_score)
}

pub fn compute_influence(mentions: &[Mention], now: DateTime<Utc>) -> f64 {
    let since = now - Duration::days(INFLUENCE_WINDOW_DAYS);
    let recent: Vec<f64> = mentions
        .iter()
        .filter(|m| m.detected_at >= since)
        .map(contribution)
        .collect();

    if recent.is_empty() {
        return 0.0;
    }

    (recent.iter().sum::<f64>() / recent.len() as f64).round()
}

pub fn is_trending(influence: f64) -> bool {
    influence > TRENDING_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mention(likes: i64, comments: i64, shares: i64, sentiment: f64) -> Mention {
        Mention {
            likes,
            comments,
            shares,
            sentiment_score: sentiment,
            ..Mention::sample()
        }
    }

    #[test]
    fn no_mentions_no_influence() {
        assert_eq!(compute_influence(&[], Utc::now()), 0.0);
    }

    #[test]
    fn weighted_engagement_scaled_by_sentiment() {
        // 100*0.1 + 50*0.2 + 10*0.3 = 23, positive sentiment 1.0 => 34.5
        let score = compute_influence(&[mention(100, 50, 10, 1.0)], Utc::now());
        assert_eq!(score, 35.0);

        // negative sentiment halves it
        let score = compute_influence(&[mention(100, 50, 10, -1.0)], Utc::now());
        assert_eq!(score, 12.0);
    }

    #[test]
    fn mean_over_window_only() {
        let now = Utc::now();
        let mut stale = mention(10_000, 0, 0, 0.0);
        stale.detected_at = now - Duration::days(8);
        let fresh = [mention(100, 0, 0, 0.0), mention(300, 0, 0, 0.0)];

        let mut all = fresh.to_vec();
        all.push(stale);
        assert_eq!(compute_influence(&all, now), 20.0);
    }

    #[test]
    fn trending_is_strictly_above_threshold() {
        assert!(!is_trending(80.0));
        assert!(is_trending(80.5));
    }
}
