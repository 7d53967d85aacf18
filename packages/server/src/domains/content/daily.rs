use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use super::generator::{generate_content, ContentBrief};
use super::models::GeneratedContent;
use crate::domains::analytics::region_trends;
use crate::domains::auth::User;
use crate::domains::mentions::Platform;
use crate::kernel::ServerDeps;

const FALLBACK_TOPIC: &str = "campaign update";

/// Today's topic: the governorate's top trending topic, if it has one.
pub fn daily_topic(trending: &[String]) -> String {
    trending
        .first()
        .cloned()
        .unwrap_or_else(|| FALLBACK_TOPIC.to_string())
}

/// One post per subscribed candidate, skipped for anyone who already got
/// content in the last 20 hours. Returns how many were generated.
pub async fn generate_daily_content(deps: &ServerDeps, now: DateTime<Utc>) -> Result<usize> {
    let Some(ai) = deps.ai.as_deref() else {
        info!("Daily content skipped: no language model configured");
        return Ok(0);
    };

    let users = User::find_subscribed(now, &deps.db_pool).await?;
    let mut generated = 0;

    for user in &users {
        if GeneratedContent::exists_since(user.id, now - Duration::hours(20), &deps.db_pool).await? {
            continue;
        }

        let topics: Vec<String> = region_trends(&user.governorate, &deps.db_pool, now)
            .await?
            .map(|t| t.trending_topics.into_iter().map(|t| t.topic).collect())
            .unwrap_or_default();

        let brief = ContentBrief {
            topic: daily_topic(&topics),
            content_type: "post".to_string(),
            platform: Platform::Facebook,
        };

        match generate_content(user, &brief, Some(ai), &deps.db_pool).await {
            Ok(_) => generated += 1,
            Err(e) => warn!(user_id = %user.id, error = %e, "Daily content failed"),
        }
    }

    info!(generated, candidates = users.len(), "Daily content generated");
    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_without_trends() {
        assert_eq!(daily_topic(&[]), FALLBACK_TOPIC);
        assert_eq!(daily_topic(&["electricity".into(), "jobs".into()]), "electricity");
    }
}
