use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::common::{CandidateId, UserId};

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 200;

/// Mention list filter. `user_id` scopes to rows owned by the tenant plus
/// shared collector rows; `None` sees everything (admin, CLI).
#[derive(Debug, Clone, Default)]
pub struct MentionFilter {
    pub user_id: Option<UserId>,
    pub sentiment: Option<String>,
    pub platform: Option<String>,
    pub governorate: Option<String>,
    pub dialect: Option<String>,
    pub candidate_id: Option<CandidateId>,
    pub kurdistan_only: bool,
    pub unread_only: bool,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    /// Keyset cursor: only rows with a smaller id.
    pub before: Option<Uuid>,
}

impl MentionFilter {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    /// Limit clamped to 1..=200, default 50.
    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped() {
        let mut filter = MentionFilter::default();
        assert_eq!(filter.effective_limit(), 50);
        filter.limit = Some(10_000);
        assert_eq!(filter.effective_limit(), 200);
        filter.limit = Some(0);
        assert_eq!(filter.effective_limit(), 1);
    }
}
