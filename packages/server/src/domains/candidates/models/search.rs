use serde::Deserialize;

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 1000;

/// Query parameters accepted by candidate listing and export.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateSearch {
    /// Matched against every name column.
    pub q: Option<String>,
    pub governorate: Option<String>,
    pub party: Option<String>,
    pub min_influence: Option<f64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl CandidateSearch {
    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn effective_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// ILIKE pattern for the free-text query, if any.
    pub fn name_pattern(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", q.replace('%', "\\%").replace('_', "\\_")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_clamped() {
        let mut search = CandidateSearch::default();
        assert_eq!(search.effective_limit(), 50);
        search.limit = Some(5000);
        assert_eq!(search.effective_limit(), 1000);
        search.offset = Some(-3);
        assert_eq!(search.effective_offset(), 0);
    }

    #[test]
    fn pattern_escapes_wildcards() {
        let search = CandidateSearch {
            q: Some(" 50%_off ".into()),
            ..Default::default()
        };
        assert_eq!(search.name_pattern().as_deref(), Some("%50\\%\\_off%"));

        let blank = CandidateSearch {
            q: Some("  ".into()),
            ..Default::default()
        };
        assert!(blank.name_pattern().is_none());
    }
}
