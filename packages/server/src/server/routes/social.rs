use axum::extract::{Extension, Path, Query};
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{ok, ApiError, ApiResult, Cursor, MentionId, Page};
use crate::domains::collection::{
    CollectKind, CollectNowReport, CollectionHealth, CollectionRun, WorkerStatus,
};
use crate::domains::language::{
    analyze_sentiment, detect_dialect, election_relevance, Detection, Dialect, Sentiment,
    SentimentAnalysis,
};
use crate::domains::mentions::{
    AuthorStats, Mention, MentionFilter, Platform, PlatformStats, RepeatedContent,
};
use crate::domains::regions::{extract_governorate, Governorate};
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

const RECENT_RUNS: i64 = 10;
const DEFAULT_TREND_HOURS: i32 = 24;
const DEFAULT_AUTHORS: i64 = 20;
const MAX_ANALYZE_CHARS: usize = 10_000;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MentionQuery {
    pub sentiment: Option<String>,
    pub platform: Option<String>,
    pub governorate: Option<String>,
    pub dialect: Option<String>,
    pub candidate_id: Option<Uuid>,
    pub kurdistan_only: bool,
    pub unread_only: bool,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

fn bad_param(name: &str, value: &str) -> ApiError {
    ApiError::BadRequest(format!("Invalid {}: {}", name, value))
}

impl MentionQuery {
    /// Validates and normalises the query into a tenant-scoped filter.
    pub fn into_filter(self, user: &AuthUser) -> Result<MentionFilter, ApiError> {
        let sentiment = match self.sentiment.as_deref() {
            Some(s) => Some(
                s.parse::<Sentiment>()
                    .map_err(|_| bad_param("sentiment", s))?
                    .as_str()
                    .to_string(),
            ),
            None => None,
        };
        let platform = match self.platform.as_deref() {
            Some(p) => Some(
                p.parse::<Platform>()
                    .map_err(|_| bad_param("platform", p))?
                    .as_str()
                    .to_string(),
            ),
            None => None,
        };
        let governorate = match self.governorate.as_deref() {
            Some(g) => Some(
                Governorate::parse(g)
                    .ok_or_else(|| bad_param("governorate", g))?
                    .as_str()
                    .to_string(),
            ),
            None => None,
        };
        let dialect = match self.dialect.as_deref() {
            Some(d) => Some(
                d.parse::<Dialect>()
                    .map_err(|_| bad_param("dialect", d))?
                    .as_str()
                    .to_string(),
            ),
            None => None,
        };
        let before = match self.cursor.as_deref() {
            Some(c) => Some(
                Cursor::decode(c)
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?
                    .into_uuid(),
            ),
            None => None,
        };

        Ok(MentionFilter {
            // Admins see every tenant's mentions.
            user_id: if user.is_admin() { None } else { Some(user.user_id) },
            sentiment,
            platform,
            governorate,
            dialect,
            candidate_id: self.candidate_id.map(Into::into),
            kurdistan_only: self.kurdistan_only,
            unread_only: self.unread_only,
            date_from: self.date_from,
            date_to: self.date_to,
            limit: self.limit,
            before,
        })
    }
}

pub async fn mentions_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Query(query): Query<MentionQuery>,
) -> ApiResult<Page<Mention>> {
    let filter = query.into_filter(&user)?;
    ok(Mention::list(&filter, state.pool()).await?)
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub id: MentionId,
    pub is_read: bool,
}

pub async fn mark_read_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<MarkedRead> {
    let id = MentionId::from_uuid(id);
    if !Mention::mark_read(id, user.user_id, state.pool()).await? {
        return Err(ApiError::NotFound("Mention"));
    }
    ok(MarkedRead { id, is_read: true })
}

#[derive(Debug, Serialize)]
pub struct CollectionStatus {
    pub worker: WorkerStatus,
    pub platforms: Vec<PlatformStats>,
    pub recent_runs: Vec<CollectionRun>,
    pub last_hour: CollectionHealth,
    pub success_rate: f64,
}

pub async fn collection_status_handler(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
) -> ApiResult<CollectionStatus> {
    let pool = state.pool();
    let worker = state.worker.status().await;
    let platforms = Mention::platform_stats(pool).await?;
    let recent_runs = CollectionRun::find_recent(RECENT_RUNS, pool).await?;
    let last_hour = CollectionRun::health_since(Utc::now() - Duration::hours(1), pool).await?;

    ok(CollectionStatus {
        worker,
        platforms,
        recent_runs,
        success_rate: last_hour.success_rate(),
        last_hour,
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendsQuery {
    pub hours: Option<i32>,
}

pub async fn trends_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Query(query): Query<TrendsQuery>,
) -> ApiResult<Vec<RepeatedContent>> {
    let hours = query.hours.unwrap_or(DEFAULT_TREND_HOURS);
    let trends = Mention::repeated_content(hours, scope(&user), state.pool()).await?;
    ok(trends)
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthorsQuery {
    pub limit: Option<i64>,
}

pub async fn authors_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Query(query): Query<AuthorsQuery>,
) -> ApiResult<Vec<AuthorStats>> {
    let limit = query.limit.unwrap_or(DEFAULT_AUTHORS);
    ok(Mention::top_authors(scope(&user), limit, state.pool()).await?)
}

fn scope(user: &AuthUser) -> Option<crate::common::UserId> {
    if user.is_admin() {
        None
    } else {
        Some(user.user_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TextAnalysis {
    pub detection: Detection,
    pub sentiment: SentimentAnalysis,
    pub governorate: Option<Governorate>,
    pub election_relevance: f64,
}

/// Runs the same classification the collection pipeline applies to a post.
pub fn analyze_text(text: &str) -> TextAnalysis {
    TextAnalysis {
        detection: detect_dialect(text),
        sentiment: analyze_sentiment(text),
        governorate: extract_governorate(text),
        election_relevance: election_relevance(text),
    }
}

pub async fn analyze_sentiment_handler(
    _user: AuthUser,
    Json(body): Json<AnalyzeRequest>,
) -> ApiResult<TextAnalysis> {
    let text = body.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("text is required".into()));
    }
    if text.chars().count() > MAX_ANALYZE_CHARS {
        return Err(ApiError::BadRequest(format!(
            "text must be at most {} characters",
            MAX_ANALYZE_CHARS
        )));
    }
    ok(analyze_text(text))
}

#[derive(Debug, Default, Deserialize)]
pub struct CollectRequest {
    #[serde(alias = "collection_type")]
    pub kind: Option<String>,
}

/// Manual collection trigger. Runs to completion before answering.
pub async fn collect_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    body: Option<Json<CollectRequest>>,
) -> ApiResult<CollectNowReport> {
    user.require_admin()?;

    let kind: CollectKind = match body.and_then(|Json(b)| b.kind) {
        Some(kind) => kind
            .parse()
            .map_err(|e: anyhow::Error| ApiError::BadRequest(e.to_string()))?,
        None => CollectKind::All,
    };

    tracing::info!(user_id = %user.user_id, ?kind, "Manual collection triggered");
    ok(state.worker.collect_now(kind).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::UserId;
    use crate::domains::auth::{Role, Tier};

    fn candidate() -> AuthUser {
        AuthUser {
            user_id: UserId::new(),
            role: Role::Candidate,
            tier: Tier::Basic,
        }
    }

    #[test]
    fn query_normalises_filters() {
        let user = candidate();
        let query = MentionQuery {
            governorate: Some("Slemani".into()),
            platform: Some("Facebook".into()),
            unread_only: true,
            ..Default::default()
        };
        let filter = query.into_filter(&user).unwrap();
        assert_eq!(filter.user_id, Some(user.user_id));
        assert_eq!(filter.governorate.as_deref(), Some("sulaymaniyah"));
        assert_eq!(filter.platform.as_deref(), Some("facebook"));
        assert!(filter.unread_only);
    }

    #[test]
    fn query_rejects_unknown_values() {
        let user = candidate();
        let bad_region = MentionQuery {
            governorate: Some("Atlantis".into()),
            ..Default::default()
        };
        assert!(matches!(
            bad_region.into_filter(&user),
            Err(ApiError::BadRequest(_))
        ));

        let bad_cursor = MentionQuery {
            cursor: Some("!!!".into()),
            ..Default::default()
        };
        assert!(bad_cursor.into_filter(&user).is_err());
    }

    #[test]
    fn admins_are_not_scoped() {
        let admin = AuthUser {
            role: Role::Admin,
            ..candidate()
        };
        let filter = MentionQuery::default().into_filter(&admin).unwrap();
        assert!(filter.user_id.is_none());
    }

    #[test]
    fn analysis_finds_region_and_dialect() {
        let analysis = analyze_text("هەڵبژاردن لە سلێمانی زۆر باشە");
        assert!(analysis.detection.dialect.is_kurdish());
        assert_eq!(analysis.governorate, Some(Governorate::Sulaymaniyah));
    }
}
