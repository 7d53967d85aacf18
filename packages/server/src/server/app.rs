//! Application setup and router.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domains::collection::CollectionWorker;
use crate::kernel::ServerDeps;
use crate::server::middleware::{extract_client_ip, jwt_auth_middleware};
use crate::server::routes::{admin, analytics, auth, candidates, content, health_handler, social};

/// Shared state handed to every handler through `Extension`.
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
    pub worker: Arc<CollectionWorker>,
}

impl AppState {
    pub fn new(deps: Arc<ServerDeps>, worker: Arc<CollectionWorker>) -> Self {
        Self { deps, worker }
    }

    pub fn pool(&self) -> &sqlx::PgPool {
        &self.deps.db_pool
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

/// The `/api` routes, without rate limiting or client-ip layers.
pub fn api_router() -> Router {
    Router::new()
        // Auth
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/send-code", post(auth::send_code_handler))
        .route("/auth/verify-code", post(auth::verify_code_handler))
        .route("/auth/me", get(auth::me_handler))
        .route("/auth/profile", put(auth::update_profile_handler))
        .route(
            "/auth/social-accounts",
            get(auth::social_accounts_handler).post(auth::add_social_account_handler),
        )
        // Candidates
        .route(
            "/candidates",
            get(candidates::list_handler).post(candidates::create_handler),
        )
        .route("/candidates/export", get(candidates::export_handler))
        .route(
            "/candidates/:id",
            get(candidates::get_handler).patch(candidates::update_handler),
        )
        // Social
        .route("/social/mentions", get(social::mentions_handler))
        .route("/social/mentions/:id/read", put(social::mark_read_handler))
        .route("/social/collection-status", get(social::collection_status_handler))
        .route("/social/trends", get(social::trends_handler))
        .route("/social/authors", get(social::authors_handler))
        .route("/social/analyze-sentiment", post(social::analyze_sentiment_handler))
        .route("/social/collect", post(social::collect_handler))
        // Analytics
        .route("/analytics/dashboard", get(analytics::dashboard_handler))
        .route("/analytics/regions/:region", get(analytics::region_handler))
        .route("/analytics/kurdistan", get(analytics::kurdistan_handler))
        .route("/analytics/priority", get(analytics::priority_handler))
        // Content
        .route("/content", get(content::list_handler))
        .route("/content/generate", post(content::generate_handler))
        .route("/content/:id", delete(content::delete_handler))
        .route("/content/:id/schedule", post(content::schedule_handler))
        .route("/content/:id/publish", post(content::publish_handler))
        // Admin
        .route("/admin/users", get(admin::users_handler))
        .route("/admin/stats", get(admin::stats_handler))
        .route("/admin/scheduler", get(admin::scheduler_handler))
        .route(
            "/admin/users/:id/subscription",
            patch(admin::update_subscription_handler),
        )
}

/// `/health` and `/api` with JWT auth and shared state. No rate limiting or
/// client-ip extraction, so it can be driven with `oneshot` in tests.
pub fn router(state: AppState) -> Router {
    with_auth(
        Router::new()
            .route("/health", get(health_handler))
            .nest("/api", api_router()),
        state,
    )
}

fn with_auth(router: Router, state: AppState) -> Router {
    let jwt_service = state.deps.jwt_service.clone();
    router
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(state))
}

/// Full application: `/api` behind per-IP rate limiting, JWT auth on every route,
/// `/health` unthrottled. Must be served with connect info.
pub fn build_app(state: AppState, allowed_origins: &[String]) -> Router {
    // 10 requests per second per IP, bursts up to 20
    let rate_limit_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .use_headers()
            .finish()
            .expect("Rate limiter configuration is valid"),
    );

    let api = api_router().layer(GovernorLayer {
        config: rate_limit_config,
    });

    let app = Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api);

    with_auth(app, state)
        .layer(middleware::from_fn(extract_client_ip))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
