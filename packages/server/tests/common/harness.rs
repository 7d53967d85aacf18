//! Test harness with testcontainers for integration testing.
//!
//! One Postgres container per test binary. It starts and migrates on the first
//! test, then every test reuses it. Tests run in parallel against the same
//! database, so fixtures use unique phone numbers, names and content.

use std::sync::Arc;

use anyhow::{Context, Result};
use hamlat_core::config::CollectionSettings;
use hamlat_core::domains::collection::{Collector, CollectionWorker};
use hamlat_core::kernel::{ServerDeps, TestDependencies};
use hamlat_core::server::{router, AppState};
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use super::TestClient;

struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .with_cmd(["-c", "max_connections=200"])
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Per-test context over the shared database.
///
/// ```ignore
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let client = ctx.client(TestDependencies::new());
/// }
/// ```
pub struct TestHarness {
    pub db_pool: PgPool,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {}
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;
        let db_pool = PgPool::connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;
        Ok(Self { db_pool })
    }

    pub fn deps(&self, deps: TestDependencies) -> ServerDeps {
        deps.into_server_deps(self.db_pool.clone())
    }

    /// Worker over the given collectors with test-friendly limits.
    pub fn worker(&self, collectors: Vec<Arc<dyn Collector>>) -> CollectionWorker {
        CollectionWorker::new(
            self.db_pool.clone(),
            collectors,
            CollectionSettings {
                enabled: false,
                max_concurrency: 2,
                collector_timeout_secs: 2,
                retention_days: 30,
            },
        )
    }

    /// HTTP client over the full API router, with no collectors.
    pub fn client(&self, deps: TestDependencies) -> TestClient {
        let state = AppState::new(Arc::new(self.deps(deps)), Arc::new(self.worker(Vec::new())));
        TestClient::new(router(state))
    }
}
