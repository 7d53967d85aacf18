//! SMS alerts: trending candidates, collection health and the daily digest.

mod common;

use chrono::{Duration, Utc};
use common::{create_candidate, insert_mention, unique, TestHarness};
use hamlat_core::domains::collection::models::NewCollectionRun;
use hamlat_core::domains::collection::CollectionRun;
use hamlat_core::domains::language::Sentiment;
use hamlat_core::domains::notifications::{
    check_collection_health, send_daily_digest, send_trending_alerts,
};
use hamlat_core::domains::regions::Governorate;
use hamlat_core::kernel::test_dependencies::MockNotifier;
use test_context::test_context;

fn run(finished_at: chrono::DateTime<Utc>, succeeded: i32, failed: i32) -> NewCollectionRun {
    NewCollectionRun {
        tier: "kirkuk".into(),
        trigger_kind: "scheduled".into(),
        started_at: finished_at - Duration::seconds(30),
        finished_at,
        total_collected: 0,
        kurdistan_collected: 0,
        inserted: 0,
        updated: 0,
        rejected: 0,
        succeeded_collectors: succeeded,
        failed_collectors: failed,
        platform_counts: serde_json::json!({}),
        errors: Vec::new(),
    }
}

#[test_context(TestHarness)]
#[tokio::test]
async fn trending_candidates_are_alerted_once_a_day(ctx: &TestHarness) {
    let name = format!("Trending {}", unique());
    let candidate = create_candidate(&ctx.db_pool, &name, Governorate::Kirkuk)
        .await
        .unwrap();
    sqlx::query("UPDATE candidates SET influence_score = 92 WHERE id = $1")
        .bind(candidate.id)
        .execute(&ctx.db_pool)
        .await
        .unwrap();

    let notifier = MockNotifier::new();
    let sent = send_trending_alerts(&ctx.db_pool, &notifier).await.unwrap();
    assert!(sent >= 1);
    assert!(notifier.was_sent_containing(&name));

    let again = MockNotifier::new();
    send_trending_alerts(&ctx.db_pool, &again).await.unwrap();
    assert!(!again.was_sent_containing(&name));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn quiet_collection_raises_an_alert(ctx: &TestHarness) {
    // Later than any run the other tests insert
    let now = Utc::now() + Duration::days(9000);
    let notifier = MockNotifier::new();

    let alerted = check_collection_health(&ctx.db_pool, &notifier, now)
        .await
        .unwrap();

    assert!(alerted);
    assert!(notifier.was_sent_containing("no collection run"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn failing_collection_raises_an_alert(ctx: &TestHarness) {
    let finished = Utc::now() + Duration::days(2000);
    CollectionRun::insert(&run(finished, 0, 3), &ctx.db_pool).await.unwrap();
    CollectionRun::insert(&run(finished, 2, 1), &ctx.db_pool).await.unwrap();

    let notifier = MockNotifier::new();
    let alerted = check_collection_health(&ctx.db_pool, &notifier, finished + Duration::minutes(1))
        .await
        .unwrap();

    assert!(alerted);
    assert!(notifier.was_sent_containing("success rate"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn healthy_collection_stays_quiet(ctx: &TestHarness) {
    let finished = Utc::now() + Duration::days(3000);
    CollectionRun::insert(&run(finished, 3, 0), &ctx.db_pool).await.unwrap();

    let notifier = MockNotifier::new();
    let alerted = check_collection_health(&ctx.db_pool, &notifier, finished + Duration::minutes(1))
        .await
        .unwrap();

    assert!(!alerted);
    assert!(notifier.sent().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn digest_counts_the_last_day(ctx: &TestHarness) {
    insert_mention(&ctx.db_pool, Governorate::Sulaymaniyah, Sentiment::Neutral, 0.0)
        .await
        .unwrap();

    let notifier = MockNotifier::new();
    let digest = send_daily_digest(&ctx.db_pool, &notifier, Utc::now())
        .await
        .unwrap();

    assert!(digest.total >= 1);
    assert!(digest.kurdistan >= 1);
    assert_eq!(notifier.sent(), vec![digest.message()]);
}
