//! Collection cycles driven by in-process collectors.

mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use common::{create_candidate, create_user, unique, TestHarness};
use hamlat_core::domains::auth::{add_social_account, SocialAccountInput, SubscriptionStatus, Tier};
use hamlat_core::domains::candidates::Candidate;
use chrono::Utc;
use hamlat_core::domains::collection::{
    process_mention, CandidateMatcher, CollectKind, CollectionRun, CollectionTarget, Collector,
    HandleOwner, ProcessOutcome, RawMention, SocialHandle, Trigger,
};
use hamlat_core::domains::mentions::{Mention, MentionFilter, Platform};
use hamlat_core::domains::regions::{Governorate, PriorityTier};
use test_context::test_context;

struct StaticCollector {
    platform: Platform,
    posts: Vec<RawMention>,
}

#[async_trait]
impl Collector for StaticCollector {
    fn name(&self) -> &'static str {
        "static"
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    async fn collect(&self, _target: &CollectionTarget) -> Result<Vec<RawMention>> {
        Ok(self.posts.clone())
    }
}

struct FailingCollector {
    message: String,
}

#[async_trait]
impl Collector for FailingCollector {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    async fn collect(&self, _target: &CollectionTarget) -> Result<Vec<RawMention>> {
        anyhow::bail!("{}", self.message)
    }
}

struct SlowCollector;

#[async_trait]
impl Collector for SlowCollector {
    fn name(&self) -> &'static str {
        "slow"
    }

    fn platform(&self) -> Platform {
        Platform::Tiktok
    }

    async fn collect(&self, _target: &CollectionTarget) -> Result<Vec<RawMention>> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Vec::new())
    }
}

/// Echoes one post per Facebook handle in the target, like a page reader.
struct PageCollector;

#[async_trait]
impl Collector for PageCollector {
    fn name(&self) -> &'static str {
        "pages"
    }

    fn platform(&self) -> Platform {
        Platform::Facebook
    }

    async fn collect(&self, target: &CollectionTarget) -> Result<Vec<RawMention>> {
        Ok(target
            .handles_for(Platform::Facebook)
            .map(|handle| {
                post(Platform::Facebook, &format!("Weekly update from {}", handle.handle))
                    .from_handle(handle)
            })
            .collect())
    }
}

fn post(platform: Platform, text: &str) -> RawMention {
    let mut raw = RawMention::new(platform, text);
    raw.post_id = Some(format!("{}_{}", platform, unique()));
    raw.likes = 25;
    raw
}

#[test_context(TestHarness)]
#[tokio::test]
async fn cycle_reports_real_counts(ctx: &TestHarness) {
    let tag = unique();
    let facebook = StaticCollector {
        platform: Platform::Facebook,
        posts: vec![
            post(Platform::Facebook, &format!("Erbil election debate {}", tag)),
            post(Platform::Facebook, &format!("Campaign rally downtown {}", tag)),
            RawMention::new(Platform::Facebook, "   "),
        ],
    };
    let instagram = StaticCollector {
        platform: Platform::Instagram,
        posts: vec![post(Platform::Instagram, &format!("Voting day photos {}", tag))],
    };
    let broken = FailingCollector {
        message: format!("quota exhausted {}", tag),
    };

    let worker = ctx.worker(vec![
        Arc::new(facebook) as Arc<dyn Collector>,
        Arc::new(instagram),
        Arc::new(broken),
    ]);
    let report = worker.run_tier(PriorityTier::Erbil, Trigger::Manual).await.unwrap();

    assert_eq!(report.tier, "erbil");
    assert_eq!(report.total_collected, 4);
    assert_eq!(report.inserted, 3);
    assert_eq!(report.updated, 0);
    assert_eq!(report.rejected, 1);
    // Untagged posts fall back to the tier's governorate
    assert_eq!(report.kurdistan_collected, 3);
    assert_eq!(report.succeeded_collectors, 2);
    assert_eq!(report.failed_collectors, 1);
    assert!(!report.failed());
    assert_eq!(report.platform_counts.get("facebook"), Some(&3));
    assert_eq!(report.platform_counts.get("instagram"), Some(&1));
    assert!(report.errors.iter().any(|e| e.contains(&tag)));

    let runs = CollectionRun::find_recent(100, &ctx.db_pool).await.unwrap();
    let run = runs
        .iter()
        .find(|r| r.errors.iter().any(|e| e.contains(&tag)))
        .expect("run recorded");
    assert_eq!(run.trigger_kind, "manual");
    assert_eq!(run.inserted, 3);
    assert_eq!(run.failed_collectors, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn collecting_the_same_posts_again_updates_them(ctx: &TestHarness) {
    let posts = vec![
        post(Platform::Telegram, &format!("Duhok turnout {}", unique())),
        post(Platform::Telegram, &format!("Zakho roads {}", unique())),
    ];
    let collector = || -> Arc<dyn Collector> {
        Arc::new(StaticCollector {
            platform: Platform::Telegram,
            posts: posts.clone(),
        })
    };

    let first = ctx
        .worker(vec![collector()])
        .run_tier(PriorityTier::Duhok, Trigger::Manual)
        .await
        .unwrap();
    let second = ctx
        .worker(vec![collector()])
        .run_tier(PriorityTier::Duhok, Trigger::Manual)
        .await
        .unwrap();

    assert_eq!(first.inserted, 2);
    assert_eq!(second.inserted, 0);
    assert_eq!(second.updated, 2);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn cycle_fails_only_when_every_collector_fails(ctx: &TestHarness) {
    let worker = ctx.worker(vec![
        Arc::new(FailingCollector {
            message: "one".into(),
        }) as Arc<dyn Collector>,
        Arc::new(FailingCollector {
            message: "two".into(),
        }),
    ]);
    let report = worker.run_tier(PriorityTier::Basra, Trigger::Scheduled).await.unwrap();

    assert!(report.failed());
    assert_eq!(report.failed_collectors, 2);
    assert_eq!(report.total_collected, 0);
    assert_eq!(report.errors.len(), 2);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn slow_collectors_time_out(ctx: &TestHarness) {
    let worker = ctx.worker(vec![Arc::new(SlowCollector) as Arc<dyn Collector>]);
    let report = worker.run_tier(PriorityTier::Other, Trigger::Manual).await.unwrap();

    assert!(report.failed());
    assert!(report.errors[0].contains("timed out"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn matched_candidates_get_linked_and_refreshed(ctx: &TestHarness) {
    let name = format!("Rebwar {}", unique());
    let candidate = create_candidate(&ctx.db_pool, &name, Governorate::Sulaymaniyah)
        .await
        .unwrap();

    let collector = StaticCollector {
        platform: Platform::Facebook,
        posts: vec![post(
            Platform::Facebook,
            &format!("{} opened the new clinic in Slemani", name),
        )],
    };
    let report = ctx
        .worker(vec![Arc::new(collector) as Arc<dyn Collector>])
        .run_tier(PriorityTier::Sulaymaniyah, Trigger::Manual)
        .await
        .unwrap();
    assert_eq!(report.inserted, 1);
    assert!(report.candidates_refreshed >= 1);

    let filter = MentionFilter {
        candidate_id: Some(candidate.id),
        ..Default::default()
    };
    let page = Mention::list(&filter, &ctx.db_pool).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].governorate.as_deref(), Some("sulaymaniyah"));

    let refreshed = Candidate::find_by_id(candidate.id, &ctx.db_pool).await.unwrap();
    assert!(refreshed.last_updated.is_some());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn pipeline_rejects_empty_posts(ctx: &TestHarness) {
    let target = CollectionTarget::for_tier(PriorityTier::Kirkuk);
    let matcher = CandidateMatcher::default();

    let outcome = process_mention(
        &RawMention::new(Platform::News, "\n\t "),
        &target,
        &matcher,
        &ctx.db_pool,
    )
    .await
    .unwrap();
    assert_eq!(outcome, ProcessOutcome::Rejected("empty content"));

    let outcome = process_mention(
        &RawMention::new(Platform::News, format!("Kirkuk council vote {}", unique())),
        &target,
        &matcher,
        &ctx.db_pool,
    )
    .await
    .unwrap();
    assert!(matches!(outcome, ProcessOutcome::Inserted { .. }));
    assert!(!outcome.is_kurdistan());
}

/// Runs whose errors carry `tag`, as recorded in `collection_runs`.
async fn runs_tagged(ctx: &TestHarness, tag: &str) -> Vec<CollectionRun> {
    CollectionRun::find_recent(1000, &ctx.db_pool)
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.errors.iter().any(|e| e.contains(tag)))
        .collect()
}

/// A working collector plus a failing one whose error names `tag`.
fn tagged_collectors(tag: &str) -> Vec<Arc<dyn Collector>> {
    vec![
        Arc::new(StaticCollector {
            platform: Platform::Telegram,
            posts: vec![post(Platform::Telegram, &format!("Polling stations open {}", tag))],
        }),
        Arc::new(FailingCollector {
            message: format!("rate limited {}", tag),
        }),
    ]
}

#[test_context(TestHarness)]
#[tokio::test]
async fn page_posts_are_linked_to_their_owner(ctx: &TestHarness) {
    let candidate = create_candidate(
        &ctx.db_pool,
        &format!("Dilshad {}", unique()),
        Governorate::Duhok,
    )
    .await
    .unwrap();
    let handle = SocialHandle {
        owner: HandleOwner::Candidate(candidate.id),
        platform: Platform::Facebook,
        handle: format!("page.{}", unique()),
        governorate: Some(Governorate::Duhok),
    };

    // The post never names the candidate
    let collector = StaticCollector {
        platform: Platform::Facebook,
        posts: vec![post(
            Platform::Facebook,
            &format!("Thank you all for coming tonight {}", unique()),
        )
        .from_handle(&handle)],
    };
    let report = ctx
        .worker(vec![Arc::new(collector) as Arc<dyn Collector>])
        .run_tier(PriorityTier::Duhok, Trigger::Manual)
        .await
        .unwrap();
    assert_eq!(report.inserted, 1);

    let filter = MentionFilter {
        candidate_id: Some(candidate.id),
        ..Default::default()
    };
    let page = Mention::list(&filter, &ctx.db_pool).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].governorate.as_deref(), Some("duhok"));

    let refreshed = Candidate::find_by_id(candidate.id, &ctx.db_pool).await.unwrap();
    assert!(refreshed.last_updated.is_some());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn due_tiers_run_once_per_cadence(ctx: &TestHarness) {
    let tag = unique();
    let worker = ctx.worker(tagged_collectors(&tag));

    let first = worker.run_due(Utc::now(), Trigger::Scheduled).await;
    let tiers: Vec<_> = first.iter().map(|r| r.tier.clone()).collect();
    let expected: Vec<_> = PriorityTier::all_in_order()
        .iter()
        .map(|t| t.as_str().to_string())
        .collect();
    assert_eq!(tiers, expected);

    let second = worker.run_due(Utc::now(), Trigger::Scheduled).await;
    assert!(second.is_empty());
    assert_eq!(runs_tagged(ctx, &tag).await.len(), 7);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn collect_now_runs_every_tier(ctx: &TestHarness) {
    let tag = unique();
    let worker = ctx.worker(tagged_collectors(&tag));

    let report = worker.collect_now(CollectKind::Api).await.unwrap();

    assert_eq!(report.cycles.len(), 7);
    assert_eq!(report.cycles[0].tier, "sulaymaniyah");
    assert_eq!(report.cycles[0].inserted, 1);
    assert!(report.cycles[1..].iter().all(|c| c.updated == 1));
    assert_eq!(report.articles_stored, None);
    assert_eq!(report.candidates_refreshed, None);

    let runs = runs_tagged(ctx, &tag).await;
    assert_eq!(runs.len(), 7);
    assert!(runs.iter().all(|r| r.trigger_kind == "manual"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn background_loop_runs_once_and_stops(ctx: &TestHarness) {
    let tag = unique();
    let worker = Arc::new(ctx.worker(tagged_collectors(&tag)));

    assert!(worker.spawn());
    assert!(!worker.spawn());
    assert!(worker.is_running());

    worker.stop().await;
    assert!(!worker.is_running());

    // The startup pass finishes before the loop exits
    let runs = runs_tagged(ctx, &tag).await;
    assert_eq!(runs.len(), 7);
    assert!(runs.iter().all(|r| r.trigger_kind == "startup"));

    // Restartable once stopped
    assert!(worker.spawn());
    worker.stop().await;
    assert!(!worker.is_running());
    worker.stop().await;
}

#[test_context(TestHarness)]
#[tokio::test]
async fn connected_tenant_pages_are_collected_privately(ctx: &TestHarness) {
    let owner = create_user(&ctx.db_pool, Tier::Premium, SubscriptionStatus::Active)
        .await
        .unwrap();
    let page = format!("page.{}", unique());
    let input = SocialAccountInput {
        platform: "facebook".into(),
        account_name: format!("@{}", page),
        account_url: None,
    };
    add_social_account(owner.id, &input, &ctx.db_pool).await.unwrap();

    let tier = Governorate::parse(&owner.governorate).unwrap().tier();
    let report = ctx
        .worker(vec![Arc::new(PageCollector) as Arc<dyn Collector>])
        .run_tier(tier, Trigger::Manual)
        .await
        .unwrap();
    assert!(report.inserted >= 1);

    let expected = format!("Weekly update from {}", page);
    let facebook = |user_id| MentionFilter {
        platform: Some("facebook".into()),
        limit: Some(200),
        ..MentionFilter::for_user(user_id)
    };
    let mine = Mention::list(&facebook(owner.id), &ctx.db_pool).await.unwrap();
    let stored = mine
        .items
        .iter()
        .find(|m| m.content.starts_with(&expected))
        .expect("tenant page post");
    assert_eq!(stored.user_id, Some(owner.id));

    let other = create_user(&ctx.db_pool, Tier::Premium, SubscriptionStatus::Active)
        .await
        .unwrap();
    let theirs = Mention::list(&facebook(other.id), &ctx.db_pool).await.unwrap();
    assert!(theirs.items.iter().all(|m| !m.content.starts_with(&expected)));
}
