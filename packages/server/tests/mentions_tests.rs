//! Mention storage: deduplication, tenant scoping, read state and paging.

mod common;

use common::{create_user, insert_mention, unique, TestHarness};
use hamlat_core::common::Cursor;
use hamlat_core::domains::auth::{SubscriptionStatus, Tier};
use hamlat_core::domains::language::Sentiment;
use hamlat_core::domains::mentions::{Mention, MentionFilter, NewMention};
use hamlat_core::domains::regions::Governorate;
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
async fn same_post_id_is_stored_once(ctx: &TestHarness) {
    let post_id = format!("fb_{}", unique());
    let first = NewMention::builder()
        .platform("facebook")
        .content("Kirkuk rally tonight")
        .post_id(Some(post_id.clone()))
        .likes(3)
        .build();
    let again = NewMention::builder()
        .platform("facebook")
        .content("Kirkuk rally tonight (edited)")
        .post_id(Some(post_id))
        .likes(40)
        .build();

    let a = Mention::upsert(&first, &ctx.db_pool).await.unwrap();
    let b = Mention::upsert(&again, &ctx.db_pool).await.unwrap();

    assert!(a.inserted);
    assert!(!b.inserted);
    assert_eq!(a.id, b.id);

    let stored = Mention::find_by_id(a.id, &ctx.db_pool).await.unwrap();
    assert_eq!(stored.likes, 40);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn posts_without_id_dedupe_on_content(ctx: &TestHarness) {
    let content = format!("هەڵبژاردن {}", unique());
    let new = NewMention::builder()
        .platform("telegram")
        .content(content.clone())
        .build();
    // Same text on another platform is a different mention
    let elsewhere = NewMention::builder()
        .platform("instagram")
        .content(content)
        .build();

    let a = Mention::upsert(&new, &ctx.db_pool).await.unwrap();
    let b = Mention::upsert(&new, &ctx.db_pool).await.unwrap();
    let c = Mention::upsert(&elsewhere, &ctx.db_pool).await.unwrap();

    assert!(a.inserted);
    assert!(!b.inserted);
    assert_eq!(a.id, b.id);
    assert!(c.inserted);
    assert_ne!(a.id, c.id);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn concurrent_upserts_of_one_post_insert_once(ctx: &TestHarness) {
    let new = NewMention::builder()
        .platform("twitter")
        .content(format!("duplicate storm {}", unique()))
        .post_id(Some(format!("tw_{}", unique())))
        .build();

    let results = futures::future::join_all(
        (0..8).map(|_| Mention::upsert(&new, &ctx.db_pool)),
    )
    .await;

    let outcomes: Vec<_> = results.into_iter().map(|r| r.unwrap()).collect();
    assert_eq!(outcomes.iter().filter(|o| o.inserted).count(), 1);
    assert!(outcomes.iter().all(|o| o.id == outcomes[0].id));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn empty_content_is_rejected(ctx: &TestHarness) {
    let new = NewMention::builder().platform("facebook").content("   ").build();
    assert!(Mention::upsert(&new, &ctx.db_pool).await.is_err());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn tenants_see_shared_rows_and_their_own_only(ctx: &TestHarness) {
    let alice = create_user(&ctx.db_pool, Tier::Basic, SubscriptionStatus::Active)
        .await
        .unwrap();
    let bob = create_user(&ctx.db_pool, Tier::Basic, SubscriptionStatus::Active)
        .await
        .unwrap();
    let tag = unique();

    let private = NewMention::builder()
        .platform("whatsapp")
        .content(format!("private note {}", tag))
        .user_id(Some(alice.id))
        .build();
    let private = Mention::upsert(&private, &ctx.db_pool).await.unwrap();

    assert!(Mention::find_visible(private.id, alice.id, &ctx.db_pool)
        .await
        .unwrap()
        .is_some());
    assert!(Mention::find_visible(private.id, bob.id, &ctx.db_pool)
        .await
        .unwrap()
        .is_none());

    let filter = MentionFilter {
        platform: Some("whatsapp".into()),
        limit: Some(200),
        ..MentionFilter::for_user(bob.id)
    };
    let page = Mention::list(&filter, &ctx.db_pool).await.unwrap();
    assert!(page.items.iter().all(|m| m.id != private.id));

    // Bob cannot mark Alice's mention read
    assert!(!Mention::mark_read(private.id, bob.id, &ctx.db_pool).await.unwrap());
    assert!(Mention::mark_read(private.id, alice.id, &ctx.db_pool).await.unwrap());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn read_state_is_per_tenant(ctx: &TestHarness) {
    let alice = create_user(&ctx.db_pool, Tier::Basic, SubscriptionStatus::Active)
        .await
        .unwrap();
    let bob = create_user(&ctx.db_pool, Tier::Basic, SubscriptionStatus::Active)
        .await
        .unwrap();
    let shared = insert_mention(&ctx.db_pool, Governorate::Duhok, Sentiment::Positive, 0.6)
        .await
        .unwrap();

    assert!(Mention::mark_read(shared.id, alice.id, &ctx.db_pool).await.unwrap());
    // Marking twice is fine
    assert!(Mention::mark_read(shared.id, alice.id, &ctx.db_pool).await.unwrap());

    let unread = |user_id| MentionFilter {
        governorate: Some("duhok".into()),
        unread_only: true,
        limit: Some(200),
        ..MentionFilter::for_user(user_id)
    };

    let alice_unread = Mention::list(&unread(alice.id), &ctx.db_pool).await.unwrap();
    assert!(alice_unread.items.iter().all(|m| m.id != shared.id));

    let bob_unread = Mention::list(&unread(bob.id), &ctx.db_pool).await.unwrap();
    let seen = bob_unread.items.iter().find(|m| m.id == shared.id);
    assert!(seen.is_some_and(|m| !m.is_read));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn filters_narrow_the_list(ctx: &TestHarness) {
    let negative = insert_mention(&ctx.db_pool, Governorate::Halabja, Sentiment::Negative, -0.7)
        .await
        .unwrap();
    let positive = insert_mention(&ctx.db_pool, Governorate::Halabja, Sentiment::Positive, 0.7)
        .await
        .unwrap();

    let filter = MentionFilter {
        governorate: Some("halabja".into()),
        sentiment: Some("negative".into()),
        kurdistan_only: true,
        limit: Some(200),
        ..Default::default()
    };
    let page = Mention::list(&filter, &ctx.db_pool).await.unwrap();

    assert!(page.items.iter().any(|m| m.id == negative.id));
    assert!(page.items.iter().all(|m| m.id != positive.id));
    assert!(page
        .items
        .iter()
        .all(|m| m.sentiment == "negative" && m.governorate.as_deref() == Some("halabja")));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn cursor_pages_without_overlap(ctx: &TestHarness) {
    let user = create_user(&ctx.db_pool, Tier::Basic, SubscriptionStatus::Active)
        .await
        .unwrap();
    // Private rows keep this listing independent of other tests
    let mut ids = Vec::new();
    for i in 0..5 {
        let new = NewMention::builder()
            .platform("tiktok")
            .content(format!("clip {} {}", i, unique()))
            .user_id(Some(user.id))
            .build();
        ids.push(Mention::upsert(&new, &ctx.db_pool).await.unwrap().id);
    }

    let mut filter = MentionFilter {
        platform: Some("tiktok".into()),
        limit: Some(2),
        ..MentionFilter::for_user(user.id)
    };

    let mut seen = Vec::new();
    loop {
        let page = Mention::list(&filter, &ctx.db_pool).await.unwrap();
        assert!(page.items.len() <= 2);
        seen.extend(
            page.items
                .iter()
                .filter(|m| m.user_id == Some(user.id))
                .map(|m| m.id),
        );
        match page.next_cursor {
            Some(cursor) => {
                assert!(page.has_more);
                filter.before = Some(Cursor::decode(&cursor).unwrap().into_uuid());
            }
            None => break,
        }
    }

    let mut expected = ids.clone();
    expected.sort_by_key(|id| std::cmp::Reverse(id.into_uuid()));
    assert_eq!(seen, expected);
}
