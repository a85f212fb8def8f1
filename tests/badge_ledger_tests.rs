//! Badge ledger behaviour: one-time grants, race safety and ordering.

mod common;

use chrono::{Duration, TimeZone, Utc};
use userservice::constants::badges::{PROFILE_COMPLETE, PROFILE_PHOTO_UPLOADED};

#[tokio::test]
async fn test_award_is_idempotent() {
    let ctx = common::spawn().await;
    let user = ctx.register("ada@example.com", "Ada", "Lovelace").await;
    let badges = &ctx.shared.badge_service;

    assert!(badges.award(user.id, PROFILE_COMPLETE).await.unwrap());
    assert!(!badges.award(user.id, PROFILE_COMPLETE).await.unwrap());
    assert!(!badges.award(user.id, PROFILE_COMPLETE).await.unwrap());

    let grants = badges.grants_for_user(user.id).await.unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].badge_key, PROFILE_COMPLETE);
    assert_eq!(grants[0].badge.name, "Complete Profile");
}

#[tokio::test]
async fn test_concurrent_awards_grant_exactly_once() {
    let ctx = common::spawn().await;
    let user = ctx.register("race@example.com", "Race", "Condition").await;

    let attempts = (0..8).map(|_| {
        let badges = ctx.shared.badge_service.clone();
        let user_id = user.id;
        tokio::spawn(async move { badges.award(user_id, PROFILE_PHOTO_UPLOADED).await })
    });

    let results: Vec<bool> = futures::future::join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().expect("award must not error on a lost race"))
        .collect();

    assert_eq!(results.iter().filter(|granted| **granted).count(), 1);

    let grants = ctx.shared.badge_service.grants_for_user(user.id).await.unwrap();
    assert_eq!(grants.len(), 1);
}

#[tokio::test]
async fn test_grants_listed_oldest_first() {
    let ctx = common::spawn().await;
    let user = ctx.register("order@example.com", "Order", "Test").await;
    let store = &ctx.shared.store;

    let base = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    store
        .insert_badge_grant(user.id, "like_25_videos", base + Duration::hours(2))
        .await
        .unwrap();
    store
        .insert_badge_grant(user.id, PROFILE_COMPLETE, base)
        .await
        .unwrap();
    store
        .insert_badge_grant(user.id, "share_10_videos", base + Duration::hours(1))
        .await
        .unwrap();

    let keys: Vec<String> = ctx
        .shared
        .badge_service
        .grants_for_user(user.id)
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.badge_key)
        .collect();

    assert_eq!(
        keys,
        vec![PROFILE_COMPLETE, "share_10_videos", "like_25_videos"]
    );
}

#[tokio::test]
async fn test_unknown_badge_key_listed_without_metadata() {
    let ctx = common::spawn().await;
    let user = ctx.register("odd@example.com", "Odd", "Key").await;

    assert!(
        ctx.shared
            .badge_service
            .award(user.id, "early_adopter")
            .await
            .unwrap()
    );

    let grants = ctx.shared.badge_service.grants_for_user(user.id).await.unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].badge_key, "early_adopter");
    assert!(grants[0].badge.name.is_empty());
    assert!(grants[0].badge.description.is_empty());
}

#[tokio::test]
async fn test_grants_are_scoped_per_user() {
    let ctx = common::spawn().await;
    let first = ctx.register("one@example.com", "One", "User").await;
    let second = ctx.register("two@example.com", "Two", "User").await;

    assert!(ctx.shared.badge_service.award(first.id, PROFILE_COMPLETE).await.unwrap());
    assert!(ctx.shared.badge_service.award(second.id, PROFILE_COMPLETE).await.unwrap());

    assert!(
        ctx.shared
            .badge_service
            .grants_for_user(uuid::Uuid::new_v4())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_catalog_is_seeded_once() {
    let ctx = common::spawn().await;

    ctx.shared.store.seed_catalogs().await.unwrap();

    let catalog = ctx.shared.store.list_badge_catalog().await.unwrap();
    assert_eq!(catalog.len(), userservice::constants::badges::CATALOG.len());
}
