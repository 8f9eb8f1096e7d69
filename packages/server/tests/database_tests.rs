//! Database-backed tests (need Docker).
//!
//! Run with: cargo test --test database_tests -- --ignored

mod common;

use std::sync::Arc;

use blockly_core::common::{CommentId, ParcelId};
use blockly_core::domains::comments::activities::{
    create_comment, list_ranked_comments, seed_comments, CreateCommentInput, SeedSettings,
};
use blockly_core::domains::comments::{Comment, CommentError, VoteType};
use blockly_core::domains::parcels::activities::{NeighborIndexBuilder, ParcelPoint};
use blockly_core::domains::parcels::models::{
    NeighborSet, Parcel, PostgresNeighborStore, UpsertOutcome,
};
use blockly_core::domains::summaries::activities::gather_comments;
use blockly_core::domains::summaries::models::{
    SummaryCacheKey, SummaryMode, SummaryPayload, SummarySource,
};
use blockly_core::kernel::{BaseSummaryCache, InMemorySummaryCache};
use common::{create_comment as insert_comment, create_parcel, create_unlocated_parcel, TestHarness};
use futures::future::join_all;
use std::time::Duration;
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn neighbor_upsert_reports_created_then_updated(ctx: &TestHarness) {
    let pool = &ctx.db_pool;
    let a = create_parcel(44.9501, -93.2001, pool).await;
    let b = create_parcel(44.9502, -93.2002, pool).await;

    let before = NeighborSet::count(pool).await.unwrap();
    let first = NeighborSet::upsert(a.id, &[b.id], pool).await.unwrap();
    let second = NeighborSet::upsert(a.id, &[b.id], pool).await.unwrap();

    assert_eq!(first, UpsertOutcome::Created);
    assert_eq!(second, UpsertOutcome::Updated);
    // Other tests share the database, so only a lower bound holds
    assert!(NeighborSet::count(pool).await.unwrap() > before);

    let stored = NeighborSet::find_by_parcel(a.id, pool).await.unwrap().unwrap();
    assert_eq!(stored.neighbor_ids, vec![b.id]);
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn index_build_writes_through_postgres(ctx: &TestHarness) {
    let pool = &ctx.db_pool;
    let mut parcels = Vec::new();
    for i in 0..6 {
        parcels.push(create_parcel(45.10 + i as f64 * 0.001, -93.40, pool).await);
    }
    create_unlocated_parcel(pool).await;

    // Only this test's parcels, so the shared database does not leak in
    let points = ParcelPoint::from_parcels(&parcels);
    let store = PostgresNeighborStore::new(pool.clone());
    let report = NeighborIndexBuilder::new(2, 4).build(&points, &store).await;

    assert_eq!(report.processed, 6);
    assert_eq!(report.failed, 0);

    let middle = NeighborSet::find_by_parcel(parcels[2].id, pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(middle.neighbor_ids.len(), 2);
    assert!(middle.neighbor_ids.contains(&parcels[1].id));
    assert!(middle.neighbor_ids.contains(&parcels[3].id));
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn unlocated_parcels_are_not_listed(ctx: &TestHarness) {
    let pool = &ctx.db_pool;
    let located = create_parcel(44.90, -93.10, pool).await;
    let unlocated = create_unlocated_parcel(pool).await;

    let listed = Parcel::find_all_located(pool).await.unwrap();

    assert!(listed.iter().any(|p| p.id == located.id));
    assert!(!listed.iter().any(|p| p.id == unlocated.id));
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn creating_a_comment_invalidates_cached_summaries(ctx: &TestHarness) {
    let pool = &ctx.db_pool;
    let parcel = create_parcel(44.91, -93.11, pool).await;
    let cache = InMemorySummaryCache::new();
    let key = SummaryCacheKey::new(parcel.id, SummaryMode::Structured, 3);
    cache
        .put(
            key,
            0,
            SummaryPayload::no_comments(SummaryMode::Structured),
            SummarySource::Generated,
        )
        .await;

    let input = CreateCommentInput {
        parcel_id: Some(parcel.id.into()),
        user_id: Some(7),
        content: Some("  Needs more trees  ".to_string()),
    };
    let comment = create_comment(&input, &cache, pool).await.unwrap();

    assert_eq!(comment.content, "Needs more trees");
    assert_eq!(comment.upvotes, 0);
    assert!(cache.get(&key, 0, Duration::from_secs(600)).await.is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn comment_on_unknown_parcel_is_rejected(ctx: &TestHarness) {
    let cache = InMemorySummaryCache::new();
    let input = CreateCommentInput {
        parcel_id: Some(i64::MAX),
        user_id: Some(1),
        content: Some("Hello".to_string()),
    };

    let result = create_comment(&input, &cache, &ctx.db_pool).await;

    assert!(matches!(result, Err(CommentError::ParcelNotFound(_))));
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn concurrent_votes_are_not_lost(ctx: &TestHarness) {
    let pool = &ctx.db_pool;
    let parcel = create_parcel(44.92, -93.12, pool).await;
    let comment = insert_comment(parcel.id, "Fix the sidewalk", pool).await;

    let votes = (0..20).map(|i| {
        let vote = if i % 4 == 0 {
            VoteType::Downvote
        } else {
            VoteType::Upvote
        };
        Comment::increment_vote(comment.id, vote, pool)
    });
    for result in join_all(votes).await {
        assert!(result.unwrap().is_some());
    }

    let stored = Comment::find_by_id(comment.id, pool).await.unwrap().unwrap();
    assert_eq!(stored.upvotes, 15);
    assert_eq!(stored.downvotes, 5);
    assert_eq!(stored.net_score(), 10);
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn vote_on_missing_comment_finds_nothing(ctx: &TestHarness) {
    let missing = CommentId::from_i64(i64::MAX);
    let result = Comment::increment_vote(missing, VoteType::Upvote, &ctx.db_pool)
        .await
        .unwrap();
    assert!(result.is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn ranked_comments_put_best_first(ctx: &TestHarness) {
    let pool = &ctx.db_pool;
    let parcel = create_parcel(44.93, -93.13, pool).await;
    let plain = insert_comment(parcel.id, "Plain", pool).await;
    let popular = insert_comment(parcel.id, "Popular", pool).await;
    Comment::increment_vote(popular.id, VoteType::Upvote, pool).await.unwrap();
    Comment::increment_vote(popular.id, VoteType::Upvote, pool).await.unwrap();

    let ranked = list_ranked_comments(parcel.id, pool).await.unwrap();

    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].comment.id, popular.id);
    assert_eq!(ranked[0].net_score, 2);
    assert_eq!(ranked[1].comment.id, plain.id);
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn gather_includes_neighbor_comments_after_own(ctx: &TestHarness) {
    let pool = &ctx.db_pool;
    let target = create_parcel(44.94, -93.14, pool).await;
    let neighbor = create_parcel(44.9401, -93.1401, pool).await;
    let stranger = create_parcel(44.99, -93.19, pool).await;

    insert_comment(target.id, "Own comment", pool).await;
    insert_comment(neighbor.id, "Neighbor comment", pool).await;
    insert_comment(stranger.id, "Far away comment", pool).await;
    NeighborSet::upsert(target.id, &[neighbor.id], pool).await.unwrap();

    let gathered = gather_comments(target.id, 50, pool).await.unwrap();

    assert_eq!(gathered.own_count, 1);
    assert_eq!(gathered.neighbor_count, 1);
    assert_eq!(gathered.texts(), vec!["Own comment", "Neighbor comment"]);
    assert_eq!(gathered.fingerprint(), 2);

    let capped = gather_comments(target.id, 1, pool).await.unwrap();
    assert_eq!(capped.texts(), vec!["Own comment"]);
    assert_eq!(capped.fingerprint(), 2);
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn gather_without_neighbor_set_uses_own_comments(ctx: &TestHarness) {
    let pool = &ctx.db_pool;
    let parcel = create_parcel(44.95, -93.15, pool).await;
    insert_comment(parcel.id, "Only me", pool).await;

    let gathered = gather_comments(parcel.id, 50, pool).await.unwrap();

    assert_eq!(gathered.neighbor_count, 0);
    assert_eq!(gathered.texts(), vec!["Only me"]);
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn parcel_lookup_by_id(ctx: &TestHarness) {
    let pool = &ctx.db_pool;
    let parcel = create_parcel(44.96, -93.16, pool).await;

    assert!(Parcel::exists(parcel.id, pool).await.unwrap());
    assert!(!Parcel::exists(ParcelId::from_i64(i64::MAX), pool).await.unwrap());

    let found = Parcel::find_by_id(parcel.id, pool).await.unwrap().unwrap();
    assert_eq!(found.latitude, Some(44.96));
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn summary_service_works_with_shared_cache_handle(ctx: &TestHarness) {
    // Route wiring: the cache in ServerDeps is the one create_comment invalidates
    let pool = &ctx.db_pool;
    let parcel = create_parcel(44.97, -93.17, pool).await;
    let cache: Arc<dyn BaseSummaryCache> = Arc::new(InMemorySummaryCache::new());
    let key = SummaryCacheKey::new(parcel.id, SummaryMode::Narrative, 3);
    cache
        .put(
            key,
            1,
            SummaryPayload::no_comments(SummaryMode::Narrative),
            SummarySource::Generated,
        )
        .await;

    let input = CreateCommentInput {
        parcel_id: Some(parcel.id.into()),
        user_id: Some(2),
        content: Some("Benches please".to_string()),
    };
    create_comment(&input, cache.as_ref(), pool).await.unwrap();

    assert!(cache.get(&key, 1, Duration::from_secs(300)).await.is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn seeding_inserts_requested_comments(ctx: &TestHarness) {
    let pool = &ctx.db_pool;
    create_parcel(44.98, -93.18, pool).await;

    let settings = SeedSettings {
        comments: Some(12),
        authors: 3,
        seed: Some(11),
    };
    let report = seed_comments(settings, pool).await.unwrap();

    assert_eq!(report.requested, 12);
    assert_eq!(report.created, 12);
    assert_eq!(report.failed, 0);
    assert!(report.parcels >= 1);
}
