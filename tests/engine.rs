use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use thicket::app::AppContext;
use thicket::domain::{FeedType, Item};
use thicket::engine::{FeedEvent, FeedState};
use thicket::fetcher::MemoryItemStore;

fn story(id: i64, kids: &[i64]) -> Item {
    let mut item = Item::new(id);
    item.kind = Some("story".to_string());
    item.title = Some(format!("Story {}", id));
    item.child_ids = kids.to_vec();
    item
}

fn comment(id: i64, kids: &[i64]) -> Item {
    let mut item = Item::new(id);
    item.kind = Some("comment".to_string());
    item.text = Some(format!("Reply {}", id));
    item.child_ids = kids.to_vec();
    item
}

fn context(store: MemoryItemStore, batch_size: usize) -> (Arc<MemoryItemStore>, AppContext) {
    let store = Arc::new(store);
    let ctx = AppContext::with_store(store.clone(), 8, batch_size);
    (store, ctx)
}

#[tokio::test]
async fn feed_drops_failed_item_and_keeps_the_rest() {
    let store = MemoryItemStore::new()
        .with_feed(FeedType::Top, &[1, 2, 3])
        .with_item(story(1, &[]))
        .with_broken_item(2)
        .with_item(story(3, &[]))
        .with_delay(1, Duration::from_millis(40));
    let (_, ctx) = context(store, 20);
    let mut controller = ctx.feed_controller();

    controller.load_feed(FeedType::Top).await.unwrap();
    let mut appended = Vec::new();
    let mut finished = None;
    while let Some(event) = controller.next_event().await {
        match event {
            FeedEvent::Appended { item, .. } => appended.push(item.id),
            FeedEvent::BatchFinished { dropped, .. } => finished = Some(dropped),
        }
    }

    // 1 is slowed down, so it lands last
    assert_eq!(appended, vec![3, 1]);
    assert_eq!(controller.stories().len(), 2);
    assert_eq!(finished, Some(1));
}

#[tokio::test]
async fn thread_skips_dead_reply() {
    let mut dead = comment(11, &[110]);
    dead.dead = true;
    let store = MemoryItemStore::new()
        .with_item(story(1, &[10, 11]))
        .with_item(comment(10, &[100]))
        .with_item(dead)
        .with_item(comment(100, &[]))
        .with_item(comment(110, &[]));
    let (store, ctx) = context(store, 20);
    let mut expander = ctx.tree_expander();

    expander.expand(1, &[10, 11]);
    let tree = expander.settle().await.unwrap();

    let top: Vec<i64> = tree.top_level().map(|n| n.id()).collect();
    assert_eq!(top, vec![10]);
    let replies: Vec<i64> = tree.children(10).map(|n| n.id()).collect();
    assert_eq!(replies, vec![100]);
    assert!(tree.get(11).is_none());
    assert!(!store.requested().contains(&110));
}

#[tokio::test]
async fn paging_to_the_end_yields_each_story_once() {
    let mut ids: Vec<i64> = (1..=47).collect();
    // upstream lists can repeat an id
    ids.push(5);
    ids.push(30);
    let store = (1..=47)
        .filter(|id| id % 10 != 0)
        .fold(MemoryItemStore::new().with_feed(FeedType::New, &ids), |store, id| {
            store.with_item(story(id, &[]))
        });
    let (_, ctx) = context(store, 20);
    let mut controller = ctx.feed_controller();

    controller.load_feed(FeedType::New).await.unwrap();
    controller.settle().await;
    while controller.load_more() {
        controller.settle().await;
    }

    let unique: HashSet<i64> = controller.stories().iter().map(|s| s.id).collect();
    assert_eq!(unique.len(), controller.stories().len());
    assert_eq!(controller.stories().len(), 43);
    assert!(controller.is_exhausted());
    assert!(!controller.load_more());
}

#[tokio::test]
async fn rapid_near_end_signals_dispatch_one_batch() {
    let ids: Vec<i64> = (1..=30).collect();
    let store = ids
        .iter()
        .fold(MemoryItemStore::new().with_feed(FeedType::Best, &ids), |store, &id| {
            store
                .with_item(story(id, &[]))
                .with_delay(id, Duration::from_millis(10))
        });
    let (store, ctx) = context(store, 10);
    let mut controller = ctx.feed_controller();

    controller.load_feed(FeedType::Best).await.unwrap();
    for position in 0..5 {
        assert!(!controller.on_near_end(position));
    }
    controller.settle().await;

    let mut requested = store.requested();
    requested.sort();
    assert_eq!(requested, (1..=10).collect::<Vec<_>>());
}

#[tokio::test]
async fn story_without_replies_needs_no_fetches() {
    let (store, ctx) = context(MemoryItemStore::new(), 20);
    let mut expander = ctx.tree_expander();

    expander.expand(1, &[]);
    assert!(expander.is_complete());
    assert!(expander.settle().await.unwrap().flatten().is_empty());
    assert!(store.requested().is_empty());
}

#[tokio::test]
async fn deleted_comment_hides_its_subtree() {
    let mut deleted = comment(10, &[100, 101]);
    deleted.deleted = true;
    let store = MemoryItemStore::new()
        .with_item(deleted)
        .with_item(comment(11, &[]))
        .with_item(comment(100, &[]))
        .with_item(comment(101, &[]));
    let (store, ctx) = context(store, 20);
    let mut expander = ctx.tree_expander();

    expander.expand(1, &[10, 11]);
    let mut arrived = Vec::new();
    while let Some(arrival) = expander.next_event().await {
        arrived.push(arrival.item.id);
    }

    assert_eq!(arrived, vec![11]);
    let requested = store.requested();
    assert!(!requested.contains(&100));
    assert!(!requested.contains(&101));
}

#[tokio::test]
async fn switching_feed_discards_late_results() {
    let store = MemoryItemStore::new()
        .with_feed(FeedType::Top, &[1, 2])
        .with_feed(FeedType::Ask, &[3])
        .with_item(story(1, &[]))
        .with_item(story(2, &[]))
        .with_item(story(3, &[]))
        .with_delay(1, Duration::from_millis(50))
        .with_delay(2, Duration::from_millis(50));
    let (_, ctx) = context(store, 20);
    let mut controller = ctx.feed_controller();

    controller.load_feed(FeedType::Top).await.unwrap();
    controller.load_feed(FeedType::Ask).await.unwrap();
    controller.settle().await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    controller.poll();

    let ids: Vec<i64> = controller.stories().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![3]);
    assert_eq!(controller.state(), &FeedState::Ready(FeedType::Ask));
}

#[tokio::test]
async fn broken_id_list_fails_the_whole_feed() {
    let store = MemoryItemStore::new()
        .with_feed_body(FeedType::Show, "[1, 2")
        .with_item(story(1, &[]));
    let (store, ctx) = context(store, 20);
    let mut controller = ctx.feed_controller();

    assert!(controller.load_feed(FeedType::Show).await.is_err());
    assert!(matches!(controller.state(), FeedState::Failed { feed: FeedType::Show, .. }));
    assert!(controller.stories().is_empty());
    assert!(store.requested().is_empty());
}

#[tokio::test]
async fn body_for_another_id_is_dropped_from_feed() {
    let store = MemoryItemStore::new()
        .with_feed(FeedType::Top, &[1, 2])
        .with_item(story(1, &[]))
        .with_item_body(2, r#"{"id":1,"type":"story","title":"Story 1 again"}"#);
    let (_, ctx) = context(store, 20);
    let mut controller = ctx.feed_controller();

    controller.load_feed(FeedType::Top).await.unwrap();
    let mut dropped = 0;
    while let Some(event) = controller.next_event().await {
        if let FeedEvent::BatchFinished { dropped: n, .. } = event {
            dropped = n;
        }
    }

    let ids: Vec<i64> = controller.stories().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![1]);
    assert_eq!(dropped, 1);
}

#[tokio::test]
async fn body_for_another_id_cannot_replace_a_comment() {
    let store = MemoryItemStore::new()
        .with_item(comment(10, &[]))
        .with_item_body(11, r#"{"id":10,"type":"comment","text":"impostor"}"#)
        .with_delay(11, Duration::from_millis(20));
    let (_, ctx) = context(store, 20);
    let mut expander = ctx.tree_expander();

    expander.expand(1, &[10, 11]);
    let tree = expander.settle().await.unwrap();

    let top: Vec<i64> = tree.top_level().map(|n| n.id()).collect();
    assert_eq!(top, vec![10]);
    assert_eq!(tree.get(10).unwrap().item.text.as_deref(), Some("Reply 10"));
    assert_eq!(tree.dropped(), 1);
}
