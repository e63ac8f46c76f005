use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::{FeedType, Item};
use crate::fetcher::ItemStore;
use crate::normalizer::Normalizer;

/// In-process [`ItemStore`] serving canned response bodies.
///
/// Bodies go through the same [`Normalizer`] as the HTTP store, so unknown
/// ids answer `null` (NotFound) and broken bodies surface as parse errors.
/// Every item request is recorded.
#[derive(Default)]
pub struct MemoryItemStore {
    feeds: HashMap<FeedType, String>,
    items: HashMap<i64, String>,
    delays: HashMap<i64, Duration>,
    requested: Mutex<Vec<i64>>,
    normalizer: Normalizer,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(self, feed: FeedType, ids: &[i64]) -> Self {
        let body = serde_json::to_string(ids).unwrap_or_else(|_| "[]".to_string());
        self.with_feed_body(feed, &body)
    }

    pub fn with_feed_body(mut self, feed: FeedType, body: &str) -> Self {
        self.feeds.insert(feed, body.to_string());
        self
    }

    pub fn with_item(self, item: Item) -> Self {
        let id = item.id;
        let body = serde_json::to_string(&item).unwrap_or_else(|_| "null".to_string());
        self.with_item_body(id, &body)
    }

    pub fn with_item_body(mut self, id: i64, body: &str) -> Self {
        self.items.insert(id, body.to_string());
        self
    }

    /// Serve a truncated body for `id`.
    pub fn with_broken_item(self, id: i64) -> Self {
        self.with_item_body(id, "{\"id\":")
    }

    /// Delay the response for `id`.
    pub fn with_delay(mut self, id: i64, delay: Duration) -> Self {
        self.delays.insert(id, delay);
        self
    }

    /// Item ids requested so far, in request order.
    pub fn requested(&self) -> Vec<i64> {
        self.requested
            .lock()
            .map(|requested| requested.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn fetch_item(&self, id: i64) -> Result<Item> {
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(id);
        }
        if let Some(delay) = self.delays.get(&id) {
            tokio::time::sleep(*delay).await;
        }
        let body = self.items.get(&id).map(String::as_str).unwrap_or("null");
        self.normalizer.normalize_item(id, body.as_bytes())
    }

    async fn fetch_id_list(&self, feed: FeedType) -> Result<Vec<i64>> {
        let body = self.feeds.get(&feed).map(String::as_str).unwrap_or("null");
        self.normalizer.normalize_id_list(body.as_bytes())
    }
}
