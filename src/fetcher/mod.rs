pub mod http_fetcher;
pub mod memory;
pub mod parallel;
pub mod resolver;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::{FeedType, Item};

pub use http_fetcher::HttpFetcher;
pub use memory::MemoryItemStore;
pub use parallel::{ParallelFetcher, Resolution};
pub use resolver::ItemResolver;

/// Read-only access to the remote item API.
///
/// Every call is exactly one request: no retry, no caching.
#[async_trait]
pub trait ItemStore {
    /// Fetch one item. `NotFound` when the upstream answers `null`.
    async fn fetch_item(&self, id: i64) -> Result<Item>;

    /// Fetch the ordered id list behind a feed.
    async fn fetch_id_list(&self, feed: FeedType) -> Result<Vec<i64>>;
}
