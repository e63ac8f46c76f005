use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::app::error::Result;
use crate::config::ApiConfig;
use crate::engine::{FeedController, TreeExpander};
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::parallel::{ParallelFetcher, DEFAULT_WORKERS};
use crate::fetcher::{ItemResolver, ItemStore};

/// Wires the item store, resolver and worker pool together and hands out
/// engine drivers that share them.
pub struct AppContext {
    pub store: Arc<dyn ItemStore + Send + Sync>,
    pub resolver: Arc<ItemResolver>,
    pub parallel_fetcher: ParallelFetcher,
    pub batch_size: usize,
}

impl AppContext {
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&api.base_url)?;
        let fetcher = HttpFetcher::new(&base_url, Duration::from_secs(api.timeout_secs))?;
        Ok(Self::with_store(Arc::new(fetcher), api.workers, api.batch_size))
    }

    pub fn with_store(
        store: Arc<dyn ItemStore + Send + Sync>,
        workers: usize,
        batch_size: usize,
    ) -> Self {
        let resolver = Arc::new(ItemResolver::new(store.clone()));
        let parallel_fetcher = ParallelFetcher::with_workers(resolver.clone(), workers);

        Self {
            store,
            resolver,
            parallel_fetcher,
            batch_size,
        }
    }

    pub fn in_memory(store: Arc<dyn ItemStore + Send + Sync>) -> Self {
        Self::with_store(store, DEFAULT_WORKERS, crate::engine::BATCH_SIZE)
    }

    pub fn feed_controller(&self) -> FeedController {
        FeedController::with_batch_size(self.parallel_fetcher.clone(), self.batch_size)
    }

    pub fn tree_expander(&self) -> TreeExpander {
        TreeExpander::new(self.parallel_fetcher.clone())
    }
}
