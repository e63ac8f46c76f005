use std::sync::Arc;

use tracing::debug;

use crate::app::{Result, ThicketError};
use crate::domain::{Item, ItemRole};
use crate::fetcher::ItemStore;

/// Fetches a single item and applies the visibility filter.
///
/// Deleted and dead items come back as [`ThicketError::Removed`] so callers
/// handle them exactly like a failed fetch.
pub struct ItemResolver {
    store: Arc<dyn ItemStore + Send + Sync>,
}

impl ItemResolver {
    pub fn new(store: Arc<dyn ItemStore + Send + Sync>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ItemStore + Send + Sync> {
        &self.store
    }

    pub async fn resolve(&self, id: i64, role: ItemRole) -> Result<Item> {
        let item = self.store.fetch_item(id).await?;
        if item.is_removed() {
            debug!(id, ?role, deleted = item.deleted, dead = item.dead, "Filtered removed item");
            return Err(ThicketError::Removed(id));
        }
        Ok(item)
    }
}
