use std::sync::Arc;

use futures::stream::{FuturesUnordered, Stream, StreamExt};
use tokio::sync::{mpsc, Semaphore};

use crate::app::Result;
use crate::domain::{Item, ItemRole};
use crate::fetcher::ItemResolver;

pub const DEFAULT_WORKERS: usize = 10;

/// Outcome of one dispatched fetch, carrying the caller's tag back.
#[derive(Debug)]
pub struct Resolution<T> {
    pub tag: T,
    pub id: i64,
    pub result: Result<Item>,
}

/// Runs item resolutions concurrently, bounded by a semaphore.
///
/// Tasks never touch caller state: every result is sent over a channel and
/// applied by whoever owns the receiving end.
#[derive(Clone)]
pub struct ParallelFetcher {
    resolver: Arc<ItemResolver>,
    semaphore: Arc<Semaphore>,
}

impl ParallelFetcher {
    pub fn new(resolver: Arc<ItemResolver>) -> Self {
        Self::with_workers(resolver, DEFAULT_WORKERS)
    }

    pub fn with_workers(resolver: Arc<ItemResolver>, workers: usize) -> Self {
        Self {
            resolver,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    pub fn resolver(&self) -> &Arc<ItemResolver> {
        &self.resolver
    }

    /// Spawn one task per id. Returns the number of tasks spawned, which is
    /// the number of [`Resolution`]s that will eventually be sent.
    ///
    /// Sends to a closed channel are ignored.
    pub fn dispatch<T>(
        &self,
        ids: &[i64],
        role: ItemRole,
        tag: T,
        tx: &mpsc::UnboundedSender<Resolution<T>>,
    ) -> usize
    where
        T: Clone + Send + 'static,
    {
        for &id in ids {
            let resolver = self.resolver.clone();
            let semaphore = self.semaphore.clone();
            let tx = tx.clone();
            let tag = tag.clone();

            tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                let result = resolver.resolve(id, role).await;
                let _ = tx.send(Resolution { tag, id, result });
            });
        }

        ids.len()
    }

    /// Resolve `ids`, yielding each result as soon as it lands.
    pub fn resolve_stream(
        &self,
        ids: &[i64],
        role: ItemRole,
    ) -> impl Stream<Item = (i64, Result<Item>)> + Send + 'static {
        ids.iter()
            .map(|&id| {
                let resolver = self.resolver.clone();
                let semaphore = self.semaphore.clone();
                async move {
                    let _permit = semaphore.acquire().await;
                    (id, resolver.resolve(id, role).await)
                }
            })
            .collect::<FuturesUnordered<_>>()
    }

    /// Resolve `ids` and collect the results in completion order.
    pub async fn resolve_all(&self, ids: &[i64], role: ItemRole) -> Vec<(i64, Result<Item>)> {
        self.resolve_stream(ids, role).collect().await
    }
}
