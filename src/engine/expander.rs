use std::collections::VecDeque;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::{CommentTree, Generation, Item, ItemRole};
use crate::fetcher::{ParallelFetcher, Resolution};

/// Where a dispatched comment belongs once it resolves.
#[derive(Debug, Clone, Copy)]
struct Placement {
    generation: Generation,
    parent_id: i64,
    depth: usize,
}

/// A comment that just joined the tree, with everything needed to render it.
#[derive(Debug, Clone)]
pub struct CommentArrival {
    pub parent_id: i64,
    pub depth: usize,
    pub item: Item,
}

/// Expands a story's replies into a [`CommentTree`], one level at a time,
/// as each comment resolves.
///
/// Siblings are fetched concurrently and never wait for each other; each
/// comment's own replies are dispatched as soon as it lands. Comments that
/// fail, are deleted or are dead are dropped along with everything below
/// them, since their replies cannot be discovered.
pub struct TreeExpander {
    fetcher: ParallelFetcher,
    generation: Generation,
    tree: Option<CommentTree>,
    outstanding: usize,
    events: VecDeque<CommentArrival>,
    tx: mpsc::UnboundedSender<Resolution<Placement>>,
    rx: mpsc::UnboundedReceiver<Resolution<Placement>>,
}

impl TreeExpander {
    pub fn new(fetcher: ParallelFetcher) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            fetcher,
            generation: Generation::default(),
            tree: None,
            outstanding: 0,
            events: VecDeque::new(),
            tx,
            rx,
        }
    }

    /// Start expanding `child_ids`, the replies of `root_id`. Whatever was
    /// being expanded before is abandoned.
    pub fn expand(&mut self, root_id: i64, child_ids: &[i64]) -> Generation {
        self.reset();
        self.tree = Some(CommentTree::new(root_id, child_ids.to_vec()));
        debug!(root_id, replies = child_ids.len(), generation = %self.generation, "Expanding thread");
        self.dispatch_children(root_id, child_ids, 0);
        self.generation
    }

    /// Abandon the current expansion. Late results are discarded.
    pub fn clear(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.generation = self.generation.next();
        self.tree = None;
        self.outstanding = 0;
        self.events.clear();
    }

    fn dispatch_children(&mut self, parent_id: i64, ids: &[i64], depth: usize) {
        let Some(tree) = self.tree.as_mut() else {
            return;
        };

        let fresh: Vec<i64> = ids
            .iter()
            .copied()
            .filter(|&id| {
                let claimed = tree.claim(id);
                if !claimed {
                    warn!(id, parent_id, "Skipping reply already seen in this thread");
                }
                claimed
            })
            .collect();
        if fresh.is_empty() {
            return;
        }

        let placement = Placement {
            generation: self.generation,
            parent_id,
            depth,
        };
        self.outstanding += self
            .fetcher
            .dispatch(&fresh, ItemRole::Comment, placement, &self.tx);
    }

    fn apply(&mut self, resolution: Resolution<Placement>) {
        let placement = resolution.tag;
        if placement.generation != self.generation {
            debug!(id = resolution.id, stale = %placement.generation, "Discarding stale comment");
            return;
        }
        self.outstanding = self.outstanding.saturating_sub(1);
        let Some(tree) = self.tree.as_mut() else {
            return;
        };

        match resolution.result {
            Ok(item) => {
                let id = item.id;
                let child_ids = item.child_ids.clone();
                if tree.insert(placement.parent_id, placement.depth, item.clone()) {
                    self.events.push_back(CommentArrival {
                        parent_id: placement.parent_id,
                        depth: placement.depth,
                        item,
                    });
                    self.dispatch_children(id, &child_ids, placement.depth + 1);
                }
            }
            Err(e) if e.is_item_local() => {
                debug!(id = resolution.id, error = %e, "Dropping comment and its replies");
                tree.record_dropped();
            }
            Err(e) => {
                warn!(id = resolution.id, error = %e, "Dropping comment and its replies");
                tree.record_dropped();
            }
        }
    }

    /// Apply every result that has already arrived, without waiting.
    pub fn poll(&mut self) -> Vec<CommentArrival> {
        while let Ok(resolution) = self.rx.try_recv() {
            self.apply(resolution);
        }
        self.events.drain(..).collect()
    }

    /// Wait for the next comment of the current expansion. `None` once
    /// nothing is outstanding and every arrival has been handed out.
    pub async fn next_event(&mut self) -> Option<CommentArrival> {
        loop {
            if let Some(arrival) = self.events.pop_front() {
                return Some(arrival);
            }
            if self.outstanding == 0 {
                return None;
            }
            let resolution = self.rx.recv().await?;
            self.apply(resolution);
        }
    }

    /// Wait until the whole thread is expanded.
    pub async fn settle(&mut self) -> Option<&CommentTree> {
        while self.next_event().await.is_some() {}
        self.tree.as_ref()
    }

    pub fn tree(&self) -> Option<&CommentTree> {
        self.tree.as_ref()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn is_complete(&self) -> bool {
        self.tree.is_some() && self.outstanding == 0
    }
}
