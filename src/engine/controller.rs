use std::collections::VecDeque;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::app::Result;
use crate::domain::{FeedType, Generation, Item, ItemRole};
use crate::engine::pager::FeedSnapshot;
use crate::fetcher::{ParallelFetcher, Resolution};

pub const BATCH_SIZE: usize = 20;

/// How close to the end of the loaded stories the consumer must be before
/// [`FeedController::on_near_end`] pulls the next batch.
pub const NEAR_END_THRESHOLD: usize = 5;

/// Feed-level state for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedState {
    Idle,
    Loading(FeedType),
    Ready(FeedType),
    /// The id list could not be fetched. Nothing from this load is shown.
    Failed { feed: FeedType, message: String },
}

#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// A story joined the feed at `index`. Stories appear in completion
    /// order, not in the upstream's ranking order.
    Appended { index: usize, item: Item },
    /// Every fetch of the current batch has either landed or been dropped.
    BatchFinished {
        appended: usize,
        dropped: usize,
        exhausted: bool,
    },
}

#[derive(Debug)]
struct BatchProgress {
    outstanding: usize,
    appended: usize,
    dropped: usize,
}

/// Owns the current [`FeedSnapshot`] and the append-only story list built
/// from it.
///
/// Item fetches run on spawned tasks; their results come back over a channel
/// and are applied here, so this is the only writer of the story list. At
/// most one batch is in flight at a time.
pub struct FeedController {
    fetcher: ParallelFetcher,
    batch_size: usize,
    generation: Generation,
    snapshot: Option<FeedSnapshot>,
    stories: Vec<Item>,
    state: FeedState,
    in_flight: Option<BatchProgress>,
    events: VecDeque<FeedEvent>,
    tx: mpsc::UnboundedSender<Resolution<Generation>>,
    rx: mpsc::UnboundedReceiver<Resolution<Generation>>,
}

impl FeedController {
    pub fn new(fetcher: ParallelFetcher) -> Self {
        Self::with_batch_size(fetcher, BATCH_SIZE)
    }

    pub fn with_batch_size(fetcher: ParallelFetcher, batch_size: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            fetcher,
            batch_size: batch_size.max(1),
            generation: Generation::default(),
            snapshot: None,
            stories: Vec::new(),
            state: FeedState::Idle,
            in_flight: None,
            events: VecDeque::new(),
            tx,
            rx,
        }
    }

    /// Replace the current feed: fetch its id list into a fresh snapshot and
    /// start the first batch.
    ///
    /// Anything still in flight for the previous snapshot is discarded when
    /// it arrives. An id-list failure leaves the feed empty in
    /// [`FeedState::Failed`] and is returned.
    pub async fn load_feed(&mut self, feed_type: FeedType) -> Result<()> {
        self.generation = self.generation.next();
        let generation = self.generation;

        self.snapshot = None;
        self.stories.clear();
        self.in_flight = None;
        self.events.clear();
        self.state = FeedState::Loading(feed_type);
        info!(feed = %feed_type, %generation, "Loading feed");

        let ids = match self
            .fetcher
            .resolver()
            .store()
            .fetch_id_list(feed_type)
            .await
        {
            Ok(ids) => ids,
            Err(e) => {
                error!(feed = %feed_type, error = %e, "Failed to load feed");
                self.state = FeedState::Failed {
                    feed: feed_type,
                    message: e.to_string(),
                };
                return Err(e);
            }
        };

        info!(feed = %feed_type, count = ids.len(), "Feed id list loaded");
        self.snapshot = Some(FeedSnapshot::new(feed_type, ids, generation));
        self.state = FeedState::Ready(feed_type);
        self.load_more();
        Ok(())
    }

    /// Reload the current feed type from scratch.
    pub async fn refresh(&mut self) -> Result<()> {
        match self.feed_type() {
            Some(feed_type) => self.load_feed(feed_type).await,
            None => Ok(()),
        }
    }

    /// Dispatch the next batch. Returns `false` without doing anything when
    /// a batch is already in flight, no feed is loaded, or the feed is used
    /// up.
    pub fn load_more(&mut self) -> bool {
        if self.in_flight.is_some() {
            debug!("Batch already in flight");
            return false;
        }
        let Some(snapshot) = self.snapshot.as_mut() else {
            return false;
        };

        let batch = snapshot.pager.next_batch(self.batch_size);
        if batch.is_empty() {
            return false;
        }

        debug!(
            feed = %snapshot.feed_type,
            cursor = snapshot.pager.cursor(),
            size = batch.len(),
            "Dispatching batch"
        );
        let outstanding =
            self.fetcher
                .dispatch(&batch, ItemRole::Story, snapshot.generation, &self.tx);
        self.in_flight = Some(BatchProgress {
            outstanding,
            appended: 0,
            dropped: 0,
        });
        true
    }

    /// Scroll signal from the consumer: `position` is the index of the story
    /// it is looking at. Loads more when fewer than [`NEAR_END_THRESHOLD`]
    /// stories remain below it.
    pub fn on_near_end(&mut self, position: usize) -> bool {
        let remaining = self.stories.len().saturating_sub(position + 1);
        if remaining >= NEAR_END_THRESHOLD {
            return false;
        }
        self.load_more()
    }

    /// Apply every result that has already arrived, without waiting.
    pub fn poll(&mut self) -> Vec<FeedEvent> {
        while let Ok(resolution) = self.rx.try_recv() {
            self.apply(resolution);
        }
        self.events.drain(..).collect()
    }

    /// Wait for the next event of the current generation. `None` once no
    /// batch is in flight and every event has been handed out.
    pub async fn next_event(&mut self) -> Option<FeedEvent> {
        loop {
            if let Some(event) = self.events.pop_front() {
                return Some(event);
            }
            self.in_flight.as_ref()?;
            let resolution = self.rx.recv().await?;
            self.apply(resolution);
        }
    }

    /// Wait until the in-flight batch, if any, is finished.
    pub async fn settle(&mut self) {
        while self.next_event().await.is_some() {}
    }

    fn apply(&mut self, resolution: Resolution<Generation>) {
        let Some(snapshot) = self.snapshot.as_ref() else {
            debug!(id = resolution.id, "Discarding result with no feed loaded");
            return;
        };
        if resolution.tag != snapshot.generation {
            debug!(
                id = resolution.id,
                stale = %resolution.tag,
                current = %snapshot.generation,
                "Discarding stale result"
            );
            return;
        }
        let exhausted = snapshot.pager.is_exhausted();
        let Some(progress) = self.in_flight.as_mut() else {
            return;
        };

        progress.outstanding = progress.outstanding.saturating_sub(1);
        match resolution.result {
            Ok(item) => {
                let index = self.stories.len();
                self.stories.push(item.clone());
                progress.appended += 1;
                self.events.push_back(FeedEvent::Appended { index, item });
            }
            Err(e) => {
                if e.is_item_local() {
                    debug!(id = resolution.id, error = %e, "Dropping story");
                } else {
                    warn!(id = resolution.id, error = %e, "Dropping story");
                }
                progress.dropped += 1;
            }
        }

        if progress.outstanding == 0 {
            info!(
                appended = progress.appended,
                dropped = progress.dropped,
                exhausted,
                "Batch finished"
            );
            self.events.push_back(FeedEvent::BatchFinished {
                appended: progress.appended,
                dropped: progress.dropped,
                exhausted,
            });
            self.in_flight = None;
        }
    }

    pub fn stories(&self) -> &[Item] {
        &self.stories
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn feed_type(&self) -> Option<FeedType> {
        match &self.state {
            FeedState::Idle => None,
            FeedState::Loading(feed) | FeedState::Ready(feed) => Some(*feed),
            FeedState::Failed { feed, .. } => Some(*feed),
        }
    }

    pub fn snapshot(&self) -> Option<&FeedSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some() || matches!(self.state, FeedState::Loading(_))
    }

    pub fn is_exhausted(&self) -> bool {
        self.snapshot
            .as_ref()
            .is_some_and(|snapshot| snapshot.pager.is_exhausted())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::fetcher::{ItemResolver, MemoryItemStore};

    fn story(id: i64) -> Item {
        let mut item = Item::new(id);
        item.title = Some(format!("Story {}", id));
        item
    }

    fn seeded(feed: FeedType, ids: &[i64]) -> MemoryItemStore {
        ids.iter()
            .fold(MemoryItemStore::new().with_feed(feed, ids), |store, id| {
                store.with_item(story(*id))
            })
    }

    fn controller(store: Arc<MemoryItemStore>, batch_size: usize) -> FeedController {
        let resolver = Arc::new(ItemResolver::new(store));
        FeedController::with_batch_size(ParallelFetcher::with_workers(resolver, 8), batch_size)
    }

    fn ids(controller: &FeedController) -> Vec<i64> {
        controller.stories().iter().map(|s| s.id).collect()
    }

    #[tokio::test]
    async fn test_load_feed_dispatches_first_batch() {
        let all: Vec<i64> = (1..=45).collect();
        let store = Arc::new(seeded(FeedType::Top, &all));
        let mut controller = controller(store.clone(), 20);

        controller.load_feed(FeedType::Top).await.unwrap();
        assert!(controller.is_loading());
        controller.settle().await;

        assert_eq!(controller.stories().len(), 20);
        assert_eq!(controller.state(), &FeedState::Ready(FeedType::Top));
        assert_eq!(store.requested().len(), 20);
        assert!(!controller.is_exhausted());
    }

    #[tokio::test]
    async fn test_paging_until_exhausted_yields_each_id_once() {
        let mut all: Vec<i64> = (1..=45).collect();
        all.push(7);
        let mut store = seeded(FeedType::New, &all);
        store = store.with_broken_item(13).with_item_body(30, "null");
        let mut controller = controller(Arc::new(store), 20);

        controller.load_feed(FeedType::New).await.unwrap();
        controller.settle().await;
        while controller.load_more() {
            controller.settle().await;
        }

        let loaded = ids(&controller);
        let unique: HashSet<i64> = loaded.iter().copied().collect();
        assert_eq!(unique.len(), loaded.len());
        assert_eq!(loaded.len(), 43);
        assert!(!unique.contains(&13));
        assert!(!unique.contains(&30));
        assert!(controller.is_exhausted());
        assert!(!controller.load_more());
    }

    #[tokio::test]
    async fn test_reentrant_load_more_is_noop() {
        let all: Vec<i64> = (1..=30).collect();
        let store = Arc::new(
            seeded(FeedType::Top, &all).with_delay(1, Duration::from_millis(50)),
        );
        let mut controller = controller(store.clone(), 10);

        controller.load_feed(FeedType::Top).await.unwrap();
        assert!(!controller.load_more());
        assert!(!controller.load_more());
        assert_eq!(controller.snapshot().unwrap().pager.cursor(), 10);

        controller.settle().await;
        assert_eq!(store.requested().len(), 10);
        assert!(controller.load_more());
        assert_eq!(controller.snapshot().unwrap().pager.cursor(), 20);
    }

    #[tokio::test]
    async fn test_events_follow_completion_order() {
        let store = seeded(FeedType::Best, &[1, 2, 3]).with_delay(1, Duration::from_millis(60));
        let mut controller = controller(Arc::new(store), 20);
        controller.load_feed(FeedType::Best).await.unwrap();

        let mut appended = Vec::new();
        let mut finished = None;
        while let Some(event) = controller.next_event().await {
            match event {
                FeedEvent::Appended { index, item } => {
                    assert_eq!(index, appended.len());
                    appended.push(item.id);
                }
                FeedEvent::BatchFinished {
                    appended,
                    dropped,
                    exhausted,
                } => finished = Some((appended, dropped, exhausted)),
            }
        }

        assert_eq!(appended.last(), Some(&1));
        assert_eq!(appended.len(), 3);
        assert_eq!(finished, Some((3, 0, true)));
    }

    #[tokio::test]
    async fn test_switching_feed_discards_old_results() {
        let store = seeded(FeedType::Top, &[1, 2, 3])
            .with_delay(1, Duration::from_millis(40))
            .with_delay(2, Duration::from_millis(40))
            .with_delay(3, Duration::from_millis(40))
            .with_feed(FeedType::Ask, &[4, 5])
            .with_item(story(4))
            .with_item(story(5));
        let mut controller = controller(Arc::new(store), 20);

        controller.load_feed(FeedType::Top).await.unwrap();
        let first = controller.generation();
        controller.load_feed(FeedType::Ask).await.unwrap();
        assert_ne!(first, controller.generation());
        controller.settle().await;

        // give the abandoned fetches time to land, then drain them
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(controller.poll().is_empty());

        let mut loaded = ids(&controller);
        loaded.sort();
        assert_eq!(loaded, vec![4, 5]);
    }

    #[tokio::test]
    async fn test_id_list_failure_is_terminal() {
        let store = MemoryItemStore::new().with_feed_body(FeedType::Show, "<html>oops</html>");
        let mut controller = controller(Arc::new(store), 20);

        tokio_test::assert_err!(controller.load_feed(FeedType::Show).await);
        assert!(matches!(
            controller.state(),
            FeedState::Failed { feed: FeedType::Show, .. }
        ));
        assert!(controller.stories().is_empty());
        assert!(!controller.load_more());
        assert_eq!(controller.feed_type(), Some(FeedType::Show));
    }

    #[tokio::test]
    async fn test_on_near_end_respects_threshold() {
        let all: Vec<i64> = (1..=40).collect();
        let mut controller = controller(Arc::new(seeded(FeedType::Top, &all)), 10);
        controller.load_feed(FeedType::Top).await.unwrap();
        controller.settle().await;

        assert!(!controller.on_near_end(0));
        assert!(!controller.on_near_end(4));
        assert!(controller.on_near_end(5));
        // already loading
        assert!(!controller.on_near_end(9));
        controller.settle().await;
        assert_eq!(controller.stories().len(), 20);
    }

    #[tokio::test]
    async fn test_empty_feed() {
        let mut controller = controller(Arc::new(MemoryItemStore::new()), 20);
        controller.load_feed(FeedType::Job).await.unwrap();
        assert!(controller.next_event().await.is_none());
        assert!(controller.is_exhausted());
        assert!(!controller.on_near_end(0));
    }

    #[tokio::test]
    async fn test_refresh_starts_new_generation() {
        let mut controller = controller(Arc::new(seeded(FeedType::Top, &[1, 2])), 20);
        assert!(controller.refresh().await.is_ok());
        assert_eq!(controller.state(), &FeedState::Idle);

        controller.load_feed(FeedType::Top).await.unwrap();
        controller.settle().await;
        let before = controller.generation();

        controller.refresh().await.unwrap();
        assert!(controller.generation() > before);
        controller.settle().await;
        assert_eq!(controller.stories().len(), 2);
    }
}
