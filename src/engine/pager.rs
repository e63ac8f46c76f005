use std::collections::HashSet;

use crate::domain::{FeedType, Generation};

/// Forward-only cursor over a feed's id list.
///
/// Not meant to be shared: a single owner (the feed controller) drives it.
#[derive(Debug, Clone)]
pub struct FeedPager {
    ordered_ids: Vec<i64>,
    cursor: usize,
}

impl FeedPager {
    pub fn new(ordered_ids: Vec<i64>) -> Self {
        Self {
            ordered_ids,
            cursor: 0,
        }
    }

    /// Next `[cursor, cursor + batch_size)` slice, clipped to the list.
    /// Empty once the list is used up.
    pub fn next_batch(&mut self, batch_size: usize) -> Vec<i64> {
        let end = self
            .cursor
            .saturating_add(batch_size)
            .min(self.ordered_ids.len());
        let batch = self.ordered_ids[self.cursor..end].to_vec();
        self.cursor = end;
        batch
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.ordered_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered_ids.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.ordered_ids.len()
    }
}

/// The id list of one feed load, tagged with the generation that owns it.
///
/// Replaced wholesale on a feed switch or refresh, never edited in place.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub feed_type: FeedType,
    pub generation: Generation,
    pub pager: FeedPager,
}

impl FeedSnapshot {
    /// Repeated ids keep their first position only.
    pub fn new(feed_type: FeedType, ids: Vec<i64>, generation: Generation) -> Self {
        let mut seen = HashSet::with_capacity(ids.len());
        let ordered_ids = ids.into_iter().filter(|id| seen.insert(*id)).collect();
        Self {
            feed_type,
            generation,
            pager: FeedPager::new(ordered_ids),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batches_are_sequential_and_clipped() {
        let mut pager = FeedPager::new((1..=45).collect());

        assert_eq!(pager.next_batch(20), (1..=20).collect::<Vec<_>>());
        assert_eq!(pager.cursor(), 20);
        assert_eq!(pager.next_batch(20), (21..=40).collect::<Vec<_>>());
        assert_eq!(pager.next_batch(20), vec![41, 42, 43, 44, 45]);
        assert!(pager.is_exhausted());
        assert!(pager.next_batch(20).is_empty());
        assert_eq!(pager.cursor(), 45);
    }

    #[test]
    fn test_empty_list() {
        let mut pager = FeedPager::new(Vec::new());
        assert!(pager.is_exhausted());
        assert!(pager.next_batch(20).is_empty());
        assert_eq!(pager.cursor(), 0);
    }

    #[test]
    fn test_zero_batch_size_does_not_advance() {
        let mut pager = FeedPager::new(vec![1, 2]);
        assert!(pager.next_batch(0).is_empty());
        assert_eq!(pager.cursor(), 0);
        assert!(!pager.is_exhausted());
    }

    #[test]
    fn test_snapshot_collapses_duplicates() {
        let mut snapshot =
            FeedSnapshot::new(FeedType::Top, vec![3, 1, 3, 2, 1], Generation::default());
        assert_eq!(snapshot.pager.len(), 3);
        assert_eq!(snapshot.pager.next_batch(10), vec![3, 1, 2]);
    }
}
