//! Incremental fetch-and-assemble engine.
//!
//! ```text
//! FeedController ──▶ FeedPager (batches of ids)
//!        │
//!        └──▶ ParallelFetcher ──▶ ItemResolver ──▶ ItemStore
//!                    ▲
//! TreeExpander ──────┘ (recursively, one level per arrival)
//! ```
//!
//! Both drivers own a channel receiver and are the only writers of their
//! state. Every unit of work carries a [`Generation`](crate::domain::Generation)
//! so results that land after a feed switch or a new expansion are dropped.

pub mod controller;
pub mod expander;
pub mod pager;

pub use controller::{FeedController, FeedEvent, FeedState, BATCH_SIZE, NEAR_END_THRESHOLD};
pub use expander::{CommentArrival, TreeExpander};
pub use pager::{FeedPager, FeedSnapshot};
