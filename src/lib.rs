//! # Thicket
//!
//! A terminal client for the Hacker News item API that pages through story
//! feeds and expands comment threads incrementally.
//!
//! ## Architecture
//!
//! ```text
//! ItemStore → ItemResolver → ParallelFetcher → FeedController / TreeExpander → UI
//! ```
//!
//! Every story and comment is a separate request. The engine dispatches them
//! concurrently and assembles results in completion order, so nothing waits
//! on the slowest item.
//!
//! ## Quick Start
//!
//! ```bash
//! # First two pages of the top stories
//! thicket stories --feed top --pages 2
//!
//! # A story with its full comment tree
//! thicket thread 8863
//!
//! # Launch TUI
//! thicket tui --feed ask
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the item store,
/// resolver and worker pool.
pub mod app;

/// Configuration management.
///
/// Loads from `~/.config/thicket/config.toml`, supporting:
/// - API base URL, timeout, worker count and batch size
/// - Custom colors (named or hex)
/// - Custom keybindings
pub mod config;

/// Command-line interface using clap.
///
/// - `stories [--feed] [--pages]` - List stories from a feed
/// - `thread <id>` - Print a story and its comment tree
/// - `item <id>...` - Print items as JSON
/// - `tui [--feed]` - Launch the TUI
pub mod cli;

/// Core domain models.
///
/// - [`Item`](domain::Item): A story or comment as served by the API
/// - [`FeedType`](domain::FeedType): The named story lists
/// - [`CommentTree`](domain::CommentTree): Comments under one story
pub mod domain;

/// Feed paging, story batches and comment tree expansion.
pub mod engine;

/// Item sources and concurrent resolution.
///
/// - [`ItemStore`](fetcher::ItemStore): Async trait for item and id-list lookups
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
/// - [`MemoryItemStore`](fetcher::MemoryItemStore): In-process store for tests
/// - [`ParallelFetcher`](fetcher::ParallelFetcher): Concurrent fetching with semaphore
pub mod fetcher;

/// JSON decoding and comment HTML rendering.
pub mod normalizer;

/// Terminal user interface.
///
/// Feed tabs, a stories pane, a comments pane and a status bar, built with
/// ratatui. Keybindings: j/k navigate, h/l switch feed, Enter opens comments,
/// Esc closes them, o opens in browser, R refreshes, q quits.
pub mod tui;
