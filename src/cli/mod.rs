pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::FeedType;

#[derive(Parser)]
#[command(name = "thicket")]
#[command(about = "A terminal reader for Hacker News feeds and threads", long_about = None)]
pub struct Cli {
    /// Number of concurrent item fetches (overrides the config file)
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    /// Base URL of the item API (overrides the config file)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List stories from a feed
    Stories {
        /// Feed to read: top, new, best, ask, show or job
        #[arg(short, long, default_value = "top")]
        feed: FeedType,

        /// Number of batches to load
        #[arg(short, long, default_value_t = 1)]
        pages: usize,
    },
    /// Print a story and its whole comment tree
    Thread {
        /// Item id of the story
        id: i64,
    },
    /// Print items as JSON
    Item {
        /// One or more item ids
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Launch the TUI
    Tui {
        /// Feed to open first
        #[arg(short, long, default_value = "top")]
        feed: FeedType,
    },
}
