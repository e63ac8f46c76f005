use ratatui::widgets::ListState;

use crate::domain::{FeedType, Item};
use crate::engine::{FeedController, FeedEvent, FeedState, TreeExpander};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Stories,
    Comments,
}

impl ActivePane {
    pub fn next(self) -> Self {
        match self {
            ActivePane::Stories => ActivePane::Comments,
            ActivePane::Comments => ActivePane::Stories,
        }
    }

    pub fn prev(self) -> Self {
        // Only two panes, so both directions land on the other one.
        self.next()
    }
}

pub const PAGE_SIZE: usize = 10;

/// The story whose comments are on screen.
#[derive(Debug, Clone)]
pub struct OpenThread {
    pub story_id: i64,
    pub title: String,
    pub url: Option<String>,
}

pub struct TuiApp {
    pub controller: FeedController,
    pub expander: TreeExpander,
    pub feed: FeedType,
    pub active_pane: ActivePane,
    pub story_index: usize,
    pub story_list_state: ListState,
    pub thread: Option<OpenThread>,
    pub comment_scroll: u16,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub maximized: bool,
}

impl TuiApp {
    pub fn new(controller: FeedController, expander: TreeExpander, feed: FeedType) -> Self {
        Self {
            controller,
            expander,
            feed,
            active_pane: ActivePane::Stories,
            story_index: 0,
            story_list_state: ListState::default(),
            thread: None,
            comment_scroll: 0,
            should_quit: false,
            status_message: None,
            maximized: false,
        }
    }

    pub fn stories(&self) -> &[Item] {
        self.controller.stories()
    }

    pub fn selected_story(&self) -> Option<&Item> {
        self.stories().get(self.story_index)
    }

    /// Switch to `feed`, dropping the story list and any open thread.
    pub async fn switch_feed(&mut self, feed: FeedType) {
        self.feed = feed;
        self.story_index = 0;
        self.story_list_state.select(None);
        self.close_thread();
        self.clear_status();
        if let Err(e) = self.controller.load_feed(feed).await {
            self.set_status(format!("Failed to load {}: {}", feed.label(), e));
        }
    }

    pub async fn next_feed(&mut self) {
        self.switch_feed(self.feed.next()).await;
    }

    pub async fn prev_feed(&mut self) {
        self.switch_feed(self.feed.prev()).await;
    }

    pub async fn refresh(&mut self) {
        self.switch_feed(self.feed).await;
    }

    /// Drain finished fetches from both drivers. A finished batch that still
    /// leaves the cursor near the end pulls the next one without a keypress.
    pub fn tick(&mut self) {
        let mut batch_finished = false;
        for event in self.controller.poll() {
            if let FeedEvent::BatchFinished {
                dropped, exhausted, ..
            } = event
            {
                let mut message = format!("{} stories", self.stories().len());
                if dropped > 0 {
                    message.push_str(&format!(", {} unavailable", dropped));
                }
                if exhausted {
                    message.push_str(", end of feed");
                }
                self.set_status(message);
                batch_finished = true;
            }
        }
        if batch_finished {
            self.controller.on_near_end(self.story_index);
        }
        if !self.stories().is_empty() && self.story_list_state.selected().is_none() {
            self.story_list_state.select(Some(self.story_index));
        }
        self.expander.poll();
    }

    /// Open the comments of the selected story.
    pub fn select(&mut self) {
        let Some(story) = self.selected_story() else {
            return;
        };
        let thread = OpenThread {
            story_id: story.id,
            title: story.display_title().to_string(),
            url: story.url.clone(),
        };
        let child_ids = story.child_ids.clone();

        self.expander.expand(thread.story_id, &child_ids);
        self.thread = Some(thread);
        self.comment_scroll = 0;
        self.active_pane = ActivePane::Comments;
    }

    pub fn back(&mut self) {
        self.close_thread();
        self.active_pane = ActivePane::Stories;
        self.maximized = false;
    }

    fn close_thread(&mut self) {
        self.expander.clear();
        self.thread = None;
        self.comment_scroll = 0;
    }

    /// URL to open in the browser: the open thread's story when the comments
    /// pane is focused, otherwise the selected story. Text posts fall back to
    /// their discussion page.
    pub fn target_url(&self) -> Option<String> {
        let (id, url) = match (self.active_pane, &self.thread) {
            (ActivePane::Comments, Some(thread)) => (thread.story_id, thread.url.clone()),
            _ => {
                let story = self.selected_story()?;
                (story.id, story.url.clone())
            }
        };
        Some(url.unwrap_or_else(|| format!("https://news.ycombinator.com/item?id={}", id)))
    }

    fn select_story(&mut self, index: usize) {
        self.story_index = index;
        self.story_list_state.select(Some(index));
        self.controller.on_near_end(index);
    }

    pub fn move_up(&mut self) {
        match self.active_pane {
            ActivePane::Stories => {
                if self.story_index > 0 {
                    self.select_story(self.story_index - 1);
                }
            }
            ActivePane::Comments => {
                self.comment_scroll = self.comment_scroll.saturating_sub(1);
            }
        }
    }

    pub fn move_down(&mut self) {
        match self.active_pane {
            ActivePane::Stories => {
                let last = self.stories().len().saturating_sub(1);
                self.select_story((self.story_index + 1).min(last));
            }
            ActivePane::Comments => {
                self.comment_scroll = self.comment_scroll.saturating_add(1);
            }
        }
    }

    pub fn next_page(&mut self) {
        match self.active_pane {
            ActivePane::Stories => {
                let last = self.stories().len().saturating_sub(1);
                self.select_story((self.story_index + PAGE_SIZE).min(last));
            }
            ActivePane::Comments => {
                self.comment_scroll = self.comment_scroll.saturating_add(PAGE_SIZE as u16);
            }
        }
    }

    pub fn prev_page(&mut self) {
        match self.active_pane {
            ActivePane::Stories => {
                self.select_story(self.story_index.saturating_sub(PAGE_SIZE));
            }
            ActivePane::Comments => {
                self.comment_scroll = self.comment_scroll.saturating_sub(PAGE_SIZE as u16);
            }
        }
    }

    pub fn toggle_maximize(&mut self) {
        self.maximized = !self.maximized;
        if self.maximized {
            self.active_pane = ActivePane::Comments;
        }
    }

    /// One-line summary of what the engine is doing, for the status bar.
    pub fn activity(&self) -> Option<String> {
        match self.controller.state() {
            FeedState::Loading(feed) => return Some(format!("Loading {}...", feed.label())),
            FeedState::Failed { feed, message } => {
                return Some(format!("{} unavailable: {}", feed.label(), message))
            }
            FeedState::Idle | FeedState::Ready(_) => {}
        }
        if self.controller.is_loading() {
            return Some("Fetching stories...".to_string());
        }
        if self.thread.is_some() && !self.expander.is_complete() {
            return Some(format!(
                "Loading comments ({} pending)...",
                self.expander.outstanding()
            ));
        }
        None
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}
