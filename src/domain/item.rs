use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// A single upstream entry: story, comment, job or poll.
///
/// The upstream API has no reliable story/comment discriminator, so the
/// same type is used for both and the caller tags it with an [`ItemRole`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "by")]
    pub author: Option<String>,
    /// Unix seconds.
    #[serde(default, rename = "time")]
    pub created_at: i64,
    #[serde(default)]
    pub score: i32,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Replies in canonical display order.
    #[serde(default, rename = "kids")]
    pub child_ids: Vec<i64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dead: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descendants: Option<i64>,
}

/// How an item was reached: from a feed list or from another item's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRole {
    Story,
    Comment,
}

impl Item {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            kind: None,
            title: None,
            author: None,
            created_at: 0,
            score: 0,
            url: None,
            text: None,
            child_ids: Vec::new(),
            deleted: false,
            dead: false,
            parent: None,
            descendants: None,
        }
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(Untitled)")
    }

    pub fn display_author(&self) -> &str {
        self.author.as_deref().unwrap_or("[unknown]")
    }

    /// Deleted and dead items are never shown.
    pub fn is_removed(&self) -> bool {
        self.deleted || self.dead
    }

    pub fn child_count(&self) -> usize {
        self.child_ids.len()
    }

    /// Total comments under a story when the upstream reports it, direct
    /// replies otherwise.
    pub fn comment_count(&self) -> usize {
        self.descendants
            .and_then(|d| usize::try_from(d).ok())
            .unwrap_or_else(|| self.child_count())
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_at, 0)
    }

    /// Host part of the story URL, without a leading `www.`.
    pub fn host(&self) -> Option<String> {
        let url = Url::parse(self.url.as_deref()?).ok()?;
        let host = url.host_str()?;
        Some(host.strip_prefix("www.").unwrap_or(host).to_string())
    }

    /// Short relative age such as `5m`, `3h` or `2d`.
    pub fn age(&self, now: DateTime<Utc>) -> String {
        let Some(published) = self.published_at() else {
            return "?".to_string();
        };
        let secs = now.signed_duration_since(published).num_seconds().max(0);
        match secs {
            0..=59 => format!("{}s", secs),
            60..=3599 => format!("{}m", secs / 60),
            3600..=86399 => format!("{}h", secs / 3600),
            _ => format!("{}d", secs / 86400),
        }
    }
}
