use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The upstream's named story lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedType {
    Top,
    New,
    Best,
    Ask,
    Show,
    Job,
}

impl FeedType {
    pub const ALL: [FeedType; 6] = [
        FeedType::Top,
        FeedType::New,
        FeedType::Best,
        FeedType::Ask,
        FeedType::Show,
        FeedType::Job,
    ];

    /// Path segment of the ID-list endpoint, without the `.json` suffix.
    pub fn endpoint(self) -> &'static str {
        match self {
            FeedType::Top => "topstories",
            FeedType::New => "newstories",
            FeedType::Best => "beststories",
            FeedType::Ask => "askstories",
            FeedType::Show => "showstories",
            FeedType::Job => "jobstories",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FeedType::Top => "Top",
            FeedType::New => "New",
            FeedType::Best => "Best",
            FeedType::Ask => "Ask",
            FeedType::Show => "Show",
            FeedType::Job => "Jobs",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for FeedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

impl FromStr for FeedType {
    type Err = String;

    /// Accepts both the short name (`top`) and the endpoint name (`topstories`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let short = s.strip_suffix("stories").unwrap_or(&s);
        match short {
            "top" => Ok(FeedType::Top),
            "new" => Ok(FeedType::New),
            "best" => Ok(FeedType::Best),
            "ask" => Ok(FeedType::Ask),
            "show" => Ok(FeedType::Show),
            "job" | "jobs" => Ok(FeedType::Job),
            _ => Err(format!(
                "Unknown feed type: {}. Expected one of top, new, best, ask, show, job",
                s
            )),
        }
    }
}

/// Epoch token attached to a unit of work so results that arrive after a
/// context switch can be recognised as stale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
