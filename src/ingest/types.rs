// src/ingest/types.rs
use chrono::{DateTime, Utc};

use crate::config::Priority;

/// One normalized feed item. Built by the fetcher; the classifier fills
/// `category`, `summary` and `importance` exactly once, nothing mutates an
/// article after that.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Article {
    /// Stable short id derived from the link (or title + timestamp).
    pub id: String,
    pub title: String,
    pub link: Option<String>,
    /// Cleaned plain-text description.
    pub description: String,
    /// Truncated summary, filled by the classifier.
    #[serde(default)]
    pub summary: String,
    /// Unparsable feed dates collapse to the unix epoch, which keeps them
    /// out of every recency window.
    pub published_at: DateTime<Utc>,
    pub author: String,
    /// Name of the configured source this came from.
    pub source_name: String,
    /// Editorial category of the source itself.
    pub source_category: String,
    pub priority: Priority,
    /// Per-article label, filled by the classifier.
    #[serde(default)]
    pub category: String,
    /// Importance score 1..=10, filled by the classifier.
    #[serde(default)]
    pub importance: u8,
    /// Full content when the feed carries `content:encoded`, otherwise the
    /// raw description.
    pub content: String,
}
