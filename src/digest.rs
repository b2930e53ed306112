// src/digest.rs
//! Recency window, grouping and ordering.
//!
//! Pure transforms over `Vec<Article>`; nothing here does I/O. Ordering is
//! explicit everywhere: groups are `Vec`s sorted with stable sorts, so equal
//! timestamps keep input order and map iteration order is never relied on.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ClassifierConfig;
use crate::ingest::types::Article;

/// Articles older than this many hours stay out of the daily digest.
pub const DEFAULT_WINDOW_HOURS: i64 = 24;

/// One source's articles, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceGroup {
    pub source_name: String,
    /// `published_at` of the newest article in the group.
    pub latest_at: DateTime<Utc>,
    pub articles: Vec<Article>,
}

/// The terminal artifact of a run: ordered groups plus counts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Digest {
    pub generated_at: DateTime<Utc>,
    pub total_articles: usize,
    pub groups: Vec<SourceGroup>,
}

/// Category bucket for the collect run, in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryGroup {
    pub category: String,
    pub articles: Vec<Article>,
}

/// Keep articles published inside the window ending at `now`. The boundary
/// is inclusive: exactly `now - window` stays in.
pub fn window_filter(articles: Vec<Article>, now: DateTime<Utc>, window: Duration) -> Vec<Article> {
    let cutoff = now - window;
    articles
        .into_iter()
        .filter(|a| a.published_at >= cutoff)
        .collect()
}

/// Window override from `DIGEST_WINDOW_HOURS`, default 24.
pub fn window_from_env() -> Duration {
    let hours = std::env::var("DIGEST_WINDOW_HOURS")
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|h| *h > 0)
        .unwrap_or(DEFAULT_WINDOW_HOURS);
    Duration::hours(hours)
}

/// Partition articles by source and order everything deterministically:
///
/// 1. buckets form in the order each source first occurs in the input;
/// 2. inside a bucket articles sort newest first (stable, so equal
///    timestamps keep input order);
/// 3. buckets sort by their newest article, newest first (stable, so ties
///    keep first-occurrence order).
///
/// Sources with zero articles simply never form a group.
pub fn group_by_source(articles: Vec<Article>) -> Vec<SourceGroup> {
    let mut buckets: Vec<(String, Vec<Article>)> = Vec::new();
    for article in articles {
        match buckets.iter_mut().find(|(name, _)| *name == article.source_name) {
            Some((_, v)) => v.push(article),
            None => buckets.push((article.source_name.clone(), vec![article])),
        }
    }

    let mut groups: Vec<SourceGroup> = buckets
        .into_iter()
        .map(|(source_name, mut articles)| {
            articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
            let latest_at = articles[0].published_at;
            SourceGroup {
                source_name,
                latest_at,
                articles,
            }
        })
        .collect();

    groups.sort_by(|a, b| b.latest_at.cmp(&a.latest_at));
    groups
}

impl Digest {
    /// Assemble a digest from already window-filtered articles. An empty
    /// input yields a zero-group digest, never an empty group.
    pub fn build(articles: Vec<Article>, generated_at: DateTime<Utc>) -> Self {
        let total_articles = articles.len();
        let groups = group_by_source(articles);
        Self {
            generated_at,
            total_articles,
            groups,
        }
    }
}

/// Bucket processed articles by their classifier label, in category
/// declaration order with the default label last; labels outside the
/// declared set (stale snapshots) keep first-occurrence order in between.
/// Articles keep input order inside each bucket.
pub fn group_by_category(articles: &[Article], config: &ClassifierConfig) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();

    let mut push_label = |label: &str| {
        if groups.iter().any(|g| g.category == label) {
            return;
        }
        let matched: Vec<Article> = articles
            .iter()
            .filter(|a| a.category == label)
            .cloned()
            .collect();
        if !matched.is_empty() {
            groups.push(CategoryGroup {
                category: label.to_string(),
                articles: matched,
            });
        }
    };

    for rule in &config.categories {
        push_label(&rule.name);
    }
    for article in articles {
        if article.category != config.default_category {
            push_label(&article.category);
        }
    }
    push_label(&config.default_category);

    groups
}
