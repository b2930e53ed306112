// src/snapshot.rs
//! JSON snapshots under `output/` (override with `DIGEST_OUTPUT_DIR`).
//!
//! Every run writes a dated file plus a `latest*.json` copy so the resend
//! binary and downstream tooling always have a stable path to read. Group
//! order is carried by `Vec`s, so a snapshot round-trips with identical
//! ordering and counts.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

use crate::digest::{CategoryGroup, Digest};

const LATEST_DIGEST: &str = "latest.json";
const LATEST_COLLECT: &str = "latest-collect.json";

/// Persisted result of a daily digest run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DigestSnapshot {
    pub digest: Digest,
    /// Articles inside the recency window (equals `digest.total_articles`).
    pub recent_count: usize,
    /// Everything the fetch produced, window survivors or not.
    pub fetched_total: usize,
}

/// Persisted result of a collect run, bucketed by category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectSnapshot {
    pub generated_at: DateTime<Utc>,
    pub total_articles: usize,
    /// Labels actually present, in group order.
    pub categories: Vec<String>,
    pub groups: Vec<CategoryGroup>,
}

pub fn output_dir() -> PathBuf {
    std::env::var("DIGEST_OUTPUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("output"))
}

async fn write_json<T: Serialize>(value: &T, dated_name: &str, latest_name: &str) -> Result<PathBuf> {
    let dir = output_dir();
    fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("creating {}", dir.display()))?;

    let bytes = serde_json::to_vec_pretty(value).context("serializing snapshot")?;
    let dated = dir.join(dated_name);
    fs::write(&dated, &bytes)
        .await
        .with_context(|| format!("writing {}", dated.display()))?;

    // Full copy, not a symlink, so any filesystem can read it.
    let latest = dir.join(latest_name);
    fs::write(&latest, &bytes)
        .await
        .with_context(|| format!("writing {}", latest.display()))?;

    Ok(dated)
}

/// Write `digest-YYYY-MM-DD.json` and the `latest.json` copy. Returns the
/// dated path.
pub async fn write_digest(snapshot: &DigestSnapshot) -> Result<PathBuf> {
    let dated_name = format!(
        "digest-{}.json",
        snapshot.digest.generated_at.format("%Y-%m-%d")
    );
    write_json(snapshot, &dated_name, LATEST_DIGEST).await
}

/// Write `collect-YYYY-MM-DD.json` and the `latest-collect.json` copy.
pub async fn write_collect(snapshot: &CollectSnapshot) -> Result<PathBuf> {
    let dated_name = format!(
        "collect-{}.json",
        snapshot.generated_at.format("%Y-%m-%d")
    );
    write_json(snapshot, &dated_name, LATEST_COLLECT).await
}

/// Read back the most recent digest snapshot. A missing or unreadable file
/// is an error; the resend binary treats it as fatal.
pub async fn read_latest_digest() -> Result<DigestSnapshot> {
    let path = output_dir().join(LATEST_DIGEST);
    let s = fs::read_to_string(&path)
        .await
        .with_context(|| format!("reading digest snapshot {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing digest snapshot {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Priority;
    use crate::ingest::types::Article;
    use chrono::TimeZone;

    fn art(source: &str, title: &str, ts: DateTime<Utc>) -> Article {
        Article {
            id: title.to_string(),
            title: title.to_string(),
            link: Some(format!("https://example.com/{title}")),
            description: "描述".to_string(),
            summary: "描述".to_string(),
            published_at: ts,
            author: "作者".to_string(),
            source_name: source.to_string(),
            source_category: "AI资讯".to_string(),
            priority: Priority::High,
            category: "开发工具".to_string(),
            importance: 7,
            content: String::new(),
        }
    }

    #[serial_test::serial]
    #[tokio::test]
    async fn digest_snapshot_round_trips_order_and_counts() {
        let tmp = tempfile::tempdir().unwrap();
        std::env::set_var("DIGEST_OUTPUT_DIR", tmp.path());

        let now = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        let articles = vec![
            art("机器之心", "a", Utc.with_ymd_and_hms(2025, 6, 10, 11, 0, 0).unwrap()),
            art("量子位", "b", Utc.with_ymd_and_hms(2025, 6, 10, 10, 0, 0).unwrap()),
            art("机器之心", "c", Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0).unwrap()),
        ];
        let snapshot = DigestSnapshot {
            digest: Digest::build(articles, now),
            recent_count: 3,
            fetched_total: 10,
        };

        let dated = write_digest(&snapshot).await.unwrap();
        assert!(dated.ends_with("digest-2025-06-10.json"));

        let back = read_latest_digest().await.unwrap();
        assert_eq!(back, snapshot);
        // Group order survived: 机器之心 (latest 11:00) before 量子位 (10:00).
        assert_eq!(back.digest.groups[0].source_name, "机器之心");
        assert_eq!(back.digest.groups[0].articles[0].title, "a");
        assert_eq!(back.digest.groups[0].articles[1].title, "c");

        std::env::remove_var("DIGEST_OUTPUT_DIR");
    }

    #[serial_test::serial]
    #[tokio::test]
    async fn missing_snapshot_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::env::set_var("DIGEST_OUTPUT_DIR", tmp.path());

        let err = read_latest_digest().await.unwrap_err().to_string();
        assert!(err.contains("latest.json"), "unexpected error: {err}");

        std::env::remove_var("DIGEST_OUTPUT_DIR");
    }

    #[serial_test::serial]
    #[tokio::test]
    async fn collect_snapshot_writes_dated_and_latest() {
        let tmp = tempfile::tempdir().unwrap();
        std::env::set_var("DIGEST_OUTPUT_DIR", tmp.path());

        let now = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        let snapshot = CollectSnapshot {
            generated_at: now,
            total_articles: 1,
            categories: vec!["开发工具".to_string()],
            groups: vec![CategoryGroup {
                category: "开发工具".to_string(),
                articles: vec![art("机器之心", "x", now)],
            }],
        };

        let dated = write_collect(&snapshot).await.unwrap();
        assert!(dated.ends_with("collect-2025-06-10.json"));
        assert!(tmp.path().join("latest-collect.json").exists());

        std::env::remove_var("DIGEST_OUTPUT_DIR");
    }
}
