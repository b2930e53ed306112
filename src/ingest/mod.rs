// src/ingest/mod.rs
pub mod rss;
pub mod types;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use std::time::Duration;

use crate::config::Source;
use crate::ingest::types::Article;

const USER_AGENT: &str = concat!("ai-news-digest/", env!("CARGO_PKG_VERSION"));
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Clean feed text: drop CDATA markers, decode HTML entities, strip markup
/// (each tag becomes one space), collapse whitespace, trim.
///
/// Entities are decoded before tags are stripped so entity-encoded markup
/// goes away too.
pub fn clean_text(s: &str) -> String {
    // 1) CDATA markers that leak through feeds as literal text
    static RE_CDATA: OnceCell<regex::Regex> = OnceCell::new();
    let re_cdata = RE_CDATA.get_or_init(|| regex::Regex::new(r"<!\[CDATA\[|\]\]>").unwrap());
    let mut out = re_cdata.replace_all(s, "").to_string();

    // 2) HTML entity decode
    out = html_escape::decode_html_entities(&out).to_string();

    // 3) Strip tags, each one separates words
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Fetches configured feeds over HTTP. One shared client with a bounded
/// timeout so a stuck source cannot hang the run.
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        let timeout = std::env::var("DIGEST_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout))
            .build()
            .context("building http client")?;
        Ok(Self { client })
    }

    /// Fetch and parse one source. Non-success status, network error and
    /// parse failure are all errors here; the caller decides isolation.
    pub async fn fetch_source(&self, source: &Source) -> Result<Vec<Article>> {
        let body = self
            .client
            .get(&source.url)
            .send()
            .await
            .with_context(|| format!("fetching {}", source.name))?
            .error_for_status()
            .with_context(|| format!("{} returned error status", source.name))?
            .text()
            .await
            .with_context(|| format!("reading body from {}", source.name))?;
        rss::parse_channel(&body, source)
    }

    /// Fetch every source in configuration order. A failing source is logged
    /// and contributes zero articles; it never aborts the run. The combined
    /// list comes back sorted newest first (stable, so fetch order cannot
    /// leak into equal timestamps).
    pub async fn fetch_all(&self, sources: &[Source]) -> Vec<Article> {
        let mut all = Vec::new();
        for source in sources {
            match self.fetch_source(source).await {
                Ok(mut articles) => {
                    tracing::info!(source = %source.name, count = articles.len(), "fetched source");
                    all.append(&mut articles);
                }
                Err(e) => {
                    tracing::warn!(source = %source.name, error = ?e, "source failed, skipping");
                }
            }
        }
        sort_newest_first(&mut all);
        all
    }
}

fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}
