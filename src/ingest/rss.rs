// src/ingest/rss.rs
//
// RSS 2.0 wire format and the item -> Article extraction. Parsing is a pure
// function over the XML string so tests can feed fixtures without HTTP.
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::{OffsetDateTime, UtcOffset};

use crate::config::Source;
use crate::ingest::clean_text;
use crate::ingest::types::Article;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    title: Option<String>,
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    author: Option<String>,
    // quick-xml exposes <content:encoded> by its local name.
    #[serde(rename = "encoded")]
    content_encoded: Option<String>,
}

/// Feed dates come in RFC 2822 (`Tue, 10 Jun 2025 09:30:00 +0000`) with the
/// occasional RFC 3339 feed. The obsolete `GMT`/`UT` zone names some feeds
/// still emit are normalized to a numeric offset first. Anything else is
/// unparsable.
fn parse_feed_date(ts: &str) -> Option<DateTime<Utc>> {
    let ts = ts.trim();
    let normalized = ts
        .strip_suffix(" GMT")
        .or_else(|| ts.strip_suffix(" UT"))
        .map(|base| format!("{base} +0000"));
    let rfc2822 = normalized.as_deref().unwrap_or(ts);
    let unix = OffsetDateTime::parse(rfc2822, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(ts, &Rfc3339))
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())?;
    DateTime::from_timestamp(unix, 0)
}

/// Short stable id for an article: first 6 bytes of the SHA-256 of the link
/// (or title + timestamp when the feed omits the link), hex-encoded.
fn article_id(link: Option<&str>, title: &str, published_at: DateTime<Utc>) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    match link {
        Some(l) if !l.is_empty() => hasher.update(l.as_bytes()),
        _ => {
            hasher.update(title.as_bytes());
            hasher.update(published_at.timestamp().to_string().as_bytes());
        }
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Feeds leak HTML-only entities (`&nbsp;`, smart quotes) outside CDATA, and
/// XML names none of them. Swap them for plain text before parsing.
fn scrub_html_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}

/// Parse one RSS document and extract articles for `source`.
///
/// Field handling per item:
/// - `title`/`description` are cleaned (CDATA, entities, tags, whitespace);
///   missing values degrade to empty strings.
/// - `link` stays optional.
/// - `author` falls back to the channel title when the item has none.
/// - `content` prefers `content:encoded` over the raw description.
/// - an unparsable or missing `pubDate` collapses to the unix epoch (logged),
///   which keeps the article out of every recency window.
pub fn parse_channel(xml: &str, source: &Source) -> Result<Vec<Article>> {
    let xml = scrub_html_entities(xml);
    let rss: Rss =
        from_str(&xml).with_context(|| format!("parsing rss xml for {}", source.name))?;

    let channel_title = rss.channel.title.map(|t| clean_text(&t)).unwrap_or_default();

    let mut out = Vec::with_capacity(rss.channel.items.len());
    for it in rss.channel.items {
        let title = clean_text(it.title.as_deref().unwrap_or_default());
        let description = clean_text(it.description.as_deref().unwrap_or_default());
        let link = it.link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty());

        let published_at = match it.pub_date.as_deref() {
            Some(ts) => parse_feed_date(ts).unwrap_or_else(|| {
                tracing::warn!(source = %source.name, pub_date = ts, "unparsable pubDate, using epoch");
                DateTime::UNIX_EPOCH
            }),
            None => {
                tracing::warn!(source = %source.name, title = %title, "item without pubDate, using epoch");
                DateTime::UNIX_EPOCH
            }
        };

        let author = match it.author.map(|a| clean_text(&a)) {
            Some(a) if !a.is_empty() => a,
            _ => channel_title.clone(),
        };
        let content = it
            .content_encoded
            .or(it.description)
            .unwrap_or_default();

        out.push(Article {
            id: article_id(link.as_deref(), &title, published_at),
            title,
            link,
            description,
            summary: String::new(),
            published_at,
            author,
            source_name: source.name.clone(),
            source_category: source.category.clone(),
            priority: source.priority,
            category: String::new(),
            importance: 0,
            content,
        });
    }
    Ok(out)
}
