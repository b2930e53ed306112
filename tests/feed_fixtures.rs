// tests/feed_fixtures.rs
use ai_news_digest::config::{Priority, Source};
use ai_news_digest::ingest::rss::parse_channel;
use chrono::{DateTime, TimeZone, Utc};

const JIQIZHIXIN_XML: &str = include_str!("fixtures/jiqizhixin.xml");
const MIESSLER_XML: &str = include_str!("fixtures/miessler.xml");

fn source(name: &str, category: &str) -> Source {
    Source {
        name: name.to_string(),
        url: "https://example.com/rss".to_string(),
        category: category.to_string(),
        priority: Priority::High,
    }
}

#[test]
fn jiqizhixin_fixture_parses_and_cleans() {
    let articles = parse_channel(JIQIZHIXIN_XML, &source("机器之心", "AI资讯")).unwrap();
    assert_eq!(articles.len(), 3);

    let a = &articles[0];
    assert_eq!(a.title, "阿里云发布新一代 PAI 平台，支持 agent 开发");
    assert_eq!(
        a.link.as_deref(),
        Some("https://www.jiqizhixin.com/articles/2025-06-10-3")
    );
    // Entities decoded, tags stripped.
    assert!(a.description.contains("端到端"), "got: {}", a.description);
    assert!(!a.description.contains('<'));
    assert_eq!(
        a.published_at,
        Utc.with_ymd_and_hms(2025, 6, 10, 9, 30, 0).unwrap()
    );
    // content:encoded wins over description for the full body.
    assert!(a.content.contains("数据准备"));
    // No per-item author in this feed; the channel title fills in.
    assert_eq!(a.author, "机器之心");
    assert_eq!(a.id.len(), 12);
    assert!(a.id.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn miessler_fixture_degrades_gracefully() {
    let articles = parse_channel(MIESSLER_XML, &source("Daniel Miessler", "AI基础设施/安全")).unwrap();
    assert_eq!(articles.len(), 2);

    assert_eq!(articles[0].author, "Daniel Miessler");
    assert_eq!(
        articles[0].published_at,
        Utc.with_ymd_and_hms(2025, 6, 10, 11, 15, 0).unwrap()
    );

    // Second item has no pubDate and no link.
    let b = &articles[1];
    assert_eq!(b.published_at, DateTime::UNIX_EPOCH);
    assert!(b.link.is_none());
    assert_eq!(b.author, "Unsupervised Learning");
    assert!(!b.id.is_empty());
    assert_ne!(articles[0].id, b.id);
}
