//! 认知主权日报: the daily digest entrypoint.
//!
//! Fetches every configured RSS source, classifies and scores the articles,
//! keeps the recency window, renders the digest, snapshots it, then walks the
//! delivery chain.
//!
//! See `README.md` for configuration and scheduling.

use anyhow::Result;
use chrono::{Duration, Utc};

use ai_news_digest::classify::Classifier;
use ai_news_digest::config;
use ai_news_digest::digest::{self, Digest};
use ai_news_digest::ingest::Fetcher;
use ai_news_digest::notify::{DeliveryChain, DigestMessage};
use ai_news_digest::render;
use ai_news_digest::snapshot::{self, DigestSnapshot};

fn print_summary(digest: &Digest, window: Duration) {
    println!();
    println!("{}", "═".repeat(60));
    println!("📊 今日更新摘要（按来源最新时间倒序）");
    println!("{}", "═".repeat(60));

    for group in &digest.groups {
        println!(
            "\n📡 {} ({}篇) - 最新: {}",
            group.source_name,
            group.articles.len(),
            render::format_time_zh(group.latest_at)
        );
        println!("{}", "-".repeat(50));
        for (i, article) in group.articles.iter().enumerate() {
            println!("  {}. {}", i + 1, article.title);
            println!("      📅 {}", render::format_time_zh(article.published_at));
        }
    }

    println!("\n{}", "═".repeat(60));
    println!(
        "近{}小时更新: {} 篇",
        window.num_hours(),
        digest.total_articles
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let now = Utc::now();
    println!("╔══════════════════════════════════════════════════╗");
    println!("║       📰 {} - 自动生成系统             ║", render::DIGEST_TITLE);
    println!("╚══════════════════════════════════════════════════╝\n");
    println!("🕐 运行时间: {}\n", render::format_date_zh(now));

    let sources = config::load_sources_default()?;
    let classifier_cfg = config::load_classifier_default()?;
    let classifier = Classifier::new(&classifier_cfg)?;
    let fetcher = Fetcher::new()?;

    println!("📡 正在抓取RSS源...");
    let mut articles = fetcher.fetch_all(&sources).await;
    let fetched_total = articles.len();
    classifier.process(&mut articles, now);

    let window = digest::window_from_env();
    let recent = digest::window_filter(articles, now, window);
    let digest = Digest::build(recent, now);

    if digest.total_articles > 0 {
        print_summary(&digest, window);
    } else {
        println!("\n📭 今日无更新");
    }

    let message = DigestMessage {
        subject: render::digest_subject(now),
        html_body: render::render_html(&digest),
        text_body: render::render_markdown(&digest),
        summary: render::render_webhook_summary(&digest),
    };

    // Snapshot first; whatever happens to delivery, `send-digest` can resend.
    let snapshot = DigestSnapshot {
        recent_count: digest.total_articles,
        fetched_total,
        digest,
    };
    let path = snapshot::write_digest(&snapshot).await?;
    println!("\n💾 本地备份已保存: {}", path.display());

    println!("\n📧 正在发送日报...");
    let chain = DeliveryChain::from_env()?;
    match chain.deliver(&message).await {
        Ok(via) => println!("✅ 日报已通过 {via} 发送"),
        Err(e) => {
            eprintln!("⚠️ 所有渠道发送失败，快照已保存，可运行 send-digest 重发");
            return Err(e);
        }
    }

    println!("\n✨ 日报任务完成！");
    Ok(())
}
