//! One-shot collector: fetch everything, classify, bucket by category, and
//! snapshot the result. No recency window and no delivery; this is the
//! archive/inspection pass.

use anyhow::Result;
use chrono::Utc;

use ai_news_digest::classify::Classifier;
use ai_news_digest::config;
use ai_news_digest::digest::{group_by_category, CategoryGroup};
use ai_news_digest::ingest::Fetcher;
use ai_news_digest::snapshot::{self, CollectSnapshot};

fn print_summary(groups: &[CategoryGroup]) {
    println!("\n{}", "═".repeat(50));
    println!("📰 今日AI资讯摘要");
    println!("{}", "═".repeat(50));

    for group in groups {
        println!("\n【{}】{}篇", group.category, group.articles.len());
        println!("{}", "-".repeat(40));

        for (i, article) in group.articles.iter().take(3).enumerate() {
            let stars = "⭐".repeat((article.importance / 2) as usize);
            println!("{}. {}", i + 1, article.title);
            if let Some(link) = &article.link {
                println!("   📎 {link}");
            }
            println!("   📅 {} {}", article.published_at.format("%Y-%m-%d"), stars);
            println!();
        }

        if group.articles.len() > 3 {
            println!("   ... 还有 {} 篇", group.articles.len() - 3);
        }
    }

    println!("{}", "═".repeat(50));
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    println!("╔══════════════════════════════════════╗");
    println!("║     AI信息搜集系统 v{}          ║", env!("CARGO_PKG_VERSION"));
    println!("╚══════════════════════════════════════╝\n");

    let sources = config::load_sources_default()?;
    let classifier_cfg = config::load_classifier_default()?;
    let classifier = Classifier::new(&classifier_cfg)?;
    let fetcher = Fetcher::new()?;

    let mut articles = fetcher.fetch_all(&sources).await;
    if articles.is_empty() {
        println!("⚠️ 没有获取到任何文章");
        return Ok(());
    }

    println!("\n🤖 正在分析文章内容...");
    let now = Utc::now();
    classifier.process(&mut articles, now);
    let groups = group_by_category(&articles, &classifier_cfg);

    let snapshot = CollectSnapshot {
        generated_at: now,
        total_articles: articles.len(),
        categories: groups.iter().map(|g| g.category.clone()).collect(),
        groups,
    };
    let path = snapshot::write_collect(&snapshot).await?;
    println!("\n💾 结果已保存: {}", path.display());

    print_summary(&snapshot.groups);

    Ok(())
}
