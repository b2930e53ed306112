//! Resends the most recent digest snapshot through the delivery chain.
//! Useful when every transport failed on the daily run, or after fixing
//! delivery credentials.

use anyhow::{Context, Result};

use ai_news_digest::notify::{DeliveryChain, DigestMessage};
use ai_news_digest::render;
use ai_news_digest::snapshot;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    println!("📧 准备发送日报...");

    let snapshot = snapshot::read_latest_digest()
        .await
        .context("no digest snapshot to resend; run ai-news-digest first")?;
    let digest = &snapshot.digest;

    let message = DigestMessage {
        subject: render::digest_subject(digest.generated_at),
        html_body: render::render_html(digest),
        text_body: render::render_markdown(digest),
        summary: render::render_webhook_summary(digest),
    };

    let chain = DeliveryChain::from_env()?;
    let via = chain.deliver(&message).await?;
    println!("✅ 日报已通过 {via} 发送（{} 篇文章）", digest.total_articles);

    Ok(())
}
