// src/render.rs
//! Pure renderers for the digest: the HTML email, the Markdown fallback and
//! the compact chat summary. No I/O here; everything formats an in-memory
//! [`Digest`] and escapes whatever came from the feeds.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

use crate::digest::Digest;
use crate::ingest::types::Article;

pub const DIGEST_TITLE: &str = "认知主权日报";

const CSS: &str = r#"
    body {
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
      line-height: 1.6;
      color: #333;
      max-width: 800px;
      margin: 0 auto;
      padding: 20px;
      background: #f5f5f5;
    }
    .header {
      background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
      color: white;
      padding: 30px;
      border-radius: 12px;
      margin-bottom: 30px;
      text-align: center;
    }
    .header h1 { margin: 0 0 10px 0; font-size: 28px; }
    .header .date { opacity: 0.9; font-size: 14px; }
    .content {
      background: white;
      border-radius: 12px;
      padding: 20px;
      box-shadow: 0 2px 8px rgba(0,0,0,0.1);
    }
    .source-section {
      margin-bottom: 25px;
      padding-bottom: 20px;
      border-bottom: 1px solid #eee;
    }
    .source-section:last-child { border-bottom: none; margin-bottom: 0; padding-bottom: 0; }
    .source-header {
      background: #f8f9fa;
      padding: 12px 15px;
      border-radius: 8px;
      margin-bottom: 15px;
      display: flex;
      justify-content: space-between;
      align-items: center;
    }
    .source-name { font-size: 16px; font-weight: bold; color: #667eea; }
    .source-count {
      background: #667eea;
      color: white;
      padding: 2px 10px;
      border-radius: 12px;
      font-size: 12px;
    }
    .article { padding: 14px 0; border-bottom: 1px solid #f0f0f0; }
    .article:last-child { border-bottom: none; }
    .article-title { font-size: 15px; font-weight: 500; margin-bottom: 6px; line-height: 1.5; }
    .article-title a { color: #333; text-decoration: none; }
    .article-title a:hover { color: #667eea; }
    .article-meta { font-size: 12px; color: #888; }
    .no-update { text-align: center; padding: 60px 20px; color: #999; }
    .no-update-icon { font-size: 48px; margin-bottom: 15px; }
    .footer { text-align: center; color: #999; font-size: 12px; margin-top: 30px; padding: 20px; }
    .total-count {
      background: #667eea;
      color: white;
      padding: 4px 12px;
      border-radius: 15px;
      font-size: 13px;
      font-weight: 500;
    }
"#;

fn weekday_zh(w: Weekday) -> &'static str {
    match w {
        Weekday::Mon => "一",
        Weekday::Tue => "二",
        Weekday::Wed => "三",
        Weekday::Thu => "四",
        Weekday::Fri => "五",
        Weekday::Sat => "六",
        Weekday::Sun => "日",
    }
}

/// `2025年6月10日 星期二`
pub fn format_date_zh(dt: DateTime<Utc>) -> String {
    format!(
        "{}年{}月{}日 星期{}",
        dt.year(),
        dt.month(),
        dt.day(),
        weekday_zh(dt.weekday())
    )
}

/// `6月10日 09:30`
pub fn format_time_zh(dt: DateTime<Utc>) -> String {
    format!(
        "{}月{}日 {:02}:{:02}",
        dt.month(),
        dt.day(),
        dt.hour(),
        dt.minute()
    )
}

/// Mail subject line, `认知主权日报-YYYY-MM-DD`.
pub fn digest_subject(dt: DateTime<Utc>) -> String {
    format!("{}-{}", DIGEST_TITLE, dt.format("%Y-%m-%d"))
}

/// Full HTML email document. Titles and URLs are escaped; an article without
/// a link renders as plain text. Zero groups render the dedicated
/// "no updates" block instead of an empty list.
pub fn render_html(digest: &Digest) -> String {
    let date_str = format_date_zh(digest.generated_at);
    let mut html = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"UTF-8\">\n  \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n  \
         <title>{title} - {date}</title>\n  <style>{css}</style>\n</head>\n<body>\n  \
         <div class=\"header\">\n    <h1>📰 {title}</h1>\n    <div class=\"date\">{date}</div>\n  </div>\n\n  \
         <div class=\"content\">",
        title = DIGEST_TITLE,
        date = date_str,
        css = CSS,
    );

    if digest.total_articles == 0 {
        html.push_str(
            "\n    <div class=\"no-update\">\n      <div class=\"no-update-icon\">📭</div>\n      \
             <div style=\"font-size: 18px; font-weight: 500; margin-bottom: 8px;\">今日无更新</div>\n      \
             <div>近24小时内暂无新内容</div>\n    </div>",
        );
    } else {
        html.push_str(&format!(
            "\n    <div style=\"padding: 10px 0 20px 0; border-bottom: 1px solid #eee; margin-bottom: 15px;\">\n      \
             <span class=\"total-count\">今日共 {} 篇更新</span>\n    </div>",
            digest.total_articles
        ));

        for group in &digest.groups {
            html.push_str(&format!(
                "\n    <div class=\"source-section\">\n      <div class=\"source-header\">\n        \
                 <span class=\"source-name\">📡 {name}</span>\n        <div>\n          \
                 <span style=\"color: #888; font-size: 12px; margin-right: 10px;\">最新: {latest}</span>\n          \
                 <span class=\"source-count\">{count} 篇</span>\n        </div>\n      </div>",
                name = html_escape::encode_text(&group.source_name),
                latest = format_time_zh(group.latest_at),
                count = group.articles.len(),
            ));

            for article in &group.articles {
                let title_html = match &article.link {
                    Some(link) => format!(
                        "<a href=\"{}\" target=\"_blank\">{}</a>",
                        html_escape::encode_double_quoted_attribute(link),
                        html_escape::encode_text(&article.title),
                    ),
                    None => html_escape::encode_text(&article.title).to_string(),
                };
                html.push_str(&format!(
                    "\n      <div class=\"article\">\n        <div class=\"article-title\">{}</div>\n        \
                     <div class=\"article-meta\">📅 {}</div>\n      </div>",
                    title_html,
                    format_time_zh(article.published_at),
                ));
            }

            html.push_str("\n    </div>");
        }
    }

    html.push_str(&format!(
        "\n  </div>\n\n  <div class=\"footer\">\n    <p>{} - 自动 RSS 聚合</p>\n    \
         <p>生成时间: {}</p>\n  </div>\n</body>\n</html>",
        DIGEST_TITLE,
        format_time_zh(digest.generated_at),
    ));

    html
}

/// The digest as Markdown, used as the plain-text email alternative.
pub fn render_markdown(digest: &Digest) -> String {
    let mut md = format!(
        "# 📰 {} - {}\n",
        DIGEST_TITLE,
        format_date_zh(digest.generated_at)
    );

    if digest.total_articles == 0 {
        md.push_str("\n📭 今日无更新\n\n近24小时内暂无新内容\n");
        return md;
    }

    md.push_str(&format!("\n今日共 {} 篇更新\n", digest.total_articles));
    for group in &digest.groups {
        md.push_str(&format!(
            "\n## 📡 {}（{} 篇）· 最新: {}\n\n",
            group.source_name,
            group.articles.len(),
            format_time_zh(group.latest_at),
        ));
        for article in &group.articles {
            match &article.link {
                Some(link) => md.push_str(&format!(
                    "- [{}]({}) · 📅 {}\n",
                    article.title,
                    link,
                    format_time_zh(article.published_at),
                )),
                None => md.push_str(&format!(
                    "- {} · 📅 {}\n",
                    article.title,
                    format_time_zh(article.published_at),
                )),
            }
        }
    }
    md
}

/// The five most important articles, importance first, then recency; stable
/// so remaining ties keep digest order.
fn top_articles(digest: &Digest, n: usize) -> Vec<&Article> {
    let mut all: Vec<&Article> = digest
        .groups
        .iter()
        .flat_map(|g| g.articles.iter())
        .collect();
    all.sort_by(|a, b| {
        b.importance
            .cmp(&a.importance)
            .then(b.published_at.cmp(&a.published_at))
    });
    all.truncate(n);
    all
}

/// Distinct classifier labels in the order they first appear in the digest.
fn category_overview(digest: &Digest) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for group in &digest.groups {
        for article in &group.articles {
            if !article.category.is_empty() && !seen.contains(&article.category.as_str()) {
                seen.push(article.category.as_str());
            }
        }
    }
    seen
}

/// Compact chat message: counts, sources, Top 5 titles, category overview.
pub fn render_webhook_summary(digest: &Digest) -> String {
    let mut msg = format!("## 🤖 AI日报 - {}\n\n", format_date_zh(digest.generated_at));

    if digest.total_articles == 0 {
        msg.push_str("📭 今日无更新，近24小时内暂无新内容\n");
        return msg;
    }

    let sources: Vec<&str> = digest
        .groups
        .iter()
        .map(|g| g.source_name.as_str())
        .collect();
    msg.push_str(&format!(
        "> 📊 共收集 {} 篇文章\n> 🔄 数据源: {}\n",
        digest.total_articles,
        sources.join("、"),
    ));

    msg.push_str("\n### 🔥 今日精选 Top 5\n\n");
    for (i, article) in top_articles(digest, 5).iter().enumerate() {
        msg.push_str(&format!("{}. {}\n", i + 1, article.title));
    }

    let categories = category_overview(digest);
    if !categories.is_empty() {
        msg.push_str("\n### 📑 分类概览\n\n");
        for cat in categories {
            msg.push_str(&format!("• {cat}\n"));
        }
    }

    msg.push_str(&format!(
        "\n*发送时间: {}*\n",
        format_time_zh(digest.generated_at)
    ));
    msg
}
