// src/classify.rs
//! Keyword classifier and importance scoring.
//!
//! The classifier is built once from an immutable [`ClassifierConfig`] and is
//! pure after that: the same input always yields the same label. Keywords are
//! regex patterns counted case-insensitively over `title + " " + description`.
//! The category with the strictly highest total wins; on a tie the
//! first-declared category keeps it, and an all-zero result falls back to the
//! default label.

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};
use regex::Regex;

use crate::config::{ClassifierConfig, Priority};
use crate::ingest::types::Article;

/// Summaries keep at most this many chars of the description.
pub const SUMMARY_MAX_CHARS: usize = 200;

#[derive(Debug)]
struct CompiledCategory {
    name: String,
    keywords: Vec<Regex>,
}

#[derive(Debug)]
pub struct Classifier {
    categories: Vec<CompiledCategory>,
    default_category: String,
    /// Lowercased once at construction; matched as substrings of the title.
    importance_keywords: Vec<String>,
}

impl Classifier {
    /// Compile the keyword tables. Empty names/keywords and invalid patterns
    /// are construction errors, never runtime surprises.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let mut categories = Vec::with_capacity(config.categories.len());
        for rule in &config.categories {
            if rule.name.trim().is_empty() {
                bail!("category with empty name");
            }
            if rule.keywords.is_empty() {
                bail!("category `{}` has no keywords", rule.name);
            }
            let mut keywords = Vec::with_capacity(rule.keywords.len());
            for kw in &rule.keywords {
                if kw.trim().is_empty() {
                    bail!("category `{}` has an empty keyword", rule.name);
                }
                let re = Regex::new(&format!("(?i){kw}"))
                    .map_err(|e| anyhow!("category `{}` keyword `{}` regex error: {}", rule.name, kw, e))?;
                keywords.push(re);
            }
            categories.push(CompiledCategory {
                name: rule.name.clone(),
                keywords,
            });
        }
        Ok(Self {
            categories,
            default_category: config.default_category.clone(),
            importance_keywords: config
                .importance_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
        })
    }

    /// Label one article by keyword occurrence counts. Deterministic: the
    /// strictly highest total wins and a tie keeps the first-declared
    /// category. Zero hits everywhere yields the default label.
    pub fn classify(&self, title: &str, description: &str) -> &str {
        let text = format!("{title} {description}").to_lowercase();
        let mut best: Option<(&str, usize)> = None;
        for cat in &self.categories {
            let total: usize = cat
                .keywords
                .iter()
                .map(|re| re.find_iter(&text).count())
                .sum();
            match best {
                Some((_, s)) if total > s => best = Some((cat.name.as_str(), total)),
                None => best = Some((cat.name.as_str(), total)),
                _ => {}
            }
        }
        match best {
            Some((name, total)) if total > 0 => name,
            _ => self.default_category.as_str(),
        }
    }

    /// Importance 1..=10: base 5, +2 for a high-priority source, +2 under a
    /// day old (else +1 under three days), +0.5 per importance keyword found
    /// in the title (each at most once), rounded and clamped.
    pub fn importance(&self, article: &Article, now: DateTime<Utc>) -> u8 {
        let mut score = 5.0f32;
        if article.priority == Priority::High {
            score += 2.0;
        }
        let days = now
            .signed_duration_since(article.published_at)
            .num_seconds() as f32
            / 86_400.0;
        if days < 1.0 {
            score += 2.0;
        } else if days < 3.0 {
            score += 1.0;
        }
        let title = article.title.to_lowercase();
        for kw in &self.importance_keywords {
            if title.contains(kw.as_str()) {
                score += 0.5;
            }
        }
        (score.round() as i32).clamp(1, 10) as u8
    }

    /// The cleaned description verbatim when it fits, otherwise the first
    /// [`SUMMARY_MAX_CHARS`] chars plus an ellipsis. Char-based so CJK text
    /// truncates safely.
    pub fn summary(&self, description: &str) -> String {
        if description.chars().count() <= SUMMARY_MAX_CHARS {
            description.to_string()
        } else {
            let mut s: String = description.chars().take(SUMMARY_MAX_CHARS).collect();
            s.push_str("...");
            s
        }
    }

    /// Fill `category`, `summary` and `importance` for every article, once.
    pub fn process(&self, articles: &mut [Article], now: DateTime<Utc>) {
        for article in articles.iter_mut() {
            let category = self.classify(&article.title, &article.description).to_string();
            let summary = self.summary(&article.description);
            article.category = category;
            article.summary = summary;
            article.importance = self.importance(article, now);
        }
    }
}
