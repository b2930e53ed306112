//! # Configuration
//!
//! Static configuration for the digest pipeline:
//!
//! - **Sources**: the RSS feeds to poll, each with a display name, URL,
//!   editorial category and fetch priority.
//! - **Classifier tables**: an *ordered* list of categories with their
//!   keyword lists, the default label for unmatched articles, and the
//!   keywords that boost the importance score.
//!
//! Both load from TOML or JSON with the same fallback order: explicit env
//! path, then `config/*.toml`, then `config/*.json`, then a built-in seed.
//! Category order in the file is meaningful (classification ties go to the
//! first-declared category), so the tables deserialize into `Vec`s, never
//! maps.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_SOURCES_PATH: &str = "DIGEST_SOURCES_PATH";
const ENV_CLASSIFIER_PATH: &str = "DIGEST_CLASSIFIER_PATH";

/// Fetch priority of a source; feeds marked high get an importance bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Normal,
}

/// One configured RSS feed. Immutable at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
    /// Editorial category of the feed itself (not the per-article label).
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
}

/// A classifier category: a label plus the keywords that vote for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Classifier tables. Category order is declaration order and is preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub categories: Vec<CategoryRule>,
    #[serde(default = "default_category_label")]
    pub default_category: String,
    #[serde(default = "default_importance_keywords")]
    pub importance_keywords: Vec<String>,
}

fn default_category_label() -> String {
    "其他".to_string()
}

fn default_importance_keywords() -> Vec<String> {
    ["breakthrough", "release", "launch", "major", "new", "AI"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Load sources from an explicit path. Supports TOML or JSON formats.
pub fn load_sources_from(path: &Path) -> Result<Vec<Source>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let sources = parse_sources(&content, ext.as_str())
        .with_context(|| format!("parsing sources from {}", path.display()))?;
    validate_sources(&sources)?;
    Ok(sources)
}

/// Load sources using env var + fallbacks:
/// 1) $DIGEST_SOURCES_PATH
/// 2) config/sources.toml
/// 3) config/sources.json
/// 4) built-in seed
pub fn load_sources_default() -> Result<Vec<Source>> {
    if let Ok(p) = std::env::var(ENV_SOURCES_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb);
        } else {
            return Err(anyhow!("DIGEST_SOURCES_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/sources.toml");
    if toml_p.exists() {
        return load_sources_from(&toml_p);
    }
    let json_p = PathBuf::from("config/sources.json");
    if json_p.exists() {
        return load_sources_from(&json_p);
    }
    tracing::debug!("no sources config found, using built-in seed");
    Ok(seed_sources())
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<Vec<Source>> {
    #[derive(Deserialize)]
    struct SourcesFile {
        sources: Vec<Source>,
    }
    // TOML uses a named table array; JSON is a bare array.
    let try_toml = hint_ext == "toml" || s.contains("[[sources]]");
    if try_toml {
        if let Ok(f) = toml::from_str::<SourcesFile>(s) {
            return Ok(f.sources);
        }
    }
    if let Ok(v) = serde_json::from_str::<Vec<Source>>(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(f) = toml::from_str::<SourcesFile>(s) {
            return Ok(f.sources);
        }
    }
    Err(anyhow!("unsupported sources format"))
}

/// Reject configurations the pipeline cannot run on: empty names/urls and
/// duplicate names (grouping keys on the name).
pub fn validate_sources(sources: &[Source]) -> Result<()> {
    let mut seen = HashSet::new();
    for s in sources {
        if s.name.trim().is_empty() {
            bail!("source with empty name");
        }
        if s.url.trim().is_empty() {
            bail!("source {:?} has empty url", s.name);
        }
        if !seen.insert(s.name.as_str()) {
            bail!("duplicate source name {:?}", s.name);
        }
    }
    Ok(())
}

/// Built-in feed list, used when no config file is present.
pub(crate) fn seed_sources() -> Vec<Source> {
    [
        ("机器之心", "https://www.jiqizhixin.com/rss", "AI资讯"),
        ("量子位", "https://www.qbitai.com/feed", "AI资讯"),
        (
            "Daniel Miessler",
            "https://danielmiessler.com/feed.rss",
            "AI基础设施/安全",
        ),
    ]
    .into_iter()
    .map(|(name, url, category)| Source {
        name: name.to_string(),
        url: url.to_string(),
        category: category.to_string(),
        priority: Priority::High,
    })
    .collect()
}

/// Load classifier tables from an explicit path. Supports TOML or JSON.
pub fn load_classifier_from(path: &Path) -> Result<ClassifierConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading classifier config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let cfg = parse_classifier(&content, ext.as_str())
        .with_context(|| format!("parsing classifier config from {}", path.display()))?;
    Ok(cfg.cleaned())
}

/// Load classifier tables using env var + fallbacks:
/// 1) $DIGEST_CLASSIFIER_PATH
/// 2) config/classifier.toml
/// 3) config/classifier.json
/// 4) built-in seed
pub fn load_classifier_default() -> Result<ClassifierConfig> {
    if let Ok(p) = std::env::var(ENV_CLASSIFIER_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_classifier_from(&pb);
        } else {
            return Err(anyhow!("DIGEST_CLASSIFIER_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/classifier.toml");
    if toml_p.exists() {
        return load_classifier_from(&toml_p);
    }
    let json_p = PathBuf::from("config/classifier.json");
    if json_p.exists() {
        return load_classifier_from(&json_p);
    }
    tracing::debug!("no classifier config found, using built-in seed");
    Ok(ClassifierConfig::default_seed())
}

fn parse_classifier(s: &str, hint_ext: &str) -> Result<ClassifierConfig> {
    let try_toml = hint_ext == "toml" || s.contains("[[categories]]");
    if try_toml {
        if let Ok(cfg) = toml::from_str::<ClassifierConfig>(s) {
            return Ok(cfg);
        }
    }
    if let Ok(cfg) = serde_json::from_str::<ClassifierConfig>(s) {
        return Ok(cfg);
    }
    if !try_toml {
        if let Ok(cfg) = toml::from_str::<ClassifierConfig>(s) {
            return Ok(cfg);
        }
    }
    Err(anyhow!("unsupported classifier config format"))
}

impl ClassifierConfig {
    /// Built-in category tables, used when no config file is present.
    pub fn default_seed() -> Self {
        let categories = [
            (
                "AI基础设施",
                &["infrastructure", "platform", "system", "framework", "PAI", "agent"][..],
            ),
            (
                "机器学习研究",
                &["research", "model", "training", "RL", "reinforcement", "paper"][..],
            ),
            (
                "AI安全与对齐",
                &["safety", "alignment", "security", "risk", "ethics"][..],
            ),
            (
                "AI产品应用",
                &["product", "application", "tool", "feature", "launch"][..],
            ),
            ("开发工具", &["coding", "development", "API", "CLI", "SDK"][..]),
            ("行业动态", &["news", "announcement", "update", "release"][..]),
            ("创业/商业", &["startup", "business", "market", "investment"][..]),
            ("技术教程", &["tutorial", "guide", "how-to", "learn"][..]),
        ]
        .into_iter()
        .map(|(name, words)| CategoryRule {
            name: name.to_string(),
            keywords: words.iter().map(|w| w.to_string()).collect(),
        })
        .collect();

        Self {
            categories,
            default_category: default_category_label(),
            importance_keywords: default_importance_keywords(),
        }
    }

    /// Trim keywords and drop empty entries, preserving order.
    fn cleaned(mut self) -> Self {
        for cat in &mut self.categories {
            cat.keywords = cat
                .keywords
                .iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
        }
        self.importance_keywords = self
            .importance_keywords
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn toml_and_json_sources_parse() {
        let toml = r#"
            [[sources]]
            name = "机器之心"
            url = "https://www.jiqizhixin.com/rss"
            category = "AI资讯"
            priority = "high"

            [[sources]]
            name = "Example"
            url = "https://example.com/feed"
            category = "测试"
        "#;
        let out = parse_sources(toml, "toml").unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name, "机器之心");
        assert_eq!(out[0].priority, Priority::High);
        assert_eq!(out[1].priority, Priority::Normal);

        let json = r#"[{"name":"A","url":"https://a/rss","category":"x","priority":"normal"}]"#;
        let out = parse_sources(json, "json").unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].priority, Priority::Normal);
    }

    #[test]
    fn duplicate_source_names_rejected() {
        let sources = vec![
            Source {
                name: "A".into(),
                url: "https://a/rss".into(),
                category: "x".into(),
                priority: Priority::Normal,
            },
            Source {
                name: "A".into(),
                url: "https://b/rss".into(),
                category: "x".into(),
                priority: Priority::Normal,
            },
        ];
        assert!(validate_sources(&sources).is_err());
    }

    #[test]
    fn classifier_seed_preserves_declaration_order() {
        let cfg = ClassifierConfig::default_seed();
        let names: Vec<&str> = cfg.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "AI基础设施",
                "机器学习研究",
                "AI安全与对齐",
                "AI产品应用",
                "开发工具",
                "行业动态",
                "创业/商业",
                "技术教程",
            ]
        );
        assert_eq!(cfg.default_category, "其他");
    }

    #[test]
    fn classifier_toml_round_trips_order_and_defaults() {
        let toml = r#"
            [[categories]]
            name = "安全"
            keywords = ["safety", " risk ", ""]

            [[categories]]
            name = "工具"
            keywords = ["cli"]
        "#;
        let cfg = parse_classifier(toml, "toml").unwrap().cleaned();
        assert_eq!(cfg.categories[0].name, "安全");
        assert_eq!(cfg.categories[0].keywords, vec!["safety", "risk"]);
        assert_eq!(cfg.categories[1].name, "工具");
        // Fields absent from the file fall back to the seed values.
        assert_eq!(cfg.default_category, "其他");
        assert!(cfg.importance_keywords.contains(&"release".to_string()));
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        // Isolate CWD in a temp dir so a real config/ in the repo does not
        // interfere.
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();

        env::remove_var(ENV_SOURCES_PATH);

        // No files in the temp CWD means the seed is used.
        let v = load_sources_default().unwrap();
        assert_eq!(v.len(), 3);
        assert_eq!(v[0].name, "机器之心");

        // Env var takes precedence.
        let p_json = tmp.path().join("sources.json");
        fs::write(
            &p_json,
            r#"[{"name":"X","url":"https://x/rss","category":"t"}]"#,
        )
        .unwrap();
        env::set_var(ENV_SOURCES_PATH, p_json.display().to_string());
        let v2 = load_sources_default().unwrap();
        assert_eq!(v2.len(), 1);
        assert_eq!(v2[0].name, "X");
        env::remove_var(ENV_SOURCES_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
