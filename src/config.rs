//! Run configuration: vocabularies, feeds, thresholds and fetch settings.
//!
//! A configuration is built once at startup and shared read-only with the
//! pipeline. Values come from three layers, later ones winning:
//!
//! 1. Built-in defaults (the Maharashtra climate profile)
//! 2. An optional YAML file (`--config`)
//! 3. Command-line overrides
//!
//! # File Format
//!
//! Every key is optional. Keyword tables are YAML mappings; their document
//! order is the tie-break order for the dominant keyword.
//!
//! ```yaml
//! feeds:
//!   - https://indianexpress.com/section/cities/pune/feed/
//! topic_keywords:
//!   climate change: 5
//!   flood: 3
//! location_keywords:
//!   pune: 3
//! min_relevance_score: 5.0
//! recency_days: 7
//! fetch:
//!   content_timeout_secs: 10
//! ```

use crate::cli::Cli;
use crate::filters::months_window;
use crate::keywords::KeywordWeightTable;
use chrono::TimeDelta;
use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::time::Duration;
use tracing::{info, instrument};

/// Category reported for keywords missing from `impact_categories`.
pub const DEFAULT_IMPACT_CATEGORY: &str = "general impact";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const DEFAULT_FEEDS: [&str; 11] = [
    "https://timesofindia.indiatimes.com/rssfeedstopstories.cms",
    "https://www.indiatoday.in/rss/home",
    "https://www.hindustantimes.com/feeds/rss/india/rssfeed.xml",
    "https://indianexpress.com/feed/",
    "https://www.ndtv.com/rss",
    "https://www.livemint.com/rss/news",
    "https://www.thehindu.com/news/national/feeder/default.rss",
    "https://timesofindia.indiatimes.com/rssfeeds/-2128838597.cms",
    "https://www.hindustantimes.com/feeds/rss/cities/mumbai-news/rssfeed.xml",
    "https://indianexpress.com/section/cities/mumbai/feed/",
    "https://indianexpress.com/section/cities/pune/feed/",
];

const DEFAULT_TOPIC_KEYWORDS: [(&str, u32); 19] = [
    ("drought", 3),
    ("rainfall", 3),
    ("flood", 3),
    ("heatwave", 3),
    ("monsoon", 3),
    ("climate change", 5),
    ("global warming", 4),
    ("heavy rain", 3),
    ("water crisis", 4),
    ("temperature rise", 3),
    ("extreme weather", 4),
    ("water scarcity", 4),
    ("climate", 2),
    ("rain", 1),
    ("weather", 1),
    ("temperature", 1),
    ("crop damage", 3),
    ("agriculture", 2),
    ("irrigation", 2),
];

const DEFAULT_LOCATION_KEYWORDS: [(&str, u32); 13] = [
    ("maharashtra", 5),
    ("mumbai", 4),
    ("pune", 3),
    ("nagpur", 3),
    ("nashik", 3),
    ("aurangabad", 3),
    ("solapur", 3),
    ("kolhapur", 3),
    ("thane", 3),
    ("konkan", 3),
    ("vidarbha", 3),
    ("marathwada", 3),
    ("western maharashtra", 4),
];

const DEFAULT_IMPACT_CATEGORIES: [(&str, &str); 5] = [
    ("drought", "water scarcity"),
    ("rainfall", "water resources"),
    ("flood", "disaster impact"),
    ("heatwave", "health effects"),
    ("monsoon", "agricultural impact"),
];

/// HTTP settings shared by the feed source and the content fetcher.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchSettings {
    pub user_agent: String,
    /// Timeout for a single article page.
    pub content_timeout_secs: u64,
    /// Timeout for a whole feed document.
    pub feed_timeout_secs: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            content_timeout_secs: 10,
            feed_timeout_secs: 30,
        }
    }
}

impl FetchSettings {
    pub fn content_timeout(&self) -> Duration {
        Duration::from_secs(self.content_timeout_secs)
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }
}

/// Complete, resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Feed URLs, scanned and merged in this order.
    pub feeds: Vec<String>,
    pub topic_keywords: KeywordWeightTable,
    pub location_keywords: KeywordWeightTable,
    /// Primary keyword → broader impact category, for the summary.
    pub impact_categories: HashMap<String, String>,
    pub min_relevance_score: f64,
    /// Recency window in months of 30 days.
    pub recency_months: u32,
    /// Recency window in days; takes precedence over `recency_months`.
    pub recency_days: Option<u32>,
    /// Feeds scanned at once. Output order does not depend on it.
    pub concurrency: usize,
    /// Fetch full article text for entries passing the keyword gate.
    pub enrich: bool,
    pub fetch: FetchSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feeds: DEFAULT_FEEDS.iter().map(|s| s.to_string()).collect(),
            topic_keywords: KeywordWeightTable::new(DEFAULT_TOPIC_KEYWORDS),
            location_keywords: KeywordWeightTable::new(DEFAULT_LOCATION_KEYWORDS),
            impact_categories: DEFAULT_IMPACT_CATEGORIES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            min_relevance_score: 5.0,
            recency_months: 6,
            recency_days: None,
            concurrency: 4,
            enrich: true,
            fetch: FetchSettings::default(),
        }
    }
}

impl Config {
    /// Parse a YAML document, filling unspecified keys with defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, Box<dyn Error>> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML configuration file.
    #[instrument(level = "info")]
    pub async fn load(path: &str) -> Result<Self, Box<dyn Error>> {
        let yaml = tokio::fs::read_to_string(path).await?;
        let config = Self::from_yaml(&yaml)?;
        info!(
            feeds = config.feeds.len(),
            topic_keywords = config.topic_keywords.len(),
            location_keywords = config.location_keywords.len(),
            "Loaded configuration file"
        );
        Ok(config)
    }

    /// Resolve the configuration for a CLI invocation.
    pub async fn resolve(cli: &Cli) -> Result<Self, Box<dyn Error>> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path).await?,
            None => Self::default(),
        };
        config.apply_overrides(cli);
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of file or default values.
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if !cli.feeds.is_empty() {
            self.feeds = cli.feeds.clone();
        }
        if let Some(score) = cli.min_relevance_score {
            self.min_relevance_score = score;
        }
        if let Some(days) = cli.max_age_days {
            self.recency_days = Some(days);
        }
        if let Some(concurrency) = cli.concurrency {
            self.concurrency = concurrency;
        }
        if cli.no_enrich {
            self.enrich = false;
        }
    }

    fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.topic_keywords.is_empty() || self.location_keywords.is_empty() {
            return Err("topic_keywords and location_keywords must each list at least one phrase".into());
        }
        if !self.min_relevance_score.is_finite() || self.min_relevance_score < 0.0 {
            return Err(format!(
                "min_relevance_score must be a non-negative number, got {}",
                self.min_relevance_score
            )
            .into());
        }
        if self.concurrency == 0 {
            return Err("concurrency must be at least 1".into());
        }
        Ok(())
    }

    /// Maximum article age accepted by the recency filter.
    pub fn max_age(&self) -> TimeDelta {
        match self.recency_days {
            Some(days) => TimeDelta::days(i64::from(days)),
            None => months_window(self.recency_months),
        }
    }

    /// Impact category for a primary keyword.
    pub fn impact_category(&self, keyword: &str) -> &str {
        self.impact_categories
            .get(keyword)
            .map(String::as_str)
            .unwrap_or(DEFAULT_IMPACT_CATEGORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_profile() {
        let config = Config::default();
        assert_eq!(config.feeds.len(), 11);
        assert_eq!(config.topic_keywords.len(), 19);
        assert_eq!(config.location_keywords.len(), 13);
        assert_eq!(config.min_relevance_score, 5.0);
        assert_eq!(config.max_age(), TimeDelta::days(180));
        assert_eq!(config.fetch.content_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("min_relevance_score: 2.5\nrecency_days: 7\n").unwrap();
        assert_eq!(config.min_relevance_score, 2.5);
        assert_eq!(config.max_age(), TimeDelta::days(7));
        assert_eq!(config.feeds.len(), 11);
        assert_eq!(config.fetch, FetchSettings::default());
    }

    #[test]
    fn test_yaml_keyword_tables() {
        let yaml = r#"
topic_keywords:
  cyclone: 4
  storm surge: 3
location_keywords:
  odisha: 5
fetch:
  content_timeout_secs: 5
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.topic_keywords.score("Cyclone and storm surge"), 7);
        assert_eq!(config.location_keywords.score("ODISHA coast"), 5);
        assert_eq!(config.fetch.content_timeout_secs, 5);
        assert_eq!(config.fetch.feed_timeout_secs, 30);
    }

    #[test]
    fn test_bundled_pune_profile() {
        let config = Config::from_yaml(include_str!("../config/pune_week.yaml")).unwrap();
        assert_eq!(config.feeds.len(), 2);
        assert_eq!(config.max_age(), TimeDelta::days(7));
        assert_eq!(config.topic_keywords.iter().next().unwrap().phrase, "climate change");
        assert_eq!(config.impact_category("water cut"), "water scarcity");
        assert_eq!(config.fetch.content_timeout_secs, 8);
        assert!(config.enrich);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::from_yaml("min_relevance: 3\n").is_err());
    }

    #[test]
    fn test_empty_vocabulary_rejected() {
        assert!(Config::from_yaml("topic_keywords: {}\n").is_err());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        assert!(Config::from_yaml("concurrency: 0\n").is_err());
    }

    #[test]
    fn test_impact_category_lookup() {
        let config = Config::default();
        assert_eq!(config.impact_category("flood"), "disaster impact");
        assert_eq!(config.impact_category("irrigation"), DEFAULT_IMPACT_CATEGORY);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "climate_news_radar",
            "--feed",
            "https://example.com/a.xml",
            "--feed",
            "https://example.com/b.xml",
            "--min-relevance-score",
            "3",
            "--max-age-days",
            "7",
            "--concurrency",
            "1",
            "--no-enrich",
        ]);
        let mut config = Config::default();
        config.apply_overrides(&cli);

        assert_eq!(config.feeds, vec!["https://example.com/a.xml", "https://example.com/b.xml"]);
        assert_eq!(config.min_relevance_score, 3.0);
        assert_eq!(config.max_age(), TimeDelta::days(7));
        assert_eq!(config.concurrency, 1);
        assert!(!config.enrich);
    }
}
