//! Command-line interface definitions.
//!
//! Options override values from the optional YAML configuration file,
//! which in turn overrides the built-in regional profile.

use clap::Parser;

/// Scan news feeds for regional climate coverage and rank it by relevance.
///
/// # Examples
///
/// ```sh
/// # Built-in feeds and vocabularies, CSV written to ./out
/// climate_news_radar -o ./out
///
/// # Custom profile, last week only, JSON edition as well
/// climate_news_radar -c profile.yaml --max-age-days 7 -j ./json
///
/// # Score a single feed on headlines and summaries alone
/// climate_news_radar --feed https://indianexpress.com/section/cities/pune/feed/ --no-enrich
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML configuration file
    #[arg(short, long, env = "CLIMATE_NEWS_CONFIG")]
    pub config: Option<String>,

    /// Output directory for the CSV files
    #[arg(short, long, env = "CLIMATE_NEWS_OUTPUT_DIR", default_value = ".")]
    pub output_dir: String,

    /// Optional output directory for the JSON edition
    #[arg(short, long, env = "CLIMATE_NEWS_JSON_DIR")]
    pub json_output_dir: Option<String>,

    /// Feed URL to scan; repeat to scan several. Replaces the configured feeds.
    #[arg(long = "feed", value_name = "URL")]
    pub feeds: Vec<String>,

    /// Minimum combined relevance score for an article to be kept
    #[arg(long)]
    pub min_relevance_score: Option<f64>,

    /// Only keep articles published within this many days
    #[arg(long)]
    pub max_age_days: Option<u32>,

    /// Number of feeds scanned at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Score on title and summary only; skip fetching article pages
    #[arg(long)]
    pub no_enrich: bool,

    /// Number of top results printed to the console
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["climate_news_radar"]);

        assert_eq!(cli.output_dir, ".");
        assert!(cli.config.is_none());
        assert!(cli.json_output_dir.is_none());
        assert!(cli.feeds.is_empty());
        assert!(!cli.no_enrich);
        assert_eq!(cli.top, 10);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "climate_news_radar",
            "-c",
            "/tmp/profile.yaml",
            "-o",
            "/tmp/csv",
            "-j",
            "/tmp/json",
        ]);

        assert_eq!(cli.config.as_deref(), Some("/tmp/profile.yaml"));
        assert_eq!(cli.output_dir, "/tmp/csv");
        assert_eq!(cli.json_output_dir.as_deref(), Some("/tmp/json"));
    }

    #[test]
    fn test_cli_repeated_feed() {
        let cli = Cli::parse_from([
            "climate_news_radar",
            "--feed",
            "https://example.com/one.xml",
            "--feed",
            "https://example.com/two.xml",
            "--top",
            "3",
        ]);

        assert_eq!(cli.feeds.len(), 2);
        assert_eq!(cli.top, 3);
    }
}
