//! Console rendering of a run: the top results and a distribution summary.
//!
//! Both views implement [`fmt::Display`] so they can be printed directly
//! or rendered into a string for tests.

use crate::config::Config;
use crate::models::Candidate;
use std::fmt;

/// Number of headlines listed at the end of the summary.
const SUMMARY_HEADLINES: usize = 5;

/// Count occurrences, highest count first, ties in order of first appearance.
pub fn distribution<'a, I>(items: I) -> Vec<(&'a str, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(key, _)| *key == item) {
            Some((_, count)) => *count += 1,
            None => counts.push((item, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// The first `limit` ranked results with score, date, keyword and URL.
pub struct TopResults<'a> {
    pub candidates: &'a [Candidate],
    pub limit: usize,
}

impl fmt::Display for TopResults<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Top Results:")?;
        for (idx, c) in self.candidates.iter().take(self.limit).enumerate() {
            writeln!(f, "{}. {} (Score: {:.1})", idx + 1, c.headline, c.relevance_score)?;
            writeln!(f, "   Date: {} | Keyword: {}", c.date, c.keyword)?;
            writeln!(f, "   URL: {}", c.url)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Totals and keyword, sentiment and impact-category distributions.
pub struct Summary<'a> {
    pub candidates: &'a [Candidate],
    pub config: &'a Config,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let candidates = self.candidates;

        writeln!(f, "===== CLIMATE NEWS SUMMARY =====")?;
        writeln!(f, "Total articles analyzed: {}", candidates.len())?;

        let sections = [
            (
                "Keyword Distribution",
                distribution(candidates.iter().map(|c| c.keyword.as_str())),
            ),
            (
                "Sentiment Distribution",
                distribution(candidates.iter().map(Candidate::sentiment_label)),
            ),
            (
                "Impact Categories",
                distribution(
                    candidates
                        .iter()
                        .map(|c| self.config.impact_category(&c.keyword)),
                ),
            ),
        ];
        for (title, counts) in sections {
            writeln!(f)?;
            writeln!(f, "{title}:")?;
            for (label, count) in counts {
                writeln!(f, "  - {label}: {count} articles")?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Top Headlines:")?;
        for c in candidates.iter().take(SUMMARY_HEADLINES) {
            writeln!(f, "  - {}", c.headline)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SENTIMENT_PLACEHOLDER;

    fn candidate(headline: &str, keyword: &str, score: f64) -> Candidate {
        Candidate {
            headline: headline.to_string(),
            date: "2025-06-30".to_string(),
            url: format!("https://news.example/{keyword}"),
            keyword: keyword.to_string(),
            sentiment: SENTIMENT_PLACEHOLDER.to_string(),
            relevance_score: score,
        }
    }

    fn sample() -> Vec<Candidate> {
        vec![
            candidate("Pune drought deepens", "drought", 9.0),
            candidate("Flood alert in Mumbai", "flood", 8.3),
            candidate("Kolhapur floods recede", "flood", 7.0),
            candidate("Canal plan for Marathwada", "irrigation", 6.0),
            candidate("Monsoon reaches Konkan", "monsoon", 5.5),
            candidate("Nagpur heat record", "heatwave", 5.0),
        ]
    }

    #[test]
    fn test_distribution_orders_by_count_then_first_seen() {
        let counts = distribution(["rain", "flood", "drought", "flood", "drought", "heat"]);
        assert_eq!(
            counts,
            vec![("flood", 2), ("drought", 2), ("rain", 1), ("heat", 1)]
        );
        assert!(distribution(Vec::<&str>::new()).is_empty());
    }

    #[test]
    fn test_top_results_limit_and_format() {
        let rows = sample();
        let rendered = TopResults { candidates: &rows, limit: 2 }.to_string();
        assert!(rendered.starts_with("Top Results:\n1. Pune drought deepens (Score: 9.0)\n"));
        assert!(rendered.contains("2. Flood alert in Mumbai (Score: 8.3)"));
        assert!(rendered.contains("   Date: 2025-06-30 | Keyword: flood\n   URL: https://news.example/flood\n"));
        assert!(!rendered.contains("Kolhapur"));
    }

    #[test]
    fn test_summary_sections() {
        let rows = sample();
        let config = Config::default();
        let rendered = Summary { candidates: &rows, config: &config }.to_string();

        assert!(rendered.contains("Total articles analyzed: 6\n"));
        assert!(rendered.contains("Keyword Distribution:\n  - flood: 2 articles\n  - drought: 1 articles\n"));
        assert!(rendered.contains("Sentiment Distribution:\n  - Neutral: 6 articles\n"));
        assert!(rendered.contains("Impact Categories:\n  - disaster impact: 2 articles\n  - water scarcity: 1 articles\n  - general impact: 1 articles\n"));
        assert!(rendered.contains("  - Monsoon reaches Konkan\n"));
        assert!(!rendered.contains("  - Nagpur heat record"));
    }
}
