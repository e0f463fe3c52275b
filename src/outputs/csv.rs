//! CSV output: the ranked results table and its analyzed companion.
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── climate_news_20250701-093000.csv           # headline, date, url, keyword, sentiment, relevance_score
//! └── analyzed_climate_news_20250701-093000.csv  # same columns + impact_category
//! ```

use crate::config::Config;
use crate::models::{AnalyzedRecord, Candidate};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Paths written by [`write_results`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOutputs {
    pub results: PathBuf,
    pub analyzed: PathBuf,
}

/// Results file name for a run started at `started`.
pub fn results_file_name(started: DateTime<Local>) -> String {
    format!("climate_news_{}.csv", started.format("%Y%m%d-%H%M%S"))
}

/// Write `rows` as CSV with a header row taken from the record fields.
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut writer = ::csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the ranked results and the impact-tagged analysis next to each other.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display(), rows = candidates.len()))]
pub fn write_results(
    output_dir: &Path,
    file_name: &str,
    candidates: &[Candidate],
    config: &Config,
) -> Result<CsvOutputs, Box<dyn Error>> {
    let results = output_dir.join(file_name);
    write_rows(&results, candidates)?;
    info!(path = %results.display(), "Wrote results CSV");

    let analyzed_rows: Vec<AnalyzedRecord> = candidates
        .iter()
        .map(|c| AnalyzedRecord::new(c, config.impact_category(&c.keyword)))
        .collect();
    let analyzed = output_dir.join(format!("analyzed_{file_name}"));
    write_rows(&analyzed, &analyzed_rows)?;
    info!(path = %analyzed.display(), "Wrote analyzed CSV");

    Ok(CsvOutputs { results, analyzed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SENTIMENT_PLACEHOLDER;
    use chrono::TimeZone;

    fn candidate(headline: &str, keyword: &str, score: f64) -> Candidate {
        Candidate {
            headline: headline.to_string(),
            date: "2025-06-30".to_string(),
            url: "https://news.example/story".to_string(),
            keyword: keyword.to_string(),
            sentiment: SENTIMENT_PLACEHOLDER.to_string(),
            relevance_score: score,
        }
    }

    #[test]
    fn test_results_file_name() {
        let started = Local.with_ymd_and_hms(2025, 7, 1, 9, 30, 5).unwrap();
        assert_eq!(results_file_name(started), "climate_news_20250701-093005.csv");
    }

    #[test]
    fn test_write_results_header_and_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let rows = vec![
            candidate("Flood, then drought: Pune's year", "flood", 7.5),
            candidate("Farm loans for Vidarbha", "irrigation", 5.0),
        ];

        let outputs = write_results(tmp.path(), "run.csv", &rows, &Config::default()).unwrap();

        let results = std::fs::read_to_string(&outputs.results).unwrap();
        let mut lines = results.lines();
        assert_eq!(
            lines.next(),
            Some("headline,date,url,keyword,sentiment,relevance_score")
        );
        assert_eq!(
            lines.next(),
            Some("\"Flood, then drought: Pune's year\",2025-06-30,https://news.example/story,flood,Neutral (0.0),7.5")
        );
        assert_eq!(lines.count(), 1);

        let analyzed = std::fs::read_to_string(&outputs.analyzed).unwrap();
        assert!(outputs.analyzed.ends_with("analyzed_run.csv"));
        let mut lines = analyzed.lines();
        assert!(lines.next().unwrap().ends_with(",relevance_score,impact_category"));
        assert!(lines.next().unwrap().ends_with(",disaster impact"));
        assert!(lines.next().unwrap().ends_with(",general impact"));
    }

    #[test]
    fn test_write_rows_to_missing_dir_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("missing/out.csv");
        let rows = vec![candidate("x", "flood", 5.0)];
        assert!(write_rows(&path, &rows).is_err());
    }
}
