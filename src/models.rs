//! Data models flowing through the relevance pipeline.
//!
//! - [`FeedEntry`]: a raw entry as yielded by a feed source
//! - [`Score`]: the topic/location score pair and its combined relevance
//! - [`Candidate`]: an entry that survived every filter, ready for output
//! - [`Edition`]: a ranked run serialized as the JSON edition
//! - [`AnalyzedRecord`]: a candidate tagged with its impact category

use crate::utils::time_of_day_at;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentiment label written for every candidate. No sentiment model runs;
/// the column is kept so downstream consumers see a stable schema.
pub const SENTIMENT_PLACEHOLDER: &str = "Neutral (0.0)";

/// Date written when an entry carries no usable publish date.
pub const UNKNOWN_DATE: &str = "Unknown";

/// A single entry read from a syndicated feed.
///
/// Presence is explicit: a feed that omits a summary yields an empty
/// string, and a feed that omits or garbles its publish date yields `None`
/// for `published`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedEntry {
    /// Entry headline.
    pub title: String,
    /// Entry summary or description, stripped of markup. May be empty.
    pub summary: String,
    /// Link to the full article.
    pub link: String,
    /// Publish timestamp, when the feed supplied one that could be parsed.
    pub published: Option<DateTime<Utc>>,
    /// Publish timestamp exactly as the feed wrote it.
    pub published_raw: Option<String>,
}

/// Topic and location scores for one piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub topic: u64,
    pub location: u64,
}

impl Score {
    /// Combined relevance: `min(topic, location / 2)`.
    ///
    /// Both axes have to carry signal; a flood of location mentions cannot
    /// lift an article with no topical content, and vice versa.
    pub fn relevance(&self) -> f64 {
        (self.topic as f64).min(self.location as f64 / 2.0)
    }
}

/// A feed entry that passed recency, language, keyword and threshold checks.
///
/// Field names match the output record schema.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Candidate {
    pub headline: String,
    /// `YYYY-MM-DD` or `"Unknown"`.
    pub date: String,
    pub url: String,
    /// Most frequent topic phrase in the article text.
    pub keyword: String,
    pub sentiment: String,
    pub relevance_score: f64,
}

impl Candidate {
    /// Sentiment label with the parenthetical score removed,
    /// e.g. `"Neutral (0.0)"` -> `"Neutral"`.
    pub fn sentiment_label(&self) -> &str {
        self.sentiment
            .split('(')
            .next()
            .unwrap_or_default()
            .trim()
    }
}

/// A candidate plus the broader impact category derived from its keyword.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedRecord<'a> {
    pub headline: &'a str,
    pub date: &'a str,
    pub url: &'a str,
    pub keyword: &'a str,
    pub sentiment: &'a str,
    pub relevance_score: f64,
    pub impact_category: &'a str,
}

impl<'a> AnalyzedRecord<'a> {
    pub fn new(candidate: &'a Candidate, impact_category: &'a str) -> Self {
        Self {
            headline: &candidate.headline,
            date: &candidate.date,
            url: &candidate.url,
            keyword: &candidate.keyword,
            sentiment: &candidate.sentiment,
            relevance_score: candidate.relevance_score,
            impact_category,
        }
    }
}

/// One ranked run, serialized as the JSON edition.
///
/// # Edition Naming
///
/// The `time_of_day` field categorizes editions as:
/// - `"morning"`: 00:00 - 08:00
/// - `"afternoon"`: 08:00 - 16:00
/// - `"evening"`: 16:00 - 24:00
#[derive(Debug, Deserialize, Serialize)]
pub struct Edition {
    /// The date of the run in `YYYY-MM-DD` format.
    pub local_date: String,
    /// The time of day category: "morning", "afternoon", or "evening".
    pub time_of_day: String,
    /// The exact local time of the run.
    pub local_time: String,
    /// Ranked candidates.
    pub articles: Vec<Candidate>,
}

impl Edition {
    /// Edition for a run that started at local time `started`.
    ///
    /// Date, time and edition label all come from the same instant, so a
    /// run crossing a boundary keeps the label it started under.
    pub fn new(started: NaiveDateTime, articles: Vec<Candidate>) -> Self {
        Self {
            local_date: started.date().to_string(),
            time_of_day: time_of_day_at(started.time()).to_string(),
            local_time: started.time().to_string(),
            articles,
        }
    }
}
