//! Feed ingestion and relevance scoring.
//!
//! For each entry of each feed, in order:
//!
//! 1. **Recency**: drop entries older than the configured window (fail open)
//! 2. **Language**: drop entries whose title and summary do not look English
//! 3. **Keyword gate**: title and summary must mention at least one topic
//!    phrase and one location phrase before any page is fetched
//! 4. **Enrichment**: append the article's paragraph text, or carry on with
//!    title and summary if the fetch fails
//! 5. **Scoring**: `relevance = min(topic, location / 2)` must reach the
//!    configured minimum
//!
//! Accepted candidates from all feeds are then deduplicated by
//! case-insensitive headline (first occurrence wins) and stably ranked by
//! relevance, highest first.
//!
//! Feeds are scanned up to `concurrency` at a time, but results are merged
//! in feed order, so output never depends on which feed answers first.

use crate::config::Config;
use crate::enrich::{ContentEnricher, ContentFetcher};
use crate::feeds::FeedSource;
use crate::filters::{is_recent, looks_like_target_language, publish_date};
use crate::models::{Candidate, FeedEntry, SENTIMENT_PLACEHOLDER, Score};
use crate::utils::truncate_for_log;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::fmt;
use tracing::{debug, info, instrument, warn};

/// Why an entry did not become a candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    /// Published before the recency window.
    Stale,
    /// Title and summary failed the language heuristic.
    NotTargetLanguage,
    /// Title and summary lack a topic phrase or a location phrase.
    NoKeywordMatch,
    /// Combined relevance under the configured minimum.
    BelowThreshold { relevance: f64 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Stale => write!(f, "outside recency window"),
            Rejection::NotTargetLanguage => write!(f, "not in target language"),
            Rejection::NoKeywordMatch => write!(f, "missing topic or location keyword"),
            Rejection::BelowThreshold { relevance } => {
                write!(f, "relevance {relevance:.1} below threshold")
            }
        }
    }
}

/// Counters for one run, logged when the run completes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    pub feeds_scanned: usize,
    pub feeds_failed: usize,
    pub entries_seen: usize,
    pub rejected_stale: usize,
    pub rejected_language: usize,
    pub rejected_keywords: usize,
    pub rejected_threshold: usize,
    pub enrichment_failures: usize,
    pub accepted: usize,
    pub duplicates_removed: usize,
}

impl ScanStats {
    fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::Stale => self.rejected_stale += 1,
            Rejection::NotTargetLanguage => self.rejected_language += 1,
            Rejection::NoKeywordMatch => self.rejected_keywords += 1,
            Rejection::BelowThreshold { .. } => self.rejected_threshold += 1,
        }
    }

    fn absorb(&mut self, other: ScanStats) {
        self.feeds_scanned += other.feeds_scanned;
        self.feeds_failed += other.feeds_failed;
        self.entries_seen += other.entries_seen;
        self.rejected_stale += other.rejected_stale;
        self.rejected_language += other.rejected_language;
        self.rejected_keywords += other.rejected_keywords;
        self.rejected_threshold += other.rejected_threshold;
        self.enrichment_failures += other.enrichment_failures;
        self.accepted += other.accepted;
        self.duplicates_removed += other.duplicates_removed;
    }
}

/// Ranked, deduplicated result of a run.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub candidates: Vec<Candidate>,
    pub stats: ScanStats,
}

impl ScanReport {
    /// `true` when no relevant articles were found.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Accepted candidates of one feed, in entry order.
#[derive(Debug, Default)]
struct FeedScan {
    candidates: Vec<Candidate>,
    stats: ScanStats,
}

/// The relevance pipeline over a feed source and a content fetcher.
pub struct Pipeline<'a, S, F> {
    config: &'a Config,
    source: S,
    enricher: ContentEnricher<F>,
}

impl<'a, S, F> Pipeline<'a, S, F>
where
    S: FeedSource,
    F: ContentFetcher,
{
    pub fn new(config: &'a Config, source: S, enricher: ContentEnricher<F>) -> Self {
        Self {
            config,
            source,
            enricher,
        }
    }

    /// Scan every configured feed and return ranked, deduplicated candidates.
    ///
    /// Feed failures are logged and counted, never returned. An empty
    /// report means nothing relevant was found.
    #[instrument(level = "info", skip_all, fields(feeds = self.config.feeds.len()))]
    pub async fn run(&self, now: DateTime<Utc>) -> ScanReport {
        let scans: Vec<FeedScan> = stream::iter(self.config.feeds.iter())
            .map(|feed_url| self.scan_feed(feed_url, now))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut stats = ScanStats::default();
        let mut accepted = Vec::new();
        for scan in scans {
            stats.absorb(scan.stats);
            accepted.extend(scan.candidates);
        }

        let before = accepted.len();
        let candidates = rank(deduplicate(accepted));
        stats.duplicates_removed = before - candidates.len();

        info!(
            feeds_scanned = stats.feeds_scanned,
            feeds_failed = stats.feeds_failed,
            entries_seen = stats.entries_seen,
            rejected_stale = stats.rejected_stale,
            rejected_language = stats.rejected_language,
            rejected_keywords = stats.rejected_keywords,
            rejected_threshold = stats.rejected_threshold,
            enrichment_failures = stats.enrichment_failures,
            duplicates_removed = stats.duplicates_removed,
            results = candidates.len(),
            "Scan complete"
        );

        ScanReport { candidates, stats }
    }

    #[instrument(level = "info", skip(self, now))]
    async fn scan_feed(&self, feed_url: &str, now: DateTime<Utc>) -> FeedScan {
        let mut scan = FeedScan::default();
        scan.stats.feeds_scanned = 1;

        let entries = match self.source.fetch_entries(feed_url).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Feed failed; skipping");
                scan.stats.feeds_failed = 1;
                return scan;
            }
        };

        for entry in &entries {
            scan.stats.entries_seen += 1;
            match self.evaluate(entry, now, &mut scan.stats).await {
                Ok(candidate) => {
                    info!(
                        headline = %candidate.headline,
                        score = candidate.relevance_score,
                        keyword = %candidate.keyword,
                        "Found relevant article"
                    );
                    scan.stats.accepted += 1;
                    scan.candidates.push(candidate);
                }
                Err(rejection) => {
                    debug!(title = %truncate_for_log(&entry.title, 80), %rejection, "Entry rejected");
                    scan.stats.record(rejection);
                }
            }
        }

        scan
    }

    async fn evaluate(
        &self,
        entry: &FeedEntry,
        now: DateTime<Utc>,
        stats: &mut ScanStats,
    ) -> Result<Candidate, Rejection> {
        self.screen(entry, now)?;
        info!(title = %entry.title, "Found potential match");

        let headline_text = format!("{} {}", entry.title, entry.summary);
        let full_text = if self.config.enrich {
            match self.enricher.enrich(&entry.link).await {
                Ok(article) => format!("{headline_text} {article}"),
                Err(e) => {
                    warn!(url = %entry.link, error = %e, "Enrichment failed; scoring title and summary only");
                    stats.enrichment_failures += 1;
                    headline_text
                }
            }
        } else {
            headline_text
        };

        self.score_entry(entry, &full_text)
    }

    /// Cheap checks run before any article page is fetched.
    pub fn screen(&self, entry: &FeedEntry, now: DateTime<Utc>) -> Result<(), Rejection> {
        if !is_recent(entry, self.config.max_age(), now) {
            return Err(Rejection::Stale);
        }

        let screening_text = format!("{} {}", entry.title, entry.summary).to_lowercase();
        if !looks_like_target_language(&screening_text) {
            return Err(Rejection::NotTargetLanguage);
        }
        if !self.config.topic_keywords.matches_any(&screening_text)
            || !self.config.location_keywords.matches_any(&screening_text)
        {
            return Err(Rejection::NoKeywordMatch);
        }
        Ok(())
    }

    /// Score `full_text` and build the candidate if it clears the threshold.
    pub fn score_entry(&self, entry: &FeedEntry, full_text: &str) -> Result<Candidate, Rejection> {
        let score = score_text(full_text, self.config);
        let relevance = score.relevance();
        debug!(topic = score.topic, location = score.location, relevance, "Scored entry");

        if relevance < self.config.min_relevance_score {
            return Err(Rejection::BelowThreshold { relevance });
        }

        let keyword = self
            .config
            .topic_keywords
            .dominant(full_text)
            .unwrap_or_default()
            .to_string();

        Ok(Candidate {
            headline: entry.title.clone(),
            date: publish_date(entry),
            url: entry.link.clone(),
            keyword,
            sentiment: SENTIMENT_PLACEHOLDER.to_string(),
            relevance_score: relevance,
        })
    }
}

/// Topic and location scores of `text` against the configured vocabularies.
pub fn score_text(text: &str, config: &Config) -> Score {
    Score {
        topic: config.topic_keywords.score(text),
        location: config.location_keywords.score(text),
    }
}

/// Keep the first candidate for each case-insensitive headline.
pub fn deduplicate(candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates
        .into_iter()
        .unique_by(|c| c.headline.to_lowercase())
        .collect()
}

/// Stable sort by relevance, highest first.
pub fn rank(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    candidates
}
