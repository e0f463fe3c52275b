//! Feed sources yielding raw entries for the pipeline.
//!
//! The pipeline only depends on the [`FeedSource`] trait, so tests can feed
//! it canned entries. [`HttpFeedSource`] is the production implementation:
//! it downloads a feed document and hands it to [`parser::parse_feed`].
//!
//! A failed fetch or a malformed document is returned as an error for that
//! one feed; the pipeline logs it and moves on to the next feed.

pub mod parser;

use crate::config::FetchSettings;
use crate::models::FeedEntry;
use reqwest::Client;
use std::error::Error;
use tracing::{debug, info, instrument};

/// Anything that can turn a feed URL into entries.
pub trait FeedSource {
    /// Fetch and parse every entry of the feed at `feed_url`, in feed order.
    async fn fetch_entries(&self, feed_url: &str) -> Result<Vec<FeedEntry>, Box<dyn Error>>;
}

/// Feed source backed by an HTTP client.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    pub fn new(settings: &FetchSettings) -> Result<Self, Box<dyn Error>> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.feed_timeout())
            .build()?;
        Ok(Self { client })
    }
}

impl FeedSource for HttpFeedSource {
    #[instrument(level = "info", skip(self))]
    async fn fetch_entries(&self, feed_url: &str) -> Result<Vec<FeedEntry>, Box<dyn Error>> {
        let body = self
            .client
            .get(feed_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        debug!(bytes = body.len(), "Downloaded feed document");

        let entries = parser::parse_feed(&body)?;
        info!(count = entries.len(), "Parsed feed entries");
        Ok(entries)
    }
}
