//! Best-effort retrieval of full article text.
//!
//! Enrichment is two collaborating steps:
//! - a [`ContentFetcher`] downloads the article page
//! - [`extract_paragraph_text`] pulls the visible paragraph text out of it
//!
//! [`ContentEnricher`] combines them and reports failure as an explicit
//! `Err`. The pipeline matches on it and scores title and summary alone
//! when enrichment fails; a failure never aborts a run.

use crate::config::FetchSettings;
use crate::utils::collapse_whitespace;
use reqwest::Client;
use scraper::{Html, Selector};
use std::error::Error;
use tracing::{debug, instrument};
use url::Url;

/// Anything that can return the raw HTML behind a URL.
pub trait ContentFetcher {
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>>;
}

/// HTTP fetcher with a browser-like user agent and a short timeout.
#[derive(Debug, Clone)]
pub struct HttpContentFetcher {
    client: Client,
}

impl HttpContentFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self, Box<dyn Error>> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.content_timeout())
            .build()?;
        Ok(Self { client })
    }
}

impl ContentFetcher for HttpContentFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let url = Url::parse(url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("unsupported URL scheme: {}", url.scheme()).into());
        }

        let body = self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

/// Text of every `<p>` in the document, joined by spaces, whitespace
/// collapsed and trimmed.
pub fn extract_paragraph_text(html: &str) -> Result<String, Box<dyn Error>> {
    let document = Html::parse_document(html);
    let paragraph = Selector::parse("p")?;
    let text = document
        .select(&paragraph)
        .map(|p| p.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ");
    Ok(collapse_whitespace(&text))
}

/// Fetch-then-extract over any [`ContentFetcher`].
#[derive(Debug, Clone)]
pub struct ContentEnricher<F> {
    fetcher: F,
}

impl<F: ContentFetcher> ContentEnricher<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Full article text behind `url`, or the fetch/extract error.
    #[instrument(level = "debug", skip(self))]
    pub async fn enrich(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let html = self.fetcher.fetch(url).await?;
        let text = extract_paragraph_text(&html)?;
        debug!(bytes = text.len(), "Extracted article text");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeFetcher {
        pages: HashMap<String, String>,
    }

    impl ContentFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| format!("404 for {url}").into())
        }
    }

    const ARTICLE: &str = r#"<html>
<head><title>Ignored</title><script>var x = "<p>not text</p>";</script></head>
<body>
  <nav>Home | Cities</nav>
  <p>Heavy   rain lashed <a href="/mumbai">Mumbai</a>
     on Tuesday.</p>
  <div><p>The IMD issued an <b>orange</b> alert.</p></div>
  <p></p>
</body>
</html>"#;

    #[test]
    fn test_extract_paragraph_text() {
        let text = extract_paragraph_text(ARTICLE).unwrap();
        assert_eq!(
            text,
            "Heavy rain lashed Mumbai on Tuesday. The IMD issued an orange alert."
        );
    }

    #[test]
    fn test_extract_without_paragraphs_is_empty() {
        let text = extract_paragraph_text("<html><body><div>Only a div</div></body></html>").unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_enrich_success() {
        let fetcher = FakeFetcher {
            pages: HashMap::from([("https://example.com/a".to_string(), ARTICLE.to_string())]),
        };
        let enricher = ContentEnricher::new(fetcher);
        let text = enricher.enrich("https://example.com/a").await.unwrap();
        assert!(text.starts_with("Heavy rain lashed Mumbai"));
    }

    #[tokio::test]
    async fn test_enrich_failure_is_reported() {
        let enricher = ContentEnricher::new(FakeFetcher { pages: HashMap::new() });
        assert!(enricher.enrich("https://example.com/missing").await.is_err());
    }

    #[tokio::test]
    async fn test_http_fetcher_rejects_non_http_scheme() {
        let fetcher = HttpContentFetcher::new(&FetchSettings::default()).unwrap();
        assert!(fetcher.fetch("ftp://example.com/file").await.is_err());
        assert!(fetcher.fetch("no scheme at all").await.is_err());
    }
}
