//! Crawler coordinator - main crawl orchestration logic
//!
//! Drives one strictly sequential run:
//!
//! ```text
//! Fetching(url) -> Parsing -> Persisting -> Advancing -> Fetching(next) | Done
//! ```
//!
//! Page N+1 is never requested before page N is parsed, because its address
//! comes from page N. Every error ends the run; chapters already handed to the
//! saver stay saved, but the collected list is not returned.

use crate::config::{Config, ParserConfig};
use crate::crawler::fetcher::{Fetch, RateLimitedFetcher};
use crate::extract::ChapterParser;
use crate::model::Chapter;
use crate::storage::Saver;
use crate::{ConfigError, FetchError, TrawlError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Per-run state, discarded when the run ends
#[derive(Debug)]
struct CrawlState {
    current_url: String,
    pages_visited: usize,
    chapters: Vec<Chapter>,
}

impl CrawlState {
    fn new(start_url: &str) -> Self {
        Self {
            current_url: start_url.to_string(),
            pages_visited: 0,
            chapters: Vec::new(),
        }
    }
}

/// Main crawler structure
///
/// Owns the fetcher, the compiled parser rules and the optional saver. A
/// crawler can be reused for several sequential runs; each run gets fresh
/// state.
pub struct Crawler<F: Fetch> {
    fetcher: F,
    parser: ChapterParser,
    saver: Option<Box<dyn Saver + Send>>,
}

impl Crawler<RateLimitedFetcher> {
    /// Creates a crawler with an HTTP fetcher built from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(TrawlError)` - Invalid parser rules or HTTP client failure
    pub fn from_config(config: &Config) -> Result<Self, TrawlError> {
        let fetcher = RateLimitedFetcher::new(&config.fetcher).map_err(TrawlError::FetcherInit)?;
        Ok(Self::new(fetcher, config.parser.clone())?)
    }
}

impl<F: Fetch> Crawler<F> {
    /// Creates a crawler around any [`Fetch`] implementation
    ///
    /// Scene-break patterns are compiled here, once for all pages.
    pub fn new(fetcher: F, parser_config: ParserConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            fetcher,
            parser: ChapterParser::new(parser_config)?,
            saver: None,
        })
    }

    /// Enables persistence: every parsed chapter is saved before advancing
    pub fn with_saver<S: Saver + Send + 'static>(mut self, saver: S) -> Self {
        self.saver = Some(Box::new(saver));
        self
    }

    /// Runs the crawl loop
    ///
    /// # Arguments
    ///
    /// * `cancel` - Cancellation token, honored before each fetch, during the
    ///   fetch and during the politeness delay
    /// * `start_url` - Absolute URL of the first page
    /// * `max_pages` - Page budget; values below 1 are treated as 1
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Chapter>)` - One chapter per visited page, in crawl order
    /// * `Err(TrawlError)` - The first failure; no partial result
    pub async fn run(
        &mut self,
        cancel: &CancellationToken,
        start_url: &str,
        max_pages: usize,
    ) -> Result<Vec<Chapter>, TrawlError> {
        Url::parse(start_url).map_err(|source| TrawlError::InvalidUrl {
            url: start_url.to_string(),
            source,
        })?;

        let max_pages = max_pages.max(1);
        let mut state = CrawlState::new(start_url);

        tracing::info!("Starting crawl at {} (max {} pages)", start_url, max_pages);

        while state.pages_visited < max_pages {
            if cancel.is_cancelled() {
                return Err(TrawlError::Cancelled);
            }

            // Fetching
            let url = state.current_url.clone();
            let body = self
                .fetcher
                .fetch(cancel, &url)
                .await
                .map_err(|source| match source {
                    FetchError::Cancelled => TrawlError::Cancelled,
                    source => TrawlError::Fetch {
                        url: url.clone(),
                        source,
                    },
                })?;

            // Parsing
            let parsed = self.parser.parse_html(&body, &url)?;
            state.pages_visited += 1;
            tracing::info!(
                "Parsed chapter {} ({}) from {}",
                parsed.chapter.code,
                parsed.chapter.title,
                url
            );

            self.polite_pause(cancel).await?;

            // Persisting
            if let Some(saver) = self.saver.as_mut() {
                saver
                    .save(&parsed.chapter)
                    .map_err(|source| TrawlError::Save {
                        title: parsed.chapter.title.clone(),
                        source,
                    })?;
            }
            state.chapters.push(parsed.chapter);

            // Advancing
            let Some(href) = parsed.next_href.filter(|href| !href.trim().is_empty()) else {
                tracing::info!("No next page after {}", url);
                break;
            };

            match resolve_next_url(&url, &href) {
                Ok(next) => state.current_url = next.to_string(),
                Err(e) => {
                    tracing::warn!("Cannot resolve next href '{}' from {}: {}", href, url, e);
                    break;
                }
            }
        }

        tracing::info!(
            "Crawl finished: {} chapters from {} pages",
            state.chapters.len(),
            state.pages_visited
        );

        Ok(state.chapters)
    }

    /// Sleeps for the configured politeness delay, unless cancelled
    async fn polite_pause(&self, cancel: &CancellationToken) -> Result<(), TrawlError> {
        let delay = self.parser.config().polite_delay();
        if delay == Duration::ZERO {
            return Ok(());
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TrawlError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}

/// Resolves a next-page href against the current page URL
///
/// Hrefs that already carry a scheme and host are used as-is; anything else
/// is resolved with standard URL-reference resolution.
///
/// # Example
///
/// ```
/// use chapter_trawl::crawler::resolve_next_url;
///
/// let next = resolve_next_url("https://site.example/b/ch1", "ch2").unwrap();
/// assert_eq!(next.as_str(), "https://site.example/b/ch2");
/// ```
pub fn resolve_next_url(current: &str, href: &str) -> Result<Url, url::ParseError> {
    let href = href.trim();
    match Url::parse(href) {
        Ok(absolute) if absolute.has_host() => Ok(absolute),
        _ => Url::parse(current)?.join(href),
    }
}
