//! Crawler module for page fetching and traversal
//!
//! This module contains the core crawling logic, including:
//! - Paced HTTP fetching behind the [`Fetch`] capability
//! - The sequential fetch, parse, persist, advance loop
//! - Resolution of relative next-page links

mod coordinator;
mod fetcher;

pub use coordinator::{resolve_next_url, Crawler};
pub use fetcher::{build_http_client, Fetch, RateLimitedFetcher};

use crate::config::Config;
use crate::model::Chapter;
use crate::TrawlError;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl operation
///
/// This is the main entry point for a crawl without persistence. It will:
/// 1. Build the rate-limited HTTP fetcher
/// 2. Compile the parser rules
/// 3. Follow next-page links from `start_url` for up to `max_pages` pages
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `cancel` - Cancellation token for the whole run
/// * `start_url` - Absolute URL of the first chapter
/// * `max_pages` - Page budget (at least one page is always fetched)
///
/// # Returns
///
/// * `Ok(Vec<Chapter>)` - Chapters in crawl order
/// * `Err(TrawlError)` - Crawl failed
pub async fn crawl(
    config: &Config,
    cancel: &CancellationToken,
    start_url: &str,
    max_pages: usize,
) -> Result<Vec<Chapter>, TrawlError> {
    let mut crawler = Crawler::from_config(config)?;
    crawler.run(cancel, start_url, max_pages).await
}
