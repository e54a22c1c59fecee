//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeouts
//! - Pacing requests through a token bucket (one token per delay, burst 1)
//! - Treating any status >= 400 as a hard error
//! - Honoring cancellation at the limiter wait and during the request
//!
//! There is no retry logic; resilience is the caller's responsibility.

use crate::config::FetcherConfig;
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use std::num::NonZeroU32;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Capability to fetch a page body
///
/// Any HTTP-capable client matching this shape can drive a crawl.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetches `url` and returns the response body
    async fn fetch(&self, cancel: &CancellationToken, url: &str) -> FetchResult<String>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Polite GET client shared by every request of a run
///
/// Share one instance (behind an `Arc`) between crawls of the same host when
/// they should be throttled together.
pub struct RateLimitedFetcher {
    client: Client,
    limiter: DefaultDirectRateLimiter,
    delay: Duration,
}

impl RateLimitedFetcher {
    /// Creates a fetcher from configuration
    pub fn new(config: &FetcherConfig) -> FetchResult<Self> {
        let client = build_http_client(config).map_err(FetchError::Client)?;
        Ok(Self::with_client(client, config.delay()))
    }

    /// Wraps an existing client, allowing one request per `delay`
    ///
    /// A zero delay disables pacing.
    pub fn with_client(client: Client, delay: Duration) -> Self {
        let quota = Quota::with_period(delay)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MAX))
            .allow_burst(NonZeroU32::MIN);

        Self {
            client,
            limiter: RateLimiter::direct(quota),
            delay,
        }
    }

    /// Returns the configured inter-request delay
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits for a limiter token, then GETs `url`
    ///
    /// # Errors
    ///
    /// * `Cancelled` - the token fired while waiting or mid-request
    /// * `Http` - network failure or timeout
    /// * `Status` - the server answered with a status >= 400
    pub async fn get(&self, cancel: &CancellationToken, url: &str) -> FetchResult<String> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            _ = self.limiter.until_ready() => {}
        }

        tracing::debug!("GET {}", url);

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            result = self.client.get(url).send() => result.map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?,
        };

        let status = response.status();
        if status.as_u16() >= 400 {
            // Dropping the response closes the body
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            body = response.text() => body.map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            }),
        }
    }
}

#[async_trait]
impl Fetch for RateLimitedFetcher {
    async fn fetch(&self, cancel: &CancellationToken, url: &str) -> FetchResult<String> {
        self.get(cancel, url).await
    }
}

#[async_trait]
impl<F: Fetch + ?Sized> Fetch for std::sync::Arc<F> {
    async fn fetch(&self, cancel: &CancellationToken, url: &str) -> FetchResult<String> {
        (**self).fetch(cancel, url).await
    }
}
