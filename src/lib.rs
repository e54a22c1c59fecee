//! Chapter-Trawl: a polite serial-content extractor
//!
//! This crate walks a paginated work (web-novel chapters, article series) one
//! page at a time, normalizes each page's noisy markup into a sanitized
//! [`Chapter`], and follows "next chapter" links until the work ends or the
//! page budget runs out.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod model;
pub mod storage;

use thiserror::Error;

/// Main error type for Chapter-Trawl operations
///
/// Every variant is fatal to the run that produced it.
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to initialize fetcher: {0}")]
    FetcherInit(#[source] FetchError),

    #[error("Fetch failed for {url}: {source}")]
    Fetch { url: String, source: FetchError },

    #[error("HTML parse error for {url}: {message}")]
    Parse { url: String, message: String },

    #[error("No content node found for {url}")]
    ContentNotFound { url: String },

    #[error("Chapter at {url} too short: {length} characters, minimum is {minimum}")]
    ChapterTooShort {
        url: String,
        length: usize,
        minimum: usize,
    },

    #[error("Failed to save chapter '{title}': {source}")]
    Save {
        title: String,
        source: storage::SaveError,
    },

    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Crawl cancelled")]
    Cancelled,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// HTTP fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Request cancelled")]
    Cancelled,
}

/// Result type alias for Chapter-Trawl operations
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::{Config, ParserConfig, SceneBreakStyle};
pub use crawler::{crawl, Crawler, Fetch, RateLimitedFetcher};
pub use model::Chapter;
pub use storage::{MemorySaver, Saver};
