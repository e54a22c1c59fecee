use crate::config::types::{Config, FetcherConfig, ParserConfig};
use crate::ConfigError;
use regex::Regex;
use scraper::Selector;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_parser_config(&config.parser)?;
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates parser configuration
///
/// Selectors must parse as CSS and scene-break patterns must compile, so a
/// bad entry is reported before the first request instead of mid-crawl.
pub fn validate_parser_config(config: &ParserConfig) -> Result<(), ConfigError> {
    if config.selector_candidates.is_empty() {
        return Err(ConfigError::Validation(
            "selector_candidates must contain at least one selector".to_string(),
        ));
    }

    for candidate in &config.selector_candidates {
        validate_selector(candidate)?;
    }

    for pattern in &config.scene_break_patterns {
        Regex::new(pattern).map_err(|e| {
            ConfigError::InvalidPattern(format!("scene-break pattern '{}': {}", pattern, e))
        })?;
    }

    Ok(())
}

/// Validates a single CSS selector
fn validate_selector(selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::Validation(
            "selector candidate cannot be empty".to_string(),
        ));
    }

    Selector::parse(selector).map_err(|e| {
        ConfigError::Validation(format!("Invalid selector '{}': {:?}", selector, e))
    })?;

    Ok(())
}
