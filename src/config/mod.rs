//! Configuration module for Chapter-Trawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; missing keys take the stock values from
//! [`ParserConfig::default`] and [`FetcherConfig::default`].
//!
//! # Example
//!
//! ```no_run
//! use chapter_trawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("trawl.toml")).unwrap();
//! println!("Minimum chapter length: {}", config.parser.min_text_len);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetcherConfig, ParserConfig, SceneBreakStyle};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::{validate, validate_parser_config};
