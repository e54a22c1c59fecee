//! HTML normalization engine
//!
//! Turns one parsed chapter page into a [`Chapter`] plus the raw href of the
//! next page. The stages run in a fixed order:
//! 1. Content-root selection ([`extract_content`])
//! 2. Noise removal ([`strip_noise`])
//! 3. Block reconstruction and scene-break handling ([`rebuild_blocks`])
//! 4. Title and code resolution ([`resolve_title`])
//! 5. Next-page discovery ([`next_href`])
//!
//! The caller's document is never modified; stage 2 works on a private copy.

mod content;
mod inline;
mod noise;
mod pagination;
mod title;

pub use content::{extract_content, ContentNode, ContentSource};
pub use inline::{rebuild_blocks, SceneBreakRules};
pub use noise::strip_noise;
pub use pagination::next_href;
pub use title::{chapter_code, resolve_title, UNTITLED};

use crate::config::ParserConfig;
use crate::model::Chapter;
use crate::{ConfigError, TrawlError};
use scraper::Html;

/// Result of parsing one page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The extracted chapter
    pub chapter: Chapter,

    /// Next-page href as written in the page, if any
    pub next_href: Option<String>,
}

/// Parser configuration with its scene-break rules compiled
///
/// Built once per run and shared read-only across pages.
#[derive(Debug, Clone)]
pub struct ChapterParser {
    config: ParserConfig,
    scene_breaks: SceneBreakRules,
}

impl ChapterParser {
    /// Compiles a parser from configuration
    pub fn new(config: ParserConfig) -> Result<Self, ConfigError> {
        let scene_breaks = SceneBreakRules::compile(&config)?;
        Ok(Self {
            config,
            scene_breaks,
        })
    }

    /// Returns the underlying configuration
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses raw HTML for the page at `page_url`
    pub fn parse_html(&self, html: &str, page_url: &str) -> Result<ParsedPage, TrawlError> {
        let document = Html::parse_document(html);
        self.parse_document(&document, page_url)
    }

    /// Extracts the chapter and next href from a parsed page
    ///
    /// # Errors
    ///
    /// * `ContentNotFound` - no content root could be selected
    /// * `ChapterTooShort` - the rebuilt body has fewer than `min_text_len`
    ///   characters of plain text
    pub fn parse_document(&self, document: &Html, page_url: &str) -> Result<ParsedPage, TrawlError> {
        let (title, code) = resolve_title(document);

        let mut content = extract_content(document, &self.config.selector_candidates)
            .ok_or_else(|| TrawlError::ContentNotFound {
                url: page_url.to_string(),
            })?;
        strip_noise(&mut content);

        let chapter = Chapter {
            title,
            code,
            url: page_url.to_string(),
            html: rebuild_blocks(content.element(), &self.scene_breaks).join("\n"),
        };

        let length = chapter.plain_text().trim().chars().count();
        if length < self.config.min_text_len {
            return Err(TrawlError::ChapterTooShort {
                url: page_url.to_string(),
                length,
                minimum: self.config.min_text_len,
            });
        }

        let next_href = next_href(document, &self.config);

        Ok(ParsedPage { chapter, next_href })
    }
}
