//! Chapter value produced once per successfully parsed page

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// One normalized unit of extracted content
///
/// `html` only ever contains `p`, `blockquote`, `b`, `i`, `u`, `a`, `br`
/// and the scene-break markers; blocks are joined with `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Display title
    pub title: String,

    /// Short identifier used for ordering and naming (e.g. "12.3B")
    pub code: String,

    /// Source address of the page
    pub url: String,

    /// Sanitized body
    pub html: String,
}

impl Chapter {
    /// Returns the body as plain text, tags removed and entities decoded
    pub fn plain_text(&self) -> String {
        html_escape::decode_html_entities(&strip_tags(&self.html)).into_owned()
    }
}

fn tag_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]+>").ok()).as_ref()
}

/// Removes every tag, keeping text and entities as written
pub(crate) fn strip_tags(html: &str) -> String {
    match tag_pattern() {
        Some(re) => re.replace_all(html, "").into_owned(),
        None => html.to_string(),
    }
}
