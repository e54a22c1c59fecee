//! Chapter title and ordering code

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;

/// Title used when neither `<h1>` nor `og:title` yields text
pub const UNTITLED: &str = "Untitled Chapter";

fn code_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\b(\d+\.\d+\s*[A-Z]?)\b").ok())
        .as_ref()
}

/// Resolves the chapter title and its short code
///
/// The title is the first non-empty of: the first `<h1>`, the `og:title`
/// meta content, [`UNTITLED`]. The code is the `12.3B`-style marker found in
/// the title, or the whole title when there is none.
///
/// # Example
///
/// ```
/// use chapter_trawl::extract::resolve_title;
/// use scraper::Html;
///
/// let document = Html::parse_document("<h1>Chapter 12.3B — Arrival</h1>");
/// let (title, code) = resolve_title(&document);
/// assert_eq!(title, "Chapter 12.3B — Arrival");
/// assert_eq!(code, "12.3B");
/// ```
pub fn resolve_title(document: &Html) -> (String, String) {
    let title = heading_title(document)
        .or_else(|| og_title(document))
        .unwrap_or_else(|| UNTITLED.to_string());
    let code = chapter_code(&title);
    (title, code)
}

/// Extracts the normalized code from a title
pub fn chapter_code(title: &str) -> String {
    code_pattern()
        .and_then(|re| re.captures(title))
        .and_then(|caps| caps.get(1))
        .map(|m| normalize_whitespace(m.as_str()))
        .filter(|code| !code.is_empty())
        .unwrap_or_else(|| title.to_string())
}

fn heading_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("h1").ok()?;
    document
        .select(&selector)
        .next()
        .map(|h1| normalize_whitespace(&h1.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

fn og_title(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"meta[property="og:title"]"#).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(normalize_whitespace)
        .filter(|t| !t.is_empty())
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_from_numbered_title() {
        assert_eq!(chapter_code("Chapter 12.3B — Arrival"), "12.3B");
        assert_eq!(chapter_code("Chapter 4.10 The Long Road"), "4.10");
        assert_eq!(chapter_code("1.02"), "1.02");
    }

    #[test]
    fn test_code_whitespace_normalized() {
        assert_eq!(chapter_code("Interlude 7.1 A"), "7.1 A");
    }

    #[test]
    fn test_code_falls_back_to_title() {
        assert_eq!(chapter_code("Prologue"), "Prologue");
        assert_eq!(chapter_code("Chapter 12"), "Chapter 12");
    }

    #[test]
    fn test_title_from_first_h1() {
        let document = Html::parse_document(
            "<html><body><h1>  Chapter 2.1\n  Rain </h1><h1>Second</h1></body></html>",
        );
        assert_eq!(
            resolve_title(&document),
            ("Chapter 2.1 Rain".to_string(), "2.1".to_string())
        );
    }

    #[test]
    fn test_title_from_og_meta() {
        let document = Html::parse_document(
            r#"<html><head><meta property="og:title" content="Epilogue"></head><body><h1> </h1></body></html>"#,
        );
        assert_eq!(
            resolve_title(&document),
            ("Epilogue".to_string(), "Epilogue".to_string())
        );
    }

    #[test]
    fn test_untitled_fallback() {
        let document = Html::parse_document("<html><body><p>text</p></body></html>");
        assert_eq!(
            resolve_title(&document),
            (UNTITLED.to_string(), UNTITLED.to_string())
        );
    }
}
