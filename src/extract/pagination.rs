//! Next-page discovery

use crate::config::ParserConfig;
use scraper::{ElementRef, Html, Selector};

/// Finds the href of the next page
///
/// # Precedence
///
/// | Rule | Match |
/// |------|-------|
/// | 1 | `<link rel="next">` (any `rel` containing `next`) |
/// | 2 | first `<a>` whose trimmed text equals a configured next text |
/// | 3 | first `<a>` whose text contains "next", case-insensitive |
///
/// Anchors without a non-empty `href` are ignored. The returned href is
/// exactly as written in the page; resolution against the page URL is the
/// caller's job.
pub fn next_href(document: &Html, config: &ParserConfig) -> Option<String> {
    if let Some(href) = rel_next(document) {
        tracing::debug!("Next page from rel=next: {}", href);
        return Some(href);
    }

    let anchors = anchors_with_href(document);

    // Exact texts, in document order
    if let Some(href) = anchors.iter().find_map(|(text, href)| {
        config
            .next_texts
            .iter()
            .any(|next| next == text)
            .then(|| href.clone())
    }) {
        tracing::debug!("Next page from exact anchor text: {}", href);
        return Some(href);
    }

    // Fuzzy
    let href = anchors
        .into_iter()
        .find(|(text, _)| text.to_lowercase().contains("next"))
        .map(|(_, href)| href);
    if let Some(href) = &href {
        tracing::debug!("Next page from fuzzy anchor text: {}", href);
    }
    href
}

fn rel_next(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"link[rel*="next"][href]"#).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(non_empty_href)
}

/// (trimmed text, href) for every anchor carrying an href
fn anchors_with_href(document: &Html) -> Vec<(String, String)> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|anchor| {
            let href = non_empty_href(anchor)?;
            let text = anchor.text().collect::<String>().trim().to_string();
            Some((text, href))
        })
        .collect()
}

fn non_empty_href(element: ElementRef<'_>) -> Option<String> {
    element
        .value()
        .attr("href")
        .filter(|href| !href.trim().is_empty())
        .map(|href| href.to_string())
}
