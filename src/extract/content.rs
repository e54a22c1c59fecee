//! Content-root selection
//!
//! Sites use incompatible templates, so the root is chosen from an ordered
//! list of configured selectors, then generic containers, then `<body>`.

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};

/// Generic containers tried when no configured candidate matches
const FALLBACK_SELECTOR: &str = "article, main, .content, #content";

/// Which rule picked the content root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// A configured candidate selector matched
    Candidate(String),
    /// One of the generic containers matched
    Fallback,
    /// Nothing matched; the whole body is used
    Body,
}

/// A content root detached from the caller's document
///
/// Holds its own copy of the parsed tree so noise removal never touches the
/// document that title and pagination resolution read from.
#[derive(Debug, Clone)]
pub struct ContentNode {
    document: Html,
    id: NodeId,
    source: ContentSource,
}

impl ContentNode {
    fn new(document: &Html, element: ElementRef<'_>, source: ContentSource) -> Self {
        Self {
            document: document.clone(),
            id: element.id(),
            source,
        }
    }

    /// Returns the root element
    pub fn element(&self) -> ElementRef<'_> {
        self.document
            .tree
            .get(self.id)
            .and_then(ElementRef::wrap)
            .unwrap_or_else(|| self.document.root_element())
    }

    /// Returns the rule that selected this root
    pub fn source(&self) -> &ContentSource {
        &self.source
    }

    /// Returns the root's outer HTML
    pub fn html(&self) -> String {
        self.element().html()
    }

    pub(crate) fn root_id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn document_mut(&mut self) -> &mut Html {
        &mut self.document
    }
}

/// Selects the content root of a chapter page
///
/// Candidates are tried in order and the first match wins regardless of how
/// much text it holds; length is checked after reconstruction. Candidates
/// that fail to parse as CSS are skipped.
///
/// # Arguments
///
/// * `document` - The parsed page
/// * `candidates` - Ordered content-root selectors
///
/// # Returns
///
/// The selected root, or `None` only if the document has no `<body>`
pub fn extract_content(document: &Html, candidates: &[String]) -> Option<ContentNode> {
    for candidate in candidates {
        let selector = match Selector::parse(candidate) {
            Ok(selector) => selector,
            Err(e) => {
                tracing::debug!("Skipping unparseable selector '{}': {:?}", candidate, e);
                continue;
            }
        };

        if let Some(element) = document.select(&selector).next() {
            tracing::debug!("Content root matched candidate '{}'", candidate);
            return Some(ContentNode::new(
                document,
                element,
                ContentSource::Candidate(candidate.clone()),
            ));
        }
    }

    // Fallbacks for common layouts
    if let Ok(selector) = Selector::parse(FALLBACK_SELECTOR) {
        if let Some(element) = document.select(&selector).next() {
            tracing::debug!("Content root matched generic container");
            return Some(ContentNode::new(document, element, ContentSource::Fallback));
        }
    }

    // Last resort: body
    let selector = Selector::parse("body").ok()?;
    let body = document.select(&selector).next()?;
    tracing::warn!("No content container matched, using <body>");
    Some(ContentNode::new(document, body, ContentSource::Body))
}
