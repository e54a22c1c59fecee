//! Removal of structural, social, ad and meta subtrees from a content root

use crate::extract::content::ContentNode;
use scraper::Selector;

/// Subtrees never considered chapter text
const NOISE_SELECTORS: &[&str] = &[
    "nav",
    "header",
    "footer",
    ".sharedaddy",
    ".jp-relatedposts",
    ".post-meta",
    ".post-navigation",
    ".entry-footer",
    ".site-footer",
    "script",
    "style",
    "figure",
    "aside",
    "iframe",
    ".adsbygoogle",
];

/// Removes denylisted subtrees below the content root
///
/// Only descendants are considered; the root itself is kept even if it
/// matches. Anything not on the denylist stays. Applying this twice leaves the
/// tree as it was after the first pass.
///
/// # Returns
///
/// The number of subtrees detached
pub fn strip_noise(content: &mut ContentNode) -> usize {
    let Ok(selector) = Selector::parse(&NOISE_SELECTORS.join(", ")) else {
        return 0;
    };

    let root_id = content.root_id();
    let noisy: Vec<_> = content
        .element()
        .select(&selector)
        .map(|element| element.id())
        .filter(|id| *id != root_id)
        .collect();

    let tree = &mut content.document_mut().tree;
    for id in &noisy {
        if let Some(mut node) = tree.get_mut(*id) {
            node.detach();
        }
    }

    if !noisy.is_empty() {
        tracing::debug!("Stripped {} noise subtrees", noisy.len());
    }

    noisy.len()
}
