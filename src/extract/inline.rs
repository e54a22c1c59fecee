//! Block reconstruction with a fixed inline whitelist
//!
//! Walks the content root in document order and rebuilds every paragraph,
//! list item and blockquote from scratch. Only `i`, `b`, `u`, `a` and `br`
//! survive inside a block; every other wrapper is unwrapped. Scene breaks
//! (typographic separators, bare rules, long `<br>` runs) become a single
//! marker element chosen by [`SceneBreakStyle`].

use crate::config::{ParserConfig, SceneBreakStyle};
use crate::model::strip_tags;
use crate::ConfigError;
use ego_tree::NodeRef;
use regex::Regex;
use scraper::node::Node;
use scraper::ElementRef;
use std::fmt::Write;
use std::sync::OnceLock;

/// Scene-break detection rules compiled once per run
#[derive(Debug, Clone)]
pub struct SceneBreakRules {
    patterns: Vec<Regex>,
    br_run: Option<Regex>,
    style: SceneBreakStyle,
}

impl SceneBreakRules {
    /// Compiles the configured patterns
    ///
    /// A `<br>` threshold below 2 disables run collapsing.
    pub fn compile(config: &ParserConfig) -> Result<Self, ConfigError> {
        let patterns = config
            .scene_break_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| {
                    ConfigError::InvalidPattern(format!(
                        "scene-break pattern '{}': {}",
                        pattern, e
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let br_run = if config.consecutive_br_threshold > 1 {
            let pattern = format!(
                r"(?i)(?:<br\s*/?>\s*){{{},}}",
                config.consecutive_br_threshold
            );
            Some(Regex::new(&pattern).map_err(|e| ConfigError::InvalidPattern(e.to_string()))?)
        } else {
            None
        };

        Ok(Self {
            patterns,
            br_run,
            style: config.scene_break_style,
        })
    }

    /// Returns true if the trimmed block text is a scene break
    ///
    /// Patterns are tried in order; empty text never matches.
    pub fn is_scene_break(&self, text: &str) -> bool {
        let text = text.trim();
        !text.is_empty() && self.patterns.iter().any(|pattern| pattern.is_match(text))
    }

    /// Returns the configured rendering
    pub fn style(&self) -> SceneBreakStyle {
        self.style
    }

    /// Replaces long `<br>` runs with one marker (or nothing for `none`)
    fn collapse_br_runs(&self, inner: &str) -> String {
        match &self.br_run {
            Some(re) => re
                .replace_all(inner, self.style.marker().unwrap_or(""))
                .into_owned(),
            None => inner.to_string(),
        }
    }
}

/// Rebuilds the content root into an ordered list of sanitized blocks
///
/// `p` and `li` become `<p>`, `blockquote` stays `<blockquote>`, a bare `hr`
/// becomes a scene-break marker. Blocks are emitted in document pre-order.
/// Markers never sit inside a `<p>`, and adjacent markers collapse to one.
pub fn rebuild_blocks(root: ElementRef<'_>, rules: &SceneBreakRules) -> Vec<String> {
    let mut blocks = Vec::new();

    for node in root.descendants().skip(1) {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };

        match element.value().name() {
            "p" | "li" => push_block(&mut blocks, "p", element, rules),
            "blockquote" => push_block(&mut blocks, "blockquote", element, rules),
            "hr" => push_marker(&mut blocks, rules.style()),
            _ => {}
        }
    }

    dedupe_markers(blocks)
}

fn push_marker(blocks: &mut Vec<String>, style: SceneBreakStyle) {
    if let Some(marker) = style.marker() {
        blocks.push(marker.to_string());
    }
}

fn push_block(blocks: &mut Vec<String>, tag: &str, element: ElementRef<'_>, rules: &SceneBreakRules) {
    if rules.is_scene_break(&collapsed_text(element)) {
        push_marker(blocks, rules.style());
        return;
    }

    let mut inner = String::new();
    write_inline(*element, &mut inner);
    let inner = rules.collapse_br_runs(&inner);

    // Inline tags still open at a marker are closed before it and reopened after
    let mut buf = String::new();
    let mut open: Vec<OpenTag<'_>> = Vec::new();
    for segment in split_on_markers(&inner) {
        match segment {
            Segment::Marker(marker) => {
                for open_tag in open.iter().rev() {
                    let _ = write!(buf, "</{}>", open_tag.name);
                }
                flush_block(blocks, tag, &buf);
                blocks.push(marker.to_string());
                buf.clear();
                for open_tag in &open {
                    buf.push_str(open_tag.start);
                }
            }
            Segment::Html(html) => {
                track_open_tags(html, &mut open);
                buf.push_str(html);
            }
        }
    }
    flush_block(blocks, tag, &buf);
}

/// Blocks without any text (bare `<br/>`, reopened empty wrappers) are dropped
fn flush_block(blocks: &mut Vec<String>, tag: &str, body: &str) {
    let body = body.trim();
    if !strip_tags(body).trim().is_empty() {
        blocks.push(format!("<{tag}>{body}</{tag}>"));
    }
}

/// An inline element opened but not yet closed in rebuilt HTML
struct OpenTag<'a> {
    name: &'a str,
    start: &'a str,
}

fn inline_tag_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"<(/?)(i|b|u|a)\b[^>]*>").ok())
        .as_ref()
}

/// Updates the stack of open inline tags with the tags found in `html`
fn track_open_tags<'a>(html: &'a str, open: &mut Vec<OpenTag<'a>>) {
    let Some(re) = inline_tag_pattern() else {
        return;
    };

    for caps in re.captures_iter(html) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        if caps.get(1).is_some_and(|slash| !slash.as_str().is_empty()) {
            if let Some(pos) = open.iter().rposition(|t| t.name == name.as_str()) {
                open.remove(pos);
            }
        } else {
            open.push(OpenTag {
                name: name.as_str(),
                start: whole.as_str(),
            });
        }
    }
}

/// Whitespace-collapsed text of an element
pub(crate) fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Writes the children of `node` through the inline whitelist
fn write_inline(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&html_escape::encode_text(&**text)),
            Node::Element(element) => match element.name() {
                "em" | "i" => wrap_inline(child, "i", out),
                "strong" | "b" => wrap_inline(child, "b", out),
                "u" => wrap_inline(child, "u", out),
                "br" => out.push_str("<br/>"),
                "a" => {
                    let href = element.attr("href").unwrap_or("");
                    let _ = write!(
                        out,
                        r#"<a href="{}">"#,
                        html_escape::encode_double_quoted_attribute(href)
                    );
                    write_inline(child, out);
                    out.push_str("</a>");
                }
                _ => write_inline(child, out),
            },
            _ => {}
        }
    }
}

fn wrap_inline(node: NodeRef<'_, Node>, tag: &str, out: &mut String) {
    let _ = write!(out, "<{}>", tag);
    write_inline(node, out);
    let _ = write!(out, "</{}>", tag);
}

enum Segment<'a> {
    Html(&'a str),
    Marker(&'static str),
}

/// Splits rebuilt inline HTML at embedded scene-break markers
///
/// Text nodes are escaped before this runs, so a marker can only come from
/// `<br>` run collapsing.
fn split_on_markers(inner: &str) -> Vec<Segment<'_>> {
    let markers = [SceneBreakStyle::HR_MARKER, SceneBreakStyle::SPACER_MARKER];
    let mut segments = Vec::new();
    let mut rest = inner;

    loop {
        let next = markers
            .iter()
            .filter_map(|marker| rest.find(marker).map(|pos| (pos, *marker)))
            .min_by_key(|(pos, _)| *pos);

        match next {
            Some((pos, marker)) => {
                if pos > 0 {
                    segments.push(Segment::Html(&rest[..pos]));
                }
                segments.push(Segment::Marker(marker));
                rest = &rest[pos + marker.len()..];
            }
            None => {
                if !rest.is_empty() {
                    segments.push(Segment::Html(rest));
                }
                return segments;
            }
        }
    }
}

/// Drops every marker that directly follows another marker
fn dedupe_markers(blocks: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(blocks.len());
    for block in blocks {
        let repeat = SceneBreakStyle::is_marker(&block)
            && out.last().is_some_and(|prev| SceneBreakStyle::is_marker(prev));
        if !repeat {
            out.push(block);
        }
    }
    out
}
