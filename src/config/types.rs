use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Chapter-Trawl
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub parser: ParserConfig,
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Minimum time between requests (milliseconds); 0 means the 500ms floor
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl FetcherConfig {
    /// Default pause between requests when none is configured
    pub const FALLBACK_DELAY: Duration = Duration::from_millis(500);

    /// Returns the effective inter-request delay
    pub fn delay(&self) -> Duration {
        if self.delay_ms == 0 {
            Self::FALLBACK_DELAY
        } else {
            Duration::from_millis(self.delay_ms)
        }
    }

    /// Returns the request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("chapter-trawl/{}", env!("CARGO_PKG_VERSION")),
            delay_ms: 1000,
            timeout_secs: 15,
        }
    }
}

/// How a detected scene break is rendered in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum SceneBreakStyle {
    /// `<hr class="scene-break"/>`
    #[default]
    Hr,
    /// `<p class="spacer"></p>`
    Spacer,
    /// Dropped from the output entirely
    None,
}

impl SceneBreakStyle {
    /// Rule marker emitted for [`SceneBreakStyle::Hr`]
    pub const HR_MARKER: &'static str = r#"<hr class="scene-break"/>"#;

    /// Empty-paragraph marker emitted for [`SceneBreakStyle::Spacer`]
    pub const SPACER_MARKER: &'static str = r#"<p class="spacer"></p>"#;

    /// Returns the marker HTML, or `None` when breaks are dropped
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            Self::Hr => Some(Self::HR_MARKER),
            Self::Spacer => Some(Self::SPACER_MARKER),
            Self::None => None,
        }
    }

    /// Returns true if `html` is one of the marker strings
    pub fn is_marker(html: &str) -> bool {
        html == Self::HR_MARKER || html == Self::SPACER_MARKER
    }
}

/// Unrecognized styles fall back to `Hr`
impl From<&str> for SceneBreakStyle {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "spacer" => Self::Spacer,
            "none" => Self::None,
            _ => Self::Hr,
        }
    }
}

impl From<String> for SceneBreakStyle {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

/// Extraction and pagination rules for one run
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Content-root selectors, tried in order; first match wins
    #[serde(rename = "selector-candidates")]
    pub selector_candidates: Vec<String>,

    /// Exact anchor texts recognized as "next page"
    #[serde(rename = "next-texts")]
    pub next_texts: Vec<String>,

    /// Minimum plain-text length (characters) for a page to count as a chapter
    #[serde(rename = "min-text-len")]
    pub min_text_len: usize,

    /// Extra fixed pause after each parsed page (seconds)
    #[serde(rename = "polite-delay-sec")]
    pub polite_delay_sec: u64,

    /// Regular expressions matched against trimmed block text
    #[serde(rename = "scene-break-patterns")]
    pub scene_break_patterns: Vec<String>,

    /// Rendering used for scene breaks
    #[serde(rename = "scene-break-style")]
    pub scene_break_style: SceneBreakStyle,

    /// Shortest run of consecutive `<br>` collapsed into one scene break
    #[serde(rename = "consecutive-br-threshold")]
    pub consecutive_br_threshold: usize,
}

impl ParserConfig {
    /// Returns the politeness delay applied after each parsed page
    pub fn polite_delay(&self) -> Duration {
        Duration::from_secs(self.polite_delay_sec)
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            selector_candidates: [
                "article .entry-content",
                ".entry-content",
                ".post-content",
                "article",
                ".chapter-content",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            next_texts: ["Next", "Next Chapter", "Next Page", ">>", "»", "→"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_text_len: 50,
            polite_delay_sec: 1,
            scene_break_patterns: [r"^[-_*]{3,}$", r"^\* *\* *\* *$", r"^—+$", r"^†$"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            scene_break_style: SceneBreakStyle::Hr,
            consecutive_br_threshold: 3,
        }
    }
}
