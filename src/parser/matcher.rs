//! Ordered line matchers for queue files.
//!
//! Each matcher recognizes one way of writing a URL on a queue line. They are
//! tried in [`LinkMatcher::PRIORITY`] order and the first match wins; a line no
//! matcher recognizes is skipped.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Markdown inline link, anywhere on the line: `[label](url)` or `[label](url "title")`.
#[allow(clippy::expect_used)]
static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[[^\]]*\]\(\s*((?i:https?)://[^\s)]+)(?:\s+"[^"]*")?\s*\)"#)
        .expect("markdown link regex is valid") // Static pattern, safe to panic
});

/// Angle-bracket autolink occupying the whole line, optionally as a list item.
#[allow(clippy::expect_used)]
static AUTOLINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[-*+]\s+|\d+[.)]\s+)?<((?i:https?)://[^\s<>]+)>$")
        .expect("autolink regex is valid") // Static pattern, safe to panic
});

/// Bare URL occupying the whole line, optionally as a list item.
#[allow(clippy::expect_used)]
static BARE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[-*+]\s+|\d+[.)]\s+)?((?i:https?)://\S+)$")
        .expect("bare URL regex is valid") // Static pattern, safe to panic
});

/// A single way of writing a URL on a queue line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMatcher {
    /// `[label](url)`
    MarkdownLink,
    /// `<url>`
    Autolink,
    /// `url`
    BareUrl,
}

impl LinkMatcher {
    /// Matchers in the order they are tried.
    pub const PRIORITY: [Self; 3] = [Self::MarkdownLink, Self::Autolink, Self::BareUrl];

    /// Returns the URL candidate this matcher finds in `line`, if any.
    ///
    /// `line` is expected to be trimmed.
    #[must_use]
    pub fn extract(self, line: &str) -> Option<&str> {
        let pattern = match self {
            Self::MarkdownLink => &MARKDOWN_LINK,
            Self::Autolink => &AUTOLINK,
            Self::BareUrl => &BARE_URL,
        };
        pattern
            .captures(line)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
    }
}

impl fmt::Display for LinkMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MarkdownLink => write!(f, "markdown link"),
            Self::Autolink => write!(f, "autolink"),
            Self::BareUrl => write!(f, "bare URL"),
        }
    }
}

/// Runs the matchers in priority order; the first one that recognizes the line wins.
#[must_use]
pub fn match_line(line: &str) -> Option<(LinkMatcher, &str)> {
    LinkMatcher::PRIORITY
        .into_iter()
        .find_map(|matcher| matcher.extract(line).map(|candidate| (matcher, candidate)))
}
