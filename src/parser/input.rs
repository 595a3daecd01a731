//! Types representing parsed queue entries and results.

use std::fmt;

use super::ParseError;

/// A single URL queued for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    /// Normalized, validated http(s) URL
    pub url: String,
    /// Trimmed source line the URL came from
    pub raw: String,
    /// 1-based line number in the queue file
    pub line: usize,
}

impl QueueEntry {
    /// Creates a new queue entry.
    #[must_use]
    pub fn new(url: impl Into<String>, raw: impl Into<String>, line: usize) -> Self {
        Self {
            url: url.into(),
            raw: raw.into(),
            line,
        }
    }
}

impl fmt::Display for QueueEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// A queue line that held content but produced no entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number
    pub line: usize,
    /// Trimmed line content
    pub raw: String,
    /// Why the line was skipped
    pub reason: ParseError,
}

/// Entries and skipped lines from one queue file, both in file order.
#[derive(Debug, Default)]
pub struct QueueLoad {
    /// Entries to download
    pub entries: Vec<QueueEntry>,
    /// Lines that could not be turned into entries (for logging)
    pub skipped: Vec<SkippedLine>,
}

impl QueueLoad {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no entries were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns count of parsed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns count of skipped lines.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Iterates over the queued URLs in order.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.url.as_str())
    }
}

impl fmt::Display for QueueLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parsed {} entries ({} skipped)",
            self.entries.len(),
            self.skipped.len()
        )
    }
}
