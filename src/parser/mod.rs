//! Queue file parsing.
//!
//! A queue file is plain text with one URL per line. Each line may be written as
//! a bare URL, a markdown link `[label](url)`, or an autolink `<url>`, optionally
//! as a markdown list item. Blank lines and `#` comment lines are ignored; any
//! other line that yields no valid URL is skipped and reported, never fatal.
//!
//! # Example
//!
//! ```
//! use queue_dl_core::parser::parse_queue;
//!
//! let load = parse_queue("https://a.test/1\nnot a url\n[Video](https://a.test/2)\n");
//! let urls: Vec<_> = load.urls().collect();
//! assert_eq!(urls, vec!["https://a.test/1", "https://a.test/2"]);
//! assert_eq!(load.skipped_count(), 1);
//! ```

mod error;
mod input;
mod matcher;
mod url;

pub use error::{MAX_URL_LENGTH, ParseError, QueueError};
pub use input::{QueueEntry, QueueLoad, SkippedLine};
pub use matcher::{LinkMatcher, match_line};

use std::collections::HashMap;
use std::io;
use std::path::Path;

use tracing::{debug, info, instrument, trace};

use self::url::{host_allowed, validate_url};

/// Loads and parses queue files.
#[derive(Debug, Clone, Default)]
pub struct QueueStore {
    allowed_hosts: Vec<String>,
}

impl QueueStore {
    /// Creates a store that accepts URLs on any host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts queued URLs to the given hosts and their subdomains.
    /// An empty list accepts every host.
    #[must_use]
    pub fn with_allowed_hosts(mut self, hosts: Vec<String>) -> Self {
        self.allowed_hosts = hosts;
        self
    }

    /// Reads and parses the queue file at `path`.
    ///
    /// A missing file is treated as an empty queue.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Unreadable`] when the file exists but cannot be read
    /// as UTF-8 text.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn load(&self, path: &Path) -> Result<QueueLoad, QueueError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!("queue file does not exist, treating as empty");
                return Ok(QueueLoad::new());
            }
            Err(source) => {
                return Err(QueueError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Ok(self.parse(&text))
    }

    /// Parses queue text into entries, preserving line order.
    #[must_use]
    pub fn parse(&self, input: &str) -> QueueLoad {
        let mut load = QueueLoad::new();
        let mut first_seen: HashMap<String, usize> = HashMap::new();

        for (index, raw_line) in input.lines().enumerate() {
            let line_number = index + 1;
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match self.parse_line(line) {
                Ok(url) => {
                    if let Some(&first_line) = first_seen.get(&url) {
                        load.skipped.push(SkippedLine {
                            line: line_number,
                            raw: line.to_string(),
                            reason: ParseError::Duplicate { url, first_line },
                        });
                        continue;
                    }
                    trace!(line = line_number, url = %url, "queued");
                    first_seen.insert(url.clone(), line_number);
                    load.entries.push(QueueEntry::new(url, line, line_number));
                }
                Err(reason) => {
                    debug!(line = line_number, %reason, "skipping queue line");
                    load.skipped.push(SkippedLine {
                        line: line_number,
                        raw: line.to_string(),
                        reason,
                    });
                }
            }
        }

        info!(
            entries = load.len(),
            skipped = load.skipped_count(),
            "Parsing complete"
        );
        load
    }

    fn parse_line(&self, line: &str) -> Result<String, ParseError> {
        let (matcher, candidate) = match_line(line).ok_or(ParseError::NoUrl)?;
        trace!(%matcher, candidate, "line matched");
        let url = validate_url(candidate)?;
        if !host_allowed(&url, &self.allowed_hosts) {
            return Err(ParseError::HostNotAllowed {
                host: url.host_str().unwrap_or_default().to_string(),
                url: url.into(),
            });
        }
        Ok(url.into())
    }
}

/// Parses queue text with the default [`QueueStore`] (no host filter).
#[must_use]
pub fn parse_queue(input: &str) -> QueueLoad {
    QueueStore::new().parse(input)
}

/// Loads a queue file with the default [`QueueStore`] (no host filter).
///
/// # Errors
///
/// See [`QueueStore::load`].
pub fn load_queue(path: &Path) -> Result<QueueLoad, QueueError> {
    QueueStore::new().load(path)
}
