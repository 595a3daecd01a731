//! Error types for queue parsing operations.

use std::path::PathBuf;

use thiserror::Error;

/// Maximum URL length to accept (standard browser limit).
/// URLs longer than this are rejected to prevent memory issues.
pub const MAX_URL_LENGTH: usize = 2000;

/// Errors for a single queue line. Always recovered locally: the line is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Line did not match any URL pattern.
    #[error("no URL found in line")]
    NoUrl,

    /// URL is malformed or uses unsupported scheme
    #[error("invalid URL '{url}': {reason}\n  Suggestion: {suggestion}")]
    InvalidUrl {
        /// The URL that failed validation
        url: String,
        /// Why the URL is invalid
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// URL exceeds maximum allowed length
    #[error(
        "URL too long ({length} chars, max {max}): {url_preview}...\n  Suggestion: Use a URL shortener or check for extraneous content"
    )]
    UrlTooLong {
        /// Truncated URL for display
        url_preview: String,
        /// Actual length
        length: usize,
        /// Maximum allowed
        max: usize,
    },

    /// URL host is not in the configured allow list.
    #[error("host '{host}' is not in the allowed hosts list: {url}")]
    HostNotAllowed {
        /// The rejected URL
        url: String,
        /// Its host
        host: String,
    },

    /// URL already appeared earlier in the same queue file.
    #[error("duplicate of line {first_line}: {url}")]
    Duplicate {
        /// The repeated URL
        url: String,
        /// Line number of the first occurrence
        first_line: usize,
    },
}

impl ParseError {
    /// Creates an `InvalidUrl` error for a non-web URL scheme.
    #[must_use]
    pub fn unsupported_scheme(url: &str, scheme: &str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: format!("scheme '{scheme}' is not supported"),
            suggestion: "Use http:// or https:// URLs".to_string(),
        }
    }

    /// Creates an `InvalidUrl` error for a malformed URL.
    #[must_use]
    pub fn malformed(url: &str, parse_error: &str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: parse_error.to_string(),
            suggestion: "Check the URL format and try again".to_string(),
        }
    }

    /// Creates an `InvalidUrl` error for a URL without a host.
    #[must_use]
    pub fn no_host(url: &str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: "URL has no host".to_string(),
            suggestion: "Ensure the URL includes a domain (e.g., youtube.com)".to_string(),
        }
    }

    /// Creates a `UrlTooLong` error for URLs exceeding the maximum length.
    #[must_use]
    pub fn too_long(url: &str) -> Self {
        Self::UrlTooLong {
            url_preview: url.chars().take(50).collect(),
            length: url.len(),
            max: MAX_URL_LENGTH,
        }
    }
}

/// Fatal queue errors: the queue file exists but cannot be read as text.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Reading the file failed (permissions, not UTF-8, is a directory, ...).
    #[error("cannot read queue file {path}: {source}")]
    Unreadable {
        /// Queue file path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_unsupported_scheme_message() {
        let err = ParseError::unsupported_scheme("ftp://example.com", "ftp");
        let msg = err.to_string();
        assert!(msg.contains("ftp://example.com"), "should contain URL");
        assert!(msg.contains("ftp"), "should contain scheme");
        assert!(msg.contains("http://"), "suggestion should mention http");
    }

    #[test]
    fn test_parse_error_malformed_message() {
        let err = ParseError::malformed("not-a-url", "relative URL without a base");
        let msg = err.to_string();
        assert!(msg.contains("not-a-url"));
        assert!(msg.contains("relative URL"));
        assert!(msg.contains("Check the URL format"));
    }

    #[test]
    fn test_parse_error_too_long_message() {
        let long_url = "https://example.com/".to_string() + &"a".repeat(2500);
        let err = ParseError::too_long(&long_url);
        let msg = err.to_string();
        assert!(msg.contains("too long"));
        assert!(msg.contains("2000"));
    }

    #[test]
    fn test_parse_error_duplicate_mentions_first_line() {
        let err = ParseError::Duplicate {
            url: "https://youtu.be/abc".to_string(),
            first_line: 4,
        };
        assert_eq!(err.to_string(), "duplicate of line 4: https://youtu.be/abc");
    }

    #[test]
    fn test_queue_error_mentions_path() {
        let err = QueueError::Unreadable {
            path: PathBuf::from("/tmp/queue.md"),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "stream did not contain valid UTF-8"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/queue.md"));
        assert!(msg.contains("UTF-8"));
    }
}
