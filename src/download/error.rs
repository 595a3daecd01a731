//! Error types for the download module.
//!
//! A [`FetchError`] describes one failed attempt. The runner retries it, so
//! these errors never escape a queue run; they end up as the `last_error` of a
//! terminal failure.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during a single media download attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The fetcher executable could not be found.
    #[error("{program} not found: {source}\n  Suggestion: install it with `pip install yt-dlp` or pass --ytdlp <path>")]
    NotInstalled {
        /// Program name or path that was looked up.
        program: String,
        /// The lookup failure.
        #[source]
        source: which::Error,
    },

    /// The fetcher process could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The fetcher ran and reported failure.
    #[error("download failed for {url}: {message}")]
    Failed {
        /// The URL that failed.
        url: String,
        /// Process exit code, when the process exited normally.
        status: Option<i32>,
        /// Most relevant error text reported by the fetcher.
        message: String,
    },

    /// The attempt did not finish in time.
    #[error("timeout downloading {url} after {}s", .after.as_secs())]
    Timeout {
        /// The URL that timed out.
        url: String,
        /// The configured limit.
        after: Duration,
    },

    /// The fetcher succeeded but did not report where it wrote the file.
    #[error("download of {url} finished without reporting an output file")]
    NoOutputPath {
        /// The URL that was downloaded.
        url: String,
    },

    /// File system error preparing the destination.
    #[error("IO error preparing {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Creates a fetcher-reported failure.
    pub fn failed(url: impl Into<String>, status: Option<i32>, message: impl Into<String>) -> Self {
        Self::Failed {
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            url: url.into(),
            after,
        }
    }

    /// Failure text without the URL, for classifying what went wrong.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Failed { message, .. } => message.clone(),
            Self::Timeout { after, .. } => format!("timeout after {}s", after.as_secs()),
            Self::NoOutputPath { .. } => "finished without reporting an output file".to_string(),
            Self::Io { source, .. } => format!("IO error: {source}"),
            Self::NotInstalled { .. } | Self::Spawn { .. } => self.to_string(),
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
