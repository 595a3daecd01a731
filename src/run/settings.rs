//! Resolved runtime configuration for one queue run.

use std::path::PathBuf;
use std::time::Duration;

use crate::download::{
    Backoff, BackoffKind, DEFAULT_FETCH_TIMEOUT, DEFAULT_FORMAT, DEFAULT_MAX_RETRIES,
    DEFAULT_RETRY_DELAY, DEFAULT_YTDLP_PROGRAM, RetryPolicy, YtDlpFetcher,
};
use crate::parser::QueueStore;

/// Default queue file.
pub const DEFAULT_QUEUE_FILE: &str = "queue.md";

/// Default failure list.
pub const DEFAULT_FAILED_FILE: &str = "failed.md";

/// Default history log.
pub const DEFAULT_LOG_FILE: &str = "log.json";

/// Default download directory.
pub const DEFAULT_OUTPUT_DIR: &str = "downloads";

/// Everything a run needs, after CLI/config/default resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Queue file to read.
    pub queue_file: PathBuf,
    /// History log (JSON array).
    pub log_file: PathBuf,
    /// Failure list (one URL per line).
    pub failed_file: PathBuf,
    /// Directory media is downloaded into.
    pub output_dir: PathBuf,
    /// Attempts per URL, including the first.
    pub max_retries: u32,
    /// Base delay between attempts.
    pub retry_delay: Duration,
    /// Shape of the delay between attempts.
    pub backoff: BackoffKind,
    /// `yt-dlp` format selector.
    pub format: String,
    /// `yt-dlp` executable name or path.
    pub ytdlp: PathBuf,
    /// Per-attempt time limit.
    pub fetch_timeout: Duration,
    /// Hosts URLs must belong to; empty accepts all.
    pub allowed_hosts: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            queue_file: PathBuf::from(DEFAULT_QUEUE_FILE),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            failed_file: PathBuf::from(DEFAULT_FAILED_FILE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            backoff: BackoffKind::default(),
            format: DEFAULT_FORMAT.to_string(),
            ytdlp: PathBuf::from(DEFAULT_YTDLP_PROGRAM),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            allowed_hosts: Vec::new(),
        }
    }
}

impl Settings {
    /// Retry policy for the configured attempts and backoff.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Backoff::from_kind(self.backoff, self.retry_delay),
        )
    }

    /// Queue loader honoring the host filter.
    #[must_use]
    pub fn queue_store(&self) -> QueueStore {
        QueueStore::new().with_allowed_hosts(self.allowed_hosts.clone())
    }

    /// The `yt-dlp` fetcher for these settings.
    #[must_use]
    pub fn fetcher(&self) -> YtDlpFetcher {
        YtDlpFetcher::new()
            .with_program(self.ytdlp.clone())
            .with_format(self.format.clone())
            .with_timeout(self.fetch_timeout)
    }
}
