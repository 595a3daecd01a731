//! Sequential download runner with bounded retries.
//!
//! The [`DownloadRunner`] takes queue entries one at a time and drives each
//! through its [`EntryState`] machine until it reaches a terminal
//! [`DownloadOutcome`]. Only one entry is in flight at any moment.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use queue_dl_core::download::{DownloadRunner, RetryPolicy, YtDlpFetcher};
//! use queue_dl_core::parser::parse_queue;
//!
//! # async fn example() {
//! let load = parse_queue("https://youtu.be/abc123\n");
//! let runner = DownloadRunner::new(RetryPolicy::default());
//! let outcomes = runner
//!     .run(&load.entries, &YtDlpFetcher::new(), Path::new("downloads"))
//!     .await;
//! for outcome in outcomes {
//!     println!("{} -> {}", outcome.url(), outcome.status_code());
//! }
//! # }
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use super::retry::{FailureKind, RetryDecision, RetryPolicy, classify_error};
use super::{FetchError, MediaFetcher};
use crate::parser::QueueEntry;

/// Terminal result of processing one queue entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The fetcher produced a file.
    Success {
        /// The entry's URL.
        url: String,
        /// Where the media was written.
        path: PathBuf,
        /// When the entry finished.
        timestamp: DateTime<Utc>,
        /// Attempts used, including the successful one.
        attempts: u32,
    },
    /// Every attempt failed.
    Failure {
        /// The entry's URL.
        url: String,
        /// When the entry finished.
        timestamp: DateTime<Utc>,
        /// Attempts used (the policy's maximum).
        attempts: u32,
        /// Message of the last attempt's error.
        last_error: String,
        /// Classification of the last error.
        kind: FailureKind,
    },
}

impl DownloadOutcome {
    /// The entry's URL.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Success { url, .. } | Self::Failure { url, .. } => url,
        }
    }

    /// Number of attempts made.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. } | Self::Failure { attempts, .. } => *attempts,
        }
    }

    /// Attempts beyond the first.
    #[must_use]
    pub fn retries(&self) -> u32 {
        self.attempts().saturating_sub(1)
    }

    /// When the entry reached this outcome.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Success { timestamp, .. } | Self::Failure { timestamp, .. } => *timestamp,
        }
    }

    /// Returns true for [`DownloadOutcome::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// History status code: `SUCCESS` or the failure kind's code.
    #[must_use]
    pub fn status_code(&self) -> &'static str {
        match self {
            Self::Success { .. } => "SUCCESS",
            Self::Failure { kind, .. } => kind.status_code(),
        }
    }
}

/// Lifecycle of one entry inside the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Not yet attempted.
    Pending,
    /// Attempt `n` (1-indexed) is running.
    Attempting(u32),
    /// An attempt succeeded.
    Succeeded,
    /// The attempt budget is spent.
    Failed,
}

impl EntryState {
    /// Starts the first attempt.
    #[must_use]
    pub fn start(self) -> Self {
        match self {
            Self::Pending => Self::Attempting(1),
            other => other,
        }
    }

    /// Transition after the current attempt succeeded.
    #[must_use]
    pub fn on_success(self) -> Self {
        match self {
            Self::Attempting(_) => Self::Succeeded,
            other => other,
        }
    }

    /// Transition after the current attempt failed, per the retry decision.
    #[must_use]
    pub fn on_failure(self, decision: &RetryDecision) -> Self {
        match (self, decision) {
            (Self::Attempting(_), RetryDecision::Retry { attempt, .. }) => {
                Self::Attempting(*attempt)
            }
            (Self::Attempting(_), RetryDecision::DoNotRetry { .. }) => Self::Failed,
            (other, _) => other,
        }
    }

    /// Returns true once no further attempts will be made.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Runs entries through a [`MediaFetcher`] with bounded retries.
#[derive(Debug, Clone, Default)]
pub struct DownloadRunner {
    policy: RetryPolicy,
}

impl DownloadRunner {
    /// Creates a runner with the given retry policy.
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Processes `entries` in order and returns one outcome per entry.
    ///
    /// Fetcher errors never abort the run; they become [`DownloadOutcome::Failure`].
    #[instrument(skip(self, entries, fetcher), fields(count = entries.len(), destination = %destination.display()))]
    pub async fn run(
        &self,
        entries: &[QueueEntry],
        fetcher: &dyn MediaFetcher,
        destination: &Path,
    ) -> Vec<DownloadOutcome> {
        let mut outcomes = Vec::with_capacity(entries.len());
        for entry in entries {
            outcomes.push(self.download_entry(entry, fetcher, destination).await);
        }
        outcomes
    }

    /// Drives one entry to a terminal outcome.
    #[instrument(skip(self, entry, fetcher, destination), fields(url = %entry.url, line = entry.line))]
    pub async fn download_entry(
        &self,
        entry: &QueueEntry,
        fetcher: &dyn MediaFetcher,
        destination: &Path,
    ) -> DownloadOutcome {
        let mut state = EntryState::Pending.start();
        let mut fetched = None;
        let mut last_error: Option<FetchError> = None;

        while let EntryState::Attempting(attempt) = state {
            debug!(attempt, fetcher = fetcher.name(), "attempting download");

            match fetcher.download(&entry.url, destination).await {
                Ok(media) => {
                    state = state.on_success();
                    fetched = Some((media, attempt));
                }
                Err(error) => {
                    let decision = self.policy.should_retry(attempt);
                    state = state.on_failure(&decision);
                    match &decision {
                        RetryDecision::Retry {
                            delay,
                            attempt: next_attempt,
                        } => {
                            warn!(
                                attempt = *next_attempt,
                                max_attempts = self.policy.max_attempts(),
                                delay_ms = delay.as_millis(),
                                error = %error,
                                "retrying download"
                            );
                            tokio::time::sleep(*delay).await;
                        }
                        RetryDecision::DoNotRetry { reason } => {
                            debug!(%reason, "not retrying download");
                        }
                    }
                    last_error = Some(error);
                }
            }
        }

        if let Some((media, attempts)) = fetched {
            info!(attempts, path = %media.path.display(), "download succeeded");
            return DownloadOutcome::Success {
                url: entry.url.clone(),
                path: media.path,
                timestamp: Utc::now(),
                attempts,
            };
        }

        let (message, kind) = last_error.map_or_else(
            || ("no attempt was made".to_string(), FailureKind::Unknown),
            |e| (e.to_string(), classify_error(&e.reason())),
        );
        warn!(
            attempts = self.policy.max_attempts(),
            status = kind.status_code(),
            error = %message,
            "download failed"
        );
        DownloadOutcome::Failure {
            url: entry.url.clone(),
            timestamp: Utc::now(),
            attempts: self.policy.max_attempts(),
            last_error: message,
            kind,
        }
    }
}
