//! Media download with bounded retries.
//!
//! This module provides the [`DownloadRunner`], which drives queue entries one
//! at a time through a [`MediaFetcher`] and turns each into a terminal
//! [`DownloadOutcome`]. The production fetcher is [`YtDlpFetcher`].
//!
//! # Features
//!
//! - Strictly sequential processing in queue order
//! - Bounded attempts per URL with fixed or exponential backoff
//! - Failure classification (rate limit, age restriction, unavailable)
//! - Per-attempt timeout; the child process is killed on timeout or cancel
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use queue_dl_core::download::{DownloadRunner, RetryPolicy, YtDlpFetcher};
//! use queue_dl_core::parser::QueueEntry;
//!
//! # async fn example() {
//! let runner = DownloadRunner::new(RetryPolicy::with_max_attempts(3));
//! let entry = QueueEntry::new("https://youtu.be/abc123", "https://youtu.be/abc123", 1);
//! let outcome = runner
//!     .download_entry(&entry, &YtDlpFetcher::new(), Path::new("downloads"))
//!     .await;
//! println!("{}: {} attempt(s)", outcome.status_code(), outcome.attempts());
//! # }
//! ```

mod constants;
mod error;
mod fetcher;
mod retry;
mod runner;
mod ytdlp;

pub use constants::{DEFAULT_FETCH_TIMEOUT, DEFAULT_FORMAT, DEFAULT_YTDLP_PROGRAM, OUTPUT_TEMPLATE};
pub use error::FetchError;
pub use fetcher::{FetchedMedia, MediaFetcher};
pub use retry::{
    Backoff, BackoffKind, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY, FailureKind, RetryDecision,
    RetryPolicy, classify_error,
};
pub use runner::{DownloadOutcome, DownloadRunner, EntryState};
pub use ytdlp::YtDlpFetcher;
