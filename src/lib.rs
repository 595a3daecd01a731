//! Queue-dl Core Library
//!
//! This library provides the core functionality for the queue-dl tool, which
//! works through a plain-text queue of media page URLs, downloads each one with
//! an external fetcher (`yt-dlp`), and keeps a persistent record of every
//! outcome.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - Queue file parsing (bare URLs, markdown links, autolinks)
//! - [`download`] - Fetcher seam, `yt-dlp` fetcher, retrying runner
//! - [`history`] - JSON history log and deduplicated failure list
//! - [`run`] - One full pass over the queue

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod history;
pub mod parser;
mod persist;
pub mod run;

// Re-export commonly used types
pub use download::{
    Backoff, BackoffKind, DEFAULT_MAX_RETRIES, DownloadOutcome, DownloadRunner, FailureKind,
    FetchError, MediaFetcher, RetryDecision, RetryPolicy, YtDlpFetcher, classify_error,
};
pub use history::{FailureRecorder, HistoryRecord, HistoryRecorder, RecordOutcome};
pub use parser::{QueueEntry, QueueError, QueueLoad, QueueStore, load_queue, parse_queue};
pub use persist::PersistenceError;
pub use run::{NoopObserver, RunError, RunObserver, RunSummary, Settings, process_queue};
