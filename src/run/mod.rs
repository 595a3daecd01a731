//! One pass over the queue: load, download, record.
//!
//! [`process_queue`] wires the queue loader, the [`DownloadRunner`] and the two
//! recorders together. Each outcome is written to the history log (and, for
//! failures, the failure list) as soon as the entry finishes, so an interrupted
//! run keeps everything it completed.

mod settings;

pub use settings::{
    DEFAULT_FAILED_FILE, DEFAULT_LOG_FILE, DEFAULT_OUTPUT_DIR, DEFAULT_QUEUE_FILE, Settings,
};

use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::download::{DownloadOutcome, DownloadRunner, FailureKind, FetchError, MediaFetcher};
use crate::history::{FailureRecorder, HistoryRecorder};
use crate::parser::{QueueEntry, QueueError};
use crate::persist::PersistenceError;

/// Fatal errors that stop a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// The queue file exists but cannot be read.
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// History log or failure list could not be updated.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// The fetcher cannot run at all.
    #[error(transparent)]
    FetcherUnavailable(#[from] FetchError),

    /// The download directory could not be created.
    #[error("cannot create download directory {path}: {source}")]
    OutputDir {
        /// Directory that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// A URL that ended the run in failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFailure {
    /// The failed URL.
    pub url: String,
    /// Classification of its last error.
    pub kind: FailureKind,
    /// Its last error message.
    pub error: String,
}

/// Counts from a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Entries queued for download.
    pub queued: usize,
    /// Entries that succeeded.
    pub succeeded: usize,
    /// Non-comment lines that produced no entry.
    pub skipped_lines: usize,
    /// Attempts beyond the first, across all entries.
    pub retries: u32,
    /// URLs added to the failure list by this run.
    pub newly_listed: usize,
    /// Failed entries, in queue order.
    pub failures: Vec<RunFailure>,
}

impl RunSummary {
    /// Number of entries that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Entries processed so far.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed()
    }

    fn record(&mut self, outcome: &DownloadOutcome) {
        self.retries += outcome.retries();
        match outcome {
            DownloadOutcome::Success { .. } => self.succeeded += 1,
            DownloadOutcome::Failure {
                url,
                last_error,
                kind,
                ..
            } => self.failures.push(RunFailure {
                url: url.clone(),
                kind: *kind,
                error: last_error.clone(),
            }),
        }
    }
}

/// Hooks for presenting run progress. All methods default to doing nothing.
pub trait RunObserver: Send + Sync {
    /// Called once the queue is loaded and non-empty.
    fn on_start(&self, _total: usize) {}

    /// Called before the first attempt of entry `index` (0-based).
    fn on_entry_start(&self, _index: usize, _entry: &QueueEntry) {}

    /// Called after the outcome of entry `index` has been recorded.
    fn on_outcome(&self, _index: usize, _outcome: &DownloadOutcome) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Processes the whole queue once.
///
/// Per-URL failures never stop the run; they are recorded and counted.
///
/// # Errors
///
/// Returns [`RunError`] when the queue cannot be read, the fetcher is not
/// usable, or an outcome cannot be persisted.
#[instrument(skip_all, fields(queue = %settings.queue_file.display(), fetcher = fetcher.name()))]
pub async fn process_queue(
    settings: &Settings,
    fetcher: &dyn MediaFetcher,
    observer: &dyn RunObserver,
) -> Result<RunSummary, RunError> {
    std::fs::create_dir_all(&settings.output_dir).map_err(|source| RunError::OutputDir {
        path: settings.output_dir.clone(),
        source,
    })?;

    let load = settings.queue_store().load(&settings.queue_file)?;
    for skipped in &load.skipped {
        warn!(line = skipped.line, content = %skipped.raw, reason = %skipped.reason, "skipping queue line");
    }

    let mut summary = RunSummary {
        queued: load.len(),
        skipped_lines: load.skipped_count(),
        ..RunSummary::default()
    };

    if load.is_empty() {
        info!("no URLs found in queue");
        return Ok(summary);
    }

    fetcher.preflight().await?;

    let runner = DownloadRunner::new(settings.retry_policy());
    let history = HistoryRecorder::new(&settings.log_file);
    let failures = FailureRecorder::new(&settings.failed_file);

    info!(
        total = load.len(),
        max_attempts = runner.retry_policy().max_attempts(),
        "starting queue processing"
    );
    observer.on_start(load.len());

    for (index, entry) in load.entries.iter().enumerate() {
        observer.on_entry_start(index, entry);
        let outcome = runner
            .download_entry(entry, fetcher, &settings.output_dir)
            .await;

        // Every failure in history must also be on the failure list.
        if !outcome.is_success() && failures.record(outcome.url())? {
            summary.newly_listed += 1;
        }
        history.append(&outcome)?;

        summary.record(&outcome);
        observer.on_outcome(index, &outcome);
    }

    info!(
        succeeded = summary.succeeded,
        failed = summary.failed(),
        retries = summary.retries,
        "queue processing complete"
    );
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_summary_record_counts() {
        let mut summary = RunSummary::default();
        summary.record(&DownloadOutcome::Success {
            url: "https://a.test/2".to_string(),
            path: PathBuf::from("x.mp4"),
            timestamp: Utc::now(),
            attempts: 2,
        });
        summary.record(&DownloadOutcome::Failure {
            url: "https://a.test/1".to_string(),
            timestamp: Utc::now(),
            attempts: 3,
            last_error: "boom".to_string(),
            kind: FailureKind::Unknown,
        });

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.processed(), 2);
        assert_eq!(summary.retries, 3);
        assert_eq!(summary.failures[0].url, "https://a.test/1");
    }

    #[test]
    fn test_run_error_display_is_transparent() {
        let err = RunError::from(PersistenceError::Serialize(
            serde_json::from_str::<u8>("x").unwrap_err(),
        ));
        assert!(err.to_string().starts_with("JSON serialization error"));
    }
}
