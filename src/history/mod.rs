//! Run history and failure list persistence.
//!
//! Every terminal [`DownloadOutcome`] becomes one [`HistoryRecord`] in the
//! history log, a JSON array that only ever grows. URLs that ended in failure
//! are also listed, once each, in the failure list (see [`FailureRecorder`]).
//!
//! # Example
//!
//! ```no_run
//! use queue_dl_core::history::HistoryRecorder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let history = HistoryRecorder::new("log.json");
//! for record in history.recent(10, false)? {
//!     println!("{} {} {}", record.timestamp, record.status_code, record.url);
//! }
//! # Ok(())
//! # }
//! ```

mod failures;

pub use failures::FailureRecorder;

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::download::DownloadOutcome;
use crate::persist::{PersistenceError, read_optional, write_atomic};

/// Default number of records shown by history queries.
pub const DEFAULT_HISTORY_LIMIT: u16 = 20;

/// Whether a history record is a success or a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordOutcome {
    /// Download finished successfully.
    Success,
    /// All attempts failed.
    Failure,
}

impl RecordOutcome {
    /// Returns the storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for RecordOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of the history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// When the entry reached its terminal outcome.
    pub timestamp: DateTime<Utc>,
    /// The downloaded URL.
    pub url: String,
    /// Terminal outcome.
    pub outcome: RecordOutcome,
    /// Attempts used.
    pub attempts: u32,
    /// `SUCCESS`, `RATE_LIMIT`, `AGE_LIMIT`, `UNAVAILABLE` or `UNKNOWN_ERROR`.
    pub status_code: String,
    /// Media path on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Last error message on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HistoryRecord {
    /// Returns true for failure records.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.outcome == RecordOutcome::Failure
    }
}

impl From<&DownloadOutcome> for HistoryRecord {
    fn from(outcome: &DownloadOutcome) -> Self {
        match outcome {
            DownloadOutcome::Success {
                url,
                path,
                timestamp,
                attempts,
            } => Self {
                timestamp: *timestamp,
                url: url.clone(),
                outcome: RecordOutcome::Success,
                attempts: *attempts,
                status_code: outcome.status_code().to_string(),
                path: Some(path.display().to_string()),
                error: None,
            },
            DownloadOutcome::Failure {
                url,
                timestamp,
                attempts,
                last_error,
                ..
            } => Self {
                timestamp: *timestamp,
                url: url.clone(),
                outcome: RecordOutcome::Failure,
                attempts: *attempts,
                status_code: outcome.status_code().to_string(),
                path: None,
                error: Some(last_error.clone()),
            },
        }
    }
}

/// Appends outcomes to the history log.
#[derive(Debug, Clone)]
pub struct HistoryRecorder {
    path: PathBuf,
}

impl HistoryRecorder {
    /// Creates a recorder for the log at `path`. The file is created on first append.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the log path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record for `outcome`.
    ///
    /// Existing records are carried over untouched, including ones this tool
    /// does not recognize.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::CorruptHistory`] when the existing log is not
    /// a JSON array (the file is left as it was), or a read/write error.
    #[instrument(skip(self, outcome), fields(path = %self.path.display(), url = %outcome.url()))]
    pub fn append(&self, outcome: &DownloadOutcome) -> Result<(), PersistenceError> {
        let mut records = self.read_raw()?;
        records.push(serde_json::to_value(HistoryRecord::from(outcome))?);

        let mut bytes = serde_json::to_vec_pretty(&records)?;
        bytes.push(b'\n');
        write_atomic(&self.path, &bytes)?;

        debug!(total = records.len(), "history record appended");
        Ok(())
    }

    /// Loads every record, oldest first.
    ///
    /// Entries that do not parse as a [`HistoryRecord`] are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Same as [`HistoryRecorder::append`], minus the write errors.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Vec<HistoryRecord>, PersistenceError> {
        let records = self
            .read_raw()?
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(index, error = %err, "skipping unrecognized history entry");
                    None
                }
            })
            .collect();
        Ok(records)
    }

    /// Returns up to `limit` records, newest first, optionally failures only.
    ///
    /// # Errors
    ///
    /// See [`HistoryRecorder::load`].
    pub fn recent(
        &self,
        limit: usize,
        failures_only: bool,
    ) -> Result<Vec<HistoryRecord>, PersistenceError> {
        Ok(self
            .load()?
            .into_iter()
            .rev()
            .filter(|record| !failures_only || record.is_failure())
            .take(limit)
            .collect())
    }

    fn read_raw(&self) -> Result<Vec<serde_json::Value>, PersistenceError> {
        let Some(text) = read_optional(&self.path)? else {
            return Ok(Vec::new());
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&text).map_err(|source| PersistenceError::CorruptHistory {
            path: self.path.clone(),
            source,
        })
    }
}
