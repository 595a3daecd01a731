//! Shared file persistence helpers for the run records.
//!
//! Recorders take paths, not handles: every call opens, writes and closes its
//! file, so nothing stays open between entries.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::trace;

/// Errors reading or writing the history log or failure list.
///
/// All of these are fatal for a run.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The file exists but could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The file could not be written.
    #[error("cannot write {path}: {source}")]
    Write {
        /// File that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The history log is not a JSON array.
    #[error(
        "history log {path} is not a JSON array: {source}\n  Suggestion: move the file aside and rerun; it will be recreated"
    )]
    CorruptHistory {
        /// The offending history file.
        path: PathBuf,
        /// The parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be serialized.
    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PersistenceError {
    pub(crate) fn read(path: &Path, source: io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn write(path: &Path, source: io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Reads `path` as text; a missing file reads as `None`.
pub(crate) fn read_optional(path: &Path) -> Result<Option<String>, PersistenceError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(PersistenceError::read(path, err)),
    }
}

/// Creates the parent directory of `path` if it has one.
pub(crate) fn ensure_parent(path: &Path) -> Result<(), PersistenceError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|err| PersistenceError::write(parent, err))
        }
        _ => Ok(()),
    }
}

/// Replaces `path` with `bytes` via a temporary sibling and a rename.
///
/// Readers see either the old content or the new content, never a partial write.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
    ensure_parent(path)?;
    let tmp = temp_sibling(path);

    let result = (|| -> io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if let Err(err) = result {
        // Best-effort cleanup so a stale temp file does not linger.
        let _ = fs::remove_file(&tmp);
        return Err(PersistenceError::write(path, err));
    }

    trace!(path = %path.display(), bytes = bytes.len(), "file replaced");
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "records".into(), |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!(".{name}.tmp"))
}
