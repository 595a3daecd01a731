//! Deduplicated list of URLs that exhausted their retries.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::persist::{PersistenceError, ensure_parent, read_optional};

/// Appends failed URLs to a plain-text list, one per line, each at most once.
///
/// Lines are never removed; clearing the list is up to the user.
#[derive(Debug, Clone)]
pub struct FailureRecorder {
    path: PathBuf,
}

impl FailureRecorder {
    /// Creates a recorder for the list at `path`. The file is created on first record.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the list path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Adds `url` unless an identical line (ignoring surrounding whitespace) exists.
    ///
    /// Returns whether a line was added.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] when the list cannot be read or appended to.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn record(&self, url: &str) -> Result<bool, PersistenceError> {
        let url = url.trim();
        let existing = read_optional(&self.path)?.unwrap_or_default();

        if existing.lines().any(|line| line.trim() == url) {
            debug!(url, "already listed");
            return Ok(false);
        }

        let mut line = String::with_capacity(url.len() + 2);
        if !existing.is_empty() && !existing.ends_with('\n') {
            line.push('\n');
        }
        line.push_str(url);
        line.push('\n');

        ensure_parent(&self.path)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| PersistenceError::write(&self.path, err))?;
        file.write_all(line.as_bytes())
            .map_err(|err| PersistenceError::write(&self.path, err))?;

        debug!(url, "failure listed");
        Ok(true)
    }

    /// Returns the listed URLs in file order, blank lines dropped.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Read`] when the list exists but cannot be read.
    pub fn load(&self) -> Result<Vec<String>, PersistenceError> {
        Ok(read_optional(&self.path)?
            .unwrap_or_default()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_record_twice_yields_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failed.md");
        let recorder = FailureRecorder::new(&path);

        assert!(recorder.record("https://a.test/1").unwrap());
        assert!(!recorder.record("https://a.test/1").unwrap());

        assert_eq!(fs::read_to_string(&path).unwrap(), "https://a.test/1\n");
    }

    #[test]
    fn test_record_ignores_surrounding_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failed.md");
        fs::write(&path, "  https://a.test/1  \n").unwrap();

        let recorder = FailureRecorder::new(&path);
        assert!(!recorder.record("https://a.test/1").unwrap());
    }

    #[test]
    fn test_record_repairs_missing_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failed.md");
        fs::write(&path, "https://a.test/0").unwrap();

        let recorder = FailureRecorder::new(&path);
        recorder.record("https://a.test/1").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "https://a.test/0\nhttps://a.test/1\n"
        );
    }

    #[test]
    fn test_load_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = FailureRecorder::new(dir.path().join("sub").join("failed.md"));
        recorder.record("https://a.test/2").unwrap();
        recorder.record("https://a.test/1").unwrap();

        assert_eq!(
            recorder.load().unwrap(),
            vec!["https://a.test/2", "https://a.test/1"]
        );
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = FailureRecorder::new(dir.path().join("failed.md"));
        assert!(recorder.load().unwrap().is_empty());
    }
}
