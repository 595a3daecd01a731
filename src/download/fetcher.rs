//! The seam between the runner and whatever actually fetches media.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::FetchError;

/// Result of one successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMedia {
    /// Final path of the downloaded media file.
    pub path: PathBuf,
}

impl FetchedMedia {
    /// Creates a new fetch result.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Downloads the media behind a page URL.
///
/// Implementations perform exactly one attempt per call; retrying is the
/// runner's job.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Returns the fetcher's name (e.g., "yt-dlp").
    fn name(&self) -> &str;

    /// Checks that the fetcher can run at all.
    ///
    /// Called once before the first download of a run. The default accepts.
    async fn preflight(&self) -> Result<(), FetchError> {
        Ok(())
    }

    /// Downloads `url` into `destination`, returning the written file.
    async fn download(&self, url: &str, destination: &Path) -> Result<FetchedMedia, FetchError>;
}
