//! Constants for the download module (fetcher defaults, timeouts).

use std::time::Duration;

/// Executable looked up on `PATH` when no explicit fetcher path is configured.
pub const DEFAULT_YTDLP_PROGRAM: &str = "yt-dlp";

/// Default `yt-dlp` format selector: best video plus best audio, else best single file.
pub const DEFAULT_FORMAT: &str = "bestvideo+bestaudio/best";

/// Output template relative to the download directory: one folder per title.
pub const OUTPUT_TEMPLATE: &str = "%(title)s/%(title)s.%(ext)s";

/// Per-attempt time limit for one fetcher run (1 hour for long videos).
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(3600);
