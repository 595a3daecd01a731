//! [`MediaFetcher`] backed by the `yt-dlp` executable.
//!
//! Each download spawns one `yt-dlp` process. Media lands under
//! `<destination>/<title>/<title>.<ext>` and the final path is read back from
//! `--print after_move:filepath`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument, trace};

use super::constants::{DEFAULT_FETCH_TIMEOUT, DEFAULT_FORMAT, DEFAULT_YTDLP_PROGRAM, OUTPUT_TEMPLATE};
use super::{FetchError, FetchedMedia, MediaFetcher};

/// Runs `yt-dlp` as a child process.
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    program: PathBuf,
    format: String,
    timeout: Duration,
    write_thumbnail: bool,
}

impl Default for YtDlpFetcher {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_YTDLP_PROGRAM),
            format: DEFAULT_FORMAT.to_string(),
            timeout: DEFAULT_FETCH_TIMEOUT,
            write_thumbnail: true,
        }
    }
}

impl YtDlpFetcher {
    /// Creates a fetcher that runs `yt-dlp` from `PATH` with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a specific executable name or path.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Sets the `-f` format selector.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Sets the per-attempt time limit.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enables or disables `--write-thumbnail`.
    #[must_use]
    pub fn with_thumbnail(mut self, write_thumbnail: bool) -> Self {
        self.write_thumbnail = write_thumbnail;
        self
    }

    /// Returns the configured executable.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command-line arguments for downloading `url` into `destination`.
    #[must_use]
    pub fn build_args(&self, url: &str, destination: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--no-warnings".into(),
            "--no-progress".into(),
            "--newline".into(),
            "-f".into(),
            self.format.clone().into(),
        ];
        if self.write_thumbnail {
            args.push("--write-thumbnail".into());
        }
        args.push("-o".into());
        args.push(destination.join(OUTPUT_TEMPLATE).into_os_string());
        args.push("--print".into());
        args.push("after_move:filepath".into());
        // Keep the URL after "--" so it can never be read as an option.
        args.push("--".into());
        args.push(url.into());
        args
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    #[instrument(skip(self), fields(program = %self.program.display()))]
    async fn preflight(&self) -> Result<(), FetchError> {
        let resolved = which::which(&self.program).map_err(|source| FetchError::NotInstalled {
            program: self.program.display().to_string(),
            source,
        })?;
        debug!(path = %resolved.display(), "found yt-dlp");
        Ok(())
    }

    #[instrument(skip(self, destination), fields(url = %url))]
    async fn download(&self, url: &str, destination: &Path) -> Result<FetchedMedia, FetchError> {
        tokio::fs::create_dir_all(destination)
            .await
            .map_err(|source| FetchError::io(destination, source))?;

        let args = self.build_args(url, destination);
        trace!(?args, "spawning yt-dlp");

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| FetchError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| FetchError::timeout(url, self.timeout))?
            .map_err(|source| FetchError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let message = summarize_failure(&stderr, output.status);
            debug!(status = ?output.status.code(), %message, "yt-dlp failed");
            return Err(FetchError::failed(url, output.status.code(), message));
        }

        let path = last_nonempty_line(&stdout).ok_or_else(|| FetchError::NoOutputPath {
            url: url.to_string(),
        })?;
        Ok(FetchedMedia::new(path))
    }
}

fn last_nonempty_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).rev().find(|line| !line.is_empty())
}

/// Picks the most useful line of a failed run's stderr.
///
/// Prefers the last `ERROR:` line, then the last non-empty line, then the exit status.
fn summarize_failure(stderr: &str, status: ExitStatus) -> String {
    let error_line = stderr
        .lines()
        .map(str::trim)
        .rev()
        .find(|line| line.starts_with("ERROR:"));

    error_line
        .or_else(|| last_nonempty_line(stderr))
        .map_or_else(|| format!("yt-dlp exited with {status}"), str::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn args_as_strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_build_args_defaults() {
        let fetcher = YtDlpFetcher::new();
        let args = args_as_strings(&fetcher.build_args("https://youtu.be/abc", Path::new("downloads")));

        let format_index = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[format_index + 1], "bestvideo+bestaudio/best");
        assert!(args.contains(&"--write-thumbnail".to_string()));

        let output_index = args.iter().position(|a| a == "-o").unwrap();
        assert_eq!(
            PathBuf::from(&args[output_index + 1]),
            Path::new("downloads").join("%(title)s/%(title)s.%(ext)s")
        );

        let print_index = args.iter().position(|a| a == "--print").unwrap();
        assert_eq!(args[print_index + 1], "after_move:filepath");
        assert_eq!(args.last().unwrap(), "https://youtu.be/abc");
        assert_eq!(args[args.len() - 2], "--");
    }

    #[test]
    fn test_build_args_custom_format_without_thumbnail() {
        let fetcher = YtDlpFetcher::new()
            .with_format("bestaudio")
            .with_thumbnail(false);
        let args = args_as_strings(&fetcher.build_args("https://a.test/v", Path::new("/tmp/out")));
        assert!(args.contains(&"bestaudio".to_string()));
        assert!(!args.contains(&"--write-thumbnail".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_summarize_failure_prefers_error_line() {
        use std::os::unix::process::ExitStatusExt;

        let status = ExitStatus::from_raw(1 << 8);
        let stderr = "WARNING: something\nERROR: [youtube] abc: Video unavailable\nsome trailer\n";
        assert_eq!(
            summarize_failure(stderr, status),
            "ERROR: [youtube] abc: Video unavailable"
        );
        assert_eq!(summarize_failure("only line\n", status), "only line");
        assert!(summarize_failure("", status).starts_with("yt-dlp exited with"));
    }

    #[test]
    fn test_last_nonempty_line() {
        assert_eq!(
            last_nonempty_line("[info] x\n/tmp/out/T/T.mp4\n\n"),
            Some("/tmp/out/T/T.mp4")
        );
        assert_eq!(last_nonempty_line("\n  \n"), None);
    }

    #[test]
    fn test_preflight_missing_program() {
        let fetcher = YtDlpFetcher::new().with_program("definitely-not-a-real-yt-dlp-binary");
        let result = tokio_test::block_on(fetcher.preflight());
        assert!(matches!(result, Err(FetchError::NotInstalled { .. })));
    }

    #[test]
    fn test_fetcher_name_and_program() {
        let fetcher = YtDlpFetcher::new().with_program("/opt/yt-dlp");
        assert_eq!(fetcher.name(), "yt-dlp");
        assert_eq!(fetcher.program(), Path::new("/opt/yt-dlp"));
    }
}
