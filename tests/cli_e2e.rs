//! End-to-end CLI tests for the queue-dl binary.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command running in `dir`, isolated from any user config file.
fn queue_dl(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("queue-dl").unwrap();
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .env("HOME", dir.path())
        .env_remove("RUST_LOG");
    cmd
}

/// Test that a run in an empty directory exits 0 without touching state files.
#[test]
fn test_binary_empty_directory_returns_zero() {
    let dir = tempfile::tempdir().unwrap();
    queue_dl(&dir)
        .args(["--ytdlp", "definitely-not-installed-ytdlp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No URLs found in the queue"));

    assert!(!dir.path().join("log.json").exists());
    assert!(!dir.path().join("failed.md").exists());
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("queue-dl").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Download every URL in a queue file"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("queue-dl").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("queue-dl"));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("queue-dl").unwrap();
    cmd.arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

/// Test that -q silences the empty-queue guidance.
#[test]
fn test_binary_quiet_flag_accepted() {
    let dir = tempfile::tempdir().unwrap();
    queue_dl(&dir)
        .arg("-q")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

/// Test that a queue with URLs fails fast when yt-dlp is missing.
#[test]
fn test_binary_missing_fetcher_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("queue.md"), "https://a.test/1\n").unwrap();

    queue_dl(&dir)
        .args(["--ytdlp", "definitely-not-installed-ytdlp"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found"));

    assert!(!dir.path().join("log.json").exists());
}

/// Test that a queue file that is not text aborts with exit code 1.
#[test]
fn test_binary_unreadable_queue_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("queue.md"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

    queue_dl(&dir)
        .args(["--ytdlp", "definitely-not-installed-ytdlp"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot read queue file"));

    assert!(!dir.path().join("log.json").exists());
    assert!(!dir.path().join("failed.md").exists());
}

/// Test that a malformed config file is reported.
#[test]
fn test_binary_invalid_config_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    std::fs::write(&config, "max_retries = many\n").unwrap();

    queue_dl(&dir)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

/// Test the log subcommand on a directory without history.
#[test]
fn test_binary_log_without_history() {
    let dir = tempfile::tempdir().unwrap();
    queue_dl(&dir)
        .arg("log")
        .assert()
        .success()
        .stdout(predicate::str::contains("No download history found"));
}

/// Test that the config subcommand reflects CLI overrides.
#[test]
fn test_binary_config_shows_effective_settings() {
    let dir = tempfile::tempdir().unwrap();
    queue_dl(&dir)
        .args(["config", "-r", "5", "--backoff", "fixed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("queue_file = queue.md"))
        .stdout(predicate::str::contains("max_retries = 5"))
        .stdout(predicate::str::contains("backoff = fixed"))
        .stdout(predicate::str::contains("config_file = not found"));
}

/// Test that values from the default config file location are applied.
#[test]
fn test_binary_config_reads_default_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("xdg").join("queue-dl");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        "# queue-dl settings\nqueue_file = \"todo.md\"\nmax_retries = 4\n",
    )
    .unwrap();

    queue_dl(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("config_file = loaded"))
        .stdout(predicate::str::contains("queue_file = todo.md"))
        .stdout(predicate::str::contains("max_retries = 4"));
}

#[cfg(unix)]
fn write_fake_ytdlp(dir: &Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("fake-yt-dlp");
    std::fs::write(
        &script,
        r#"#!/bin/sh
for last; do :; done
case "$last" in
  *bad*) echo "ERROR: [generic] Video unavailable" >&2; exit 1 ;;
esac
name=$(basename "$last")
echo "downloads/$name/$name.mp4"
"#,
    )
    .unwrap();
    let mut permissions = std::fs::metadata(&script).unwrap().permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&script, permissions).unwrap();
    script
}

/// Full run against a stand-in yt-dlp: one success, one permanent failure.
#[cfg(unix)]
#[test]
fn test_binary_processes_queue_with_fake_ytdlp() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_fake_ytdlp(dir.path());
    std::fs::write(
        dir.path().join("queue.md"),
        "https://a.test/good\nnot a url\n[Broken](https://a.test/bad)\n",
    )
    .unwrap();

    queue_dl(&dir)
        .args(["--retry-delay", "0", "--backoff", "fixed", "--ytdlp"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ https://a.test/good"))
        .stdout(predicate::str::contains("❌ https://a.test/bad"))
        .stdout(predicate::str::contains("Done: 1 succeeded, 1 failed"));

    let history: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("log.json")).unwrap())
            .unwrap();
    let records = history.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["url"], "https://a.test/good");
    assert_eq!(records[0]["outcome"], "success");
    assert_eq!(records[0]["attempts"], 1);
    assert_eq!(records[1]["url"], "https://a.test/bad");
    assert_eq!(records[1]["outcome"], "failure");
    assert_eq!(records[1]["attempts"], 3);
    assert_eq!(records[1]["status_code"], "UNAVAILABLE");

    assert_eq!(
        std::fs::read_to_string(dir.path().join("failed.md")).unwrap(),
        "https://a.test/bad\n"
    );

    queue_dl(&dir)
        .args(["log", "--failed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("UNAVAILABLE"))
        .stdout(predicate::str::contains("https://a.test/bad"));
}
