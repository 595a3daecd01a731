//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args as ClapArgs, Parser, Subcommand};
use queue_dl_core::BackoffKind;
use queue_dl_core::history::DEFAULT_HISTORY_LIMIT;

/// Download every URL in a queue file with yt-dlp.
///
/// Reads the queue (bare URLs or markdown links, one per line), downloads each
/// entry with bounded retries, appends every outcome to a JSON history log,
/// and lists URLs that kept failing in a separate file.
#[derive(Parser, Debug)]
#[command(name = "queue-dl")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Queue file to read [default: queue.md]
    #[arg(long, value_name = "FILE", global = true)]
    pub queue: Option<PathBuf>,

    /// History log (JSON array) [default: log.json]
    #[arg(long, value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// File that collects URLs which failed every attempt [default: failed.md]
    #[arg(long, value_name = "FILE", global = true)]
    pub failed_file: Option<PathBuf>,

    /// Directory to download into [default: downloads]
    #[arg(short = 'o', long, value_name = "DIR", global = true)]
    pub output_dir: Option<PathBuf>,

    /// Attempts per URL, including the first (1-10) [default: 3]
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u32).range(1..=10), global = true)]
    pub max_retries: Option<u32>,

    /// Base delay between attempts in seconds (0-3600) [default: 5]
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(0..=3600), global = true)]
    pub retry_delay: Option<u64>,

    /// Delay growth between attempts: fixed or exponential [default: exponential]
    #[arg(long, value_parser = BackoffKind::from_str, global = true)]
    pub backoff: Option<BackoffKind>,

    /// yt-dlp format selector [default: bestvideo+bestaudio/best]
    #[arg(short = 'f', long, global = true)]
    pub format: Option<String>,

    /// yt-dlp executable name or path [default: yt-dlp]
    #[arg(long, value_name = "PATH", global = true)]
    pub ytdlp: Option<PathBuf>,

    /// Per-attempt time limit in seconds (1-86400) [default: 3600]
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=86_400), global = true)]
    pub fetch_timeout: Option<u64>,

    /// Only queue URLs on this host or its subdomains (repeatable)
    #[arg(long = "allow-host", value_name = "HOST", global = true)]
    pub allow_hosts: Vec<String>,

    /// Config file [default: $XDG_CONFIG_HOME/queue-dl/config.toml]
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands. Without one, the queue is processed.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show recent entries of the history log
    Log(LogArgs),
    /// Show the effective configuration and where it came from
    Config,
}

/// Arguments for the `log` subcommand.
#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
pub struct LogArgs {
    /// Only show failures
    #[arg(long)]
    pub failed: bool,

    /// Maximum number of records to show, newest first (1-10000)
    #[arg(short = 'n', long, default_value_t = DEFAULT_HISTORY_LIMIT, value_parser = clap::value_parser!(u16).range(1..=10_000))]
    pub limit: u16,
}
