//! Merges CLI flags, the config file and built-in defaults into [`Settings`].
//!
//! Precedence: CLI > config file > defaults.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use queue_dl_core::Settings;

use crate::app_config::{FileConfig, LoadedConfig, VerbositySetting, load_config};
use crate::cli::Args;

#[derive(Debug, Clone)]
pub(crate) struct ResolvedConfig {
    pub(crate) settings: Settings,
    pub(crate) verbosity: VerbositySetting,
    /// True when -v/-q on the command line should override `RUST_LOG`.
    pub(crate) force_cli_log_level: bool,
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) loaded_from_file: bool,
}

pub(crate) fn resolve_config(args: &Args) -> Result<ResolvedConfig> {
    let LoadedConfig { path, config } = load_config(args.config.as_deref())?;
    let loaded_from_file = config.is_some();
    let file = config.unwrap_or_default();

    Ok(ResolvedConfig {
        settings: merge_settings(args, &file),
        verbosity: resolve_verbosity(args, &file),
        force_cli_log_level: args.quiet || args.verbose > 0,
        config_path: path,
        loaded_from_file,
    })
}

pub(crate) fn merge_settings(args: &Args, file: &FileConfig) -> Settings {
    let defaults = Settings::default();

    let allowed_hosts = if args.allow_hosts.is_empty() {
        file.allowed_hosts.clone().unwrap_or(defaults.allowed_hosts)
    } else {
        args.allow_hosts
            .iter()
            .map(|host| host.trim().to_ascii_lowercase())
            .filter(|host| !host.is_empty())
            .collect()
    };

    Settings {
        queue_file: pick(&args.queue, &file.queue_file, defaults.queue_file),
        log_file: pick(&args.log_file, &file.log_file, defaults.log_file),
        failed_file: pick(&args.failed_file, &file.failed_file, defaults.failed_file),
        output_dir: pick(&args.output_dir, &file.output_dir, defaults.output_dir),
        max_retries: pick(&args.max_retries, &file.max_retries, defaults.max_retries),
        retry_delay: args
            .retry_delay
            .or(file.retry_delay_secs)
            .map_or(defaults.retry_delay, Duration::from_secs),
        backoff: pick(&args.backoff, &file.backoff, defaults.backoff),
        format: pick(&args.format, &file.format, defaults.format),
        ytdlp: pick(&args.ytdlp, &file.ytdlp, defaults.ytdlp),
        fetch_timeout: args
            .fetch_timeout
            .or(file.fetch_timeout_secs)
            .map_or(defaults.fetch_timeout, Duration::from_secs),
        allowed_hosts,
    }
}

fn pick<T: Clone>(cli: &Option<T>, file: &Option<T>, default: T) -> T {
    cli.clone().or_else(|| file.clone()).unwrap_or(default)
}

fn resolve_verbosity(args: &Args, file: &FileConfig) -> VerbositySetting {
    if args.quiet {
        VerbositySetting::Quiet
    } else if args.verbose == 1 {
        VerbositySetting::Verbose
    } else if args.verbose > 1 {
        VerbositySetting::Debug
    } else {
        file.verbosity.unwrap_or(VerbositySetting::Default)
    }
}

pub(crate) fn default_log_level(verbosity: VerbositySetting) -> &'static str {
    match verbosity {
        VerbositySetting::Quiet => "error",
        VerbositySetting::Default => "info",
        VerbositySetting::Verbose => "debug",
        VerbositySetting::Debug => "trace",
    }
}
