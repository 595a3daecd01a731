//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use queue_dl_core::BackoffKind;

/// TOML-style file configuration for queue-dl defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileConfig {
    /// Queue file to read.
    pub queue_file: Option<PathBuf>,
    /// History log path.
    pub log_file: Option<PathBuf>,
    /// Failure list path.
    pub failed_file: Option<PathBuf>,
    /// Download directory.
    pub output_dir: Option<PathBuf>,
    /// Attempts per URL (same range as CLI).
    pub max_retries: Option<u32>,
    /// Base delay between attempts in seconds.
    pub retry_delay_secs: Option<u64>,
    /// Backoff shape.
    pub backoff: Option<BackoffKind>,
    /// `yt-dlp` format selector.
    pub format: Option<String>,
    /// `yt-dlp` executable name or path.
    pub ytdlp: Option<PathBuf>,
    /// Per-attempt time limit in seconds.
    pub fetch_timeout_secs: Option<u64>,
    /// Hosts queued URLs must belong to.
    pub allowed_hosts: Option<Vec<String>>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(max_retries) = self.max_retries
            && !(1..=10).contains(&max_retries)
        {
            bail!("Invalid config value for `max_retries`: {max_retries}. Expected range: 1..=10");
        }

        if let Some(delay) = self.retry_delay_secs
            && delay > 3600
        {
            bail!("Invalid config value for `retry_delay_secs`: {delay}. Expected range: 0..=3600");
        }

        if let Some(timeout) = self.fetch_timeout_secs
            && !(1..=86_400).contains(&timeout)
        {
            bail!(
                "Invalid config value for `fetch_timeout_secs`: {timeout}. Expected range: 1..=86400"
            );
        }

        if let Some(format) = &self.format
            && format.trim().is_empty()
        {
            bail!("Invalid config value for `format`: must not be empty");
        }

        Ok(())
    }
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path, if one could be determined.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/queue-dl/config.toml`
/// 2. `$HOME/.config/queue-dl/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("queue-dl")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("queue-dl")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config named on the command line, or the default one if present.
///
/// An explicit path must exist; the default path is optional.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        let config = load_file_config(path)?;
        return Ok(LoadedConfig {
            path: Some(path.to_path_buf()),
            config: Some(config),
        });
    }

    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!(
                "Invalid config syntax on line {}: expected key = value",
                line_index + 1
            );
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let line_number = line_index + 1;

        match key {
            "queue_file" | "log_file" | "failed_file" | "output_dir" | "ytdlp" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `{key}` value on line {line_number}"))?;
                let path = Some(PathBuf::from(parsed));
                match key {
                    "queue_file" => cfg.queue_file = path,
                    "log_file" => cfg.log_file = path,
                    "failed_file" => cfg.failed_file = path,
                    "output_dir" => cfg.output_dir = path,
                    _ => cfg.ytdlp = path,
                }
            }
            "max_retries" => {
                let parsed = parse_integer_u64(value)
                    .with_context(|| format!("Invalid `max_retries` value on line {line_number}"))?;
                let n = u32::try_from(parsed)
                    .map_err(|_| anyhow::anyhow!("max_retries out of range for u32"))?;
                cfg.max_retries = Some(n);
            }
            "retry_delay_secs" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `retry_delay_secs` value on line {line_number}")
                })?;
                cfg.retry_delay_secs = Some(parsed);
            }
            "fetch_timeout_secs" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `fetch_timeout_secs` value on line {line_number}")
                })?;
                cfg.fetch_timeout_secs = Some(parsed);
            }
            "backoff" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `backoff` value on line {line_number}"))?;
                let kind = parsed
                    .parse::<BackoffKind>()
                    .map_err(anyhow::Error::msg)
                    .with_context(|| format!("Invalid `backoff` value on line {line_number}"))?;
                cfg.backoff = Some(kind);
            }
            "format" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `format` value on line {line_number}"))?;
                cfg.format = Some(parsed);
            }
            "allowed_hosts" => {
                let parsed = parse_string_literal(value).with_context(|| {
                    format!("Invalid `allowed_hosts` value on line {line_number}")
                })?;
                cfg.allowed_hosts = Some(parse_host_list(&parsed));
            }
            "verbosity" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `verbosity` value on line {line_number}"))?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_number}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_host_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}
