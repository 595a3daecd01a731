//! Config command handler: show the effective configuration.

use anyhow::Result;

use crate::app::config_manager::ResolvedConfig;

pub(crate) fn run_config_show_command(resolved: &ResolvedConfig) -> Result<()> {
    for line in render_config_lines(resolved) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn render_config_lines(resolved: &ResolvedConfig) -> Vec<String> {
    let settings = &resolved.settings;
    let config_path = resolved.config_path.as_ref().map_or_else(
        || "<unresolved>".to_string(),
        |path| path.display().to_string(),
    );
    let allowed_hosts = if settings.allowed_hosts.is_empty() {
        "<any>".to_string()
    } else {
        settings.allowed_hosts.join(", ")
    };

    vec![
        format!("config_path = {config_path}"),
        format!(
            "config_file = {}",
            if resolved.loaded_from_file {
                "loaded"
            } else {
                "not found (using defaults)"
            }
        ),
        format!("queue_file = {}", settings.queue_file.display()),
        format!("log_file = {}", settings.log_file.display()),
        format!("failed_file = {}", settings.failed_file.display()),
        format!("output_dir = {}", settings.output_dir.display()),
        format!("max_retries = {}", settings.max_retries),
        format!("retry_delay_secs = {}", settings.retry_delay.as_secs()),
        format!("backoff = {}", settings.backoff),
        format!("format = {}", settings.format),
        format!("ytdlp = {}", settings.ytdlp.display()),
        format!("fetch_timeout_secs = {}", settings.fetch_timeout.as_secs()),
        format!("allowed_hosts = {allowed_hosts}"),
        format!("verbosity = {}", resolved.verbosity.as_str()),
    ]
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use queue_dl_core::Settings;

    use super::*;
    use crate::app_config::VerbositySetting;

    #[test]
    fn test_render_config_lines_defaults() {
        let resolved = ResolvedConfig {
            settings: Settings::default(),
            verbosity: VerbositySetting::Default,
            force_cli_log_level: false,
            config_path: None,
            loaded_from_file: false,
        };
        let lines = render_config_lines(&resolved);
        assert!(lines.contains(&"config_path = <unresolved>".to_string()));
        assert!(lines.contains(&"config_file = not found (using defaults)".to_string()));
        assert!(lines.contains(&"queue_file = queue.md".to_string()));
        assert!(lines.contains(&"max_retries = 3".to_string()));
        assert!(lines.contains(&"backoff = exponential".to_string()));
        assert!(lines.contains(&"allowed_hosts = <any>".to_string()));
    }

    #[test]
    fn test_render_config_lines_loaded_file() {
        let settings = Settings {
            allowed_hosts: vec!["youtube.com".to_string(), "vimeo.com".to_string()],
            ..Settings::default()
        };
        let resolved = ResolvedConfig {
            settings,
            verbosity: VerbositySetting::Quiet,
            force_cli_log_level: true,
            config_path: Some(PathBuf::from("/tmp/queue-dl/config.toml")),
            loaded_from_file: true,
        };
        let lines = render_config_lines(&resolved);
        assert!(lines.contains(&"config_file = loaded".to_string()));
        assert!(lines.contains(&"allowed_hosts = youtube.com, vimeo.com".to_string()));
        assert!(lines.contains(&"verbosity = quiet".to_string()));
    }
}
