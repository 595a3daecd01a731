use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::Parser;
use queue_dl_core::{HistoryRecorder, RunError, RunSummary, process_queue};
use tracing::{debug, info, warn};

use crate::app::config_manager::{self, ResolvedConfig};
use crate::app::{exit_handler, progress, terminal};
use crate::app_config::VerbositySetting;
use crate::cli::{Args, Command};
use crate::{ProcessExit, commands, output};

pub(crate) async fn run_queue_dl() -> Result<ProcessExit> {
    let args = Args::parse();
    let resolved = config_manager::resolve_config(&args)?;

    terminal::init_tracing(
        config_manager::default_log_level(resolved.verbosity),
        resolved.force_cli_log_level,
    );
    debug!(?args, "CLI arguments parsed");

    match &args.command {
        Some(Command::Log(log_args)) => {
            let recorder = HistoryRecorder::new(&resolved.settings.log_file);
            commands::run_log_command(log_args, &recorder)?;
            return Ok(ProcessExit::Success);
        }
        Some(Command::Config) => {
            commands::run_config_show_command(&resolved)?;
            return Ok(ProcessExit::Success);
        }
        None => {}
    }

    Ok(run_queue(&resolved).await)
}

async fn run_queue(resolved: &ResolvedConfig) -> ProcessExit {
    let settings = &resolved.settings;
    let quiet = resolved.verbosity == VerbositySetting::Quiet;
    let use_progress_bar = terminal::should_use_progress_bar(
        io::stderr().is_terminal(),
        quiet,
        terminal::is_dumb_terminal(),
    );
    let observer = progress::ConsoleObserver::new(use_progress_bar, quiet);
    let fetcher = settings.fetcher();

    info!(queue = %settings.queue_file.display(), "queue-dl starting");

    let result = tokio::select! {
        result = process_queue(settings, &fetcher, &observer) => Some(result),
        () = wait_for_interrupt() => None,
    };
    observer.finish();

    let exit = exit_handler::determine_exit_outcome(result.as_ref());
    match result {
        None => warn!("Aborted by user. Finished entries are kept in the history log."),
        Some(Ok(summary)) => {
            if !quiet {
                print_summary(resolved, &summary);
            }
        }
        Some(Err(err)) => report_fatal(err),
    }
    exit
}

async fn wait_for_interrupt() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No handler could be installed; never resolve.
        std::future::pending::<()>().await;
    }
}

fn print_summary(resolved: &ResolvedConfig, summary: &RunSummary) {
    let settings = &resolved.settings;
    let width = output::terminal_width();
    let lines = if summary.queued == 0 {
        output::empty_queue_lines(&settings.queue_file, width)
    } else {
        output::render_run_summary_lines(summary, &settings.log_file, &settings.failed_file, width)
    };
    for line in lines {
        println!("{line}");
    }
}

fn report_fatal(err: RunError) {
    let err = anyhow::Error::new(err);
    eprintln!("Error: {err:#}");
}
