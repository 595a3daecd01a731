//! Log command handler: query and display download history.

use anyhow::{Context, Result};
use queue_dl_core::HistoryRecorder;

use crate::cli::LogArgs;
use crate::output;

pub fn run_log_command(args: &LogArgs, recorder: &HistoryRecorder) -> Result<()> {
    let limit = usize::from(args.limit);
    let records = recorder
        .recent(limit, args.failed)
        .with_context(|| format!("Failed to read history log '{}'", recorder.path().display()))?;

    if records.is_empty() {
        if args.failed {
            println!("No failures recorded in {}.", recorder.path().display());
        } else {
            println!("No download history found in {}.", recorder.path().display());
        }
        return Ok(());
    }

    let width = output::terminal_width();
    for record in &records {
        println!("{}", output::render_history_row(record, args.failed, width));
    }
    if records.len() == limit {
        println!("Showing the {limit} most recent rows; rerun with a higher --limit to inspect more.");
    }

    Ok(())
}
