//! Console progress for queue runs: a progress bar on interactive terminals
//! and one line per finished URL.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use queue_dl_core::parser::QueueEntry;
use queue_dl_core::{DownloadOutcome, RunObserver};
use url::Url;

use crate::output;

pub(crate) struct ConsoleObserver {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl ConsoleObserver {
    pub(crate) fn new(use_progress_bar: bool, quiet: bool) -> Self {
        let bar = use_progress_bar.then(|| {
            let bar = ProgressBar::hidden();
            bar.set_style(
                ProgressStyle::with_template("{spinner} [{pos}/{len}] {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar
        });
        Self { bar, quiet }
    }

    pub(crate) fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    fn print_line(&self, line: &str) {
        if self.quiet {
            return;
        }
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{line}"),
        }
    }
}

impl RunObserver for ConsoleObserver {
    fn on_start(&self, total: usize) {
        if let Some(bar) = &self.bar {
            bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
            bar.set_length(u64::try_from(total).unwrap_or(u64::MAX));
            bar.enable_steady_tick(Duration::from_millis(100));
        }
    }

    fn on_entry_start(&self, _index: usize, entry: &QueueEntry) {
        if let Some(bar) = &self.bar {
            bar.set_message(format!("Downloading from {}...", host_label(&entry.url)));
        }
    }

    fn on_outcome(&self, _index: usize, outcome: &DownloadOutcome) {
        let line = output::truncate_to_width(
            &output::render_outcome_line(outcome),
            output::terminal_width(),
        );
        self.print_line(&line);
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }
}

fn host_label(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|url| url.host_str().map(std::string::ToString::to_string))
        .unwrap_or_else(|| "queue".to_string())
}
