//! CLI output formatting and display helpers.

use std::collections::BTreeMap;
use std::path::Path;

use queue_dl_core::{DownloadOutcome, FailureKind, HistoryRecord, RunSummary};

use crate::failure;

/// Message when the queue has nothing to download.
pub const EMPTY_QUEUE_GUIDANCE: &str = "No URLs found in the queue.";

/// Example queue content.
pub const QUEUE_EXAMPLE: &str =
    "Add one URL per line, e.g. https://youtu.be/abc123 or [My Video](https://youtu.be/abc123)";

/// Returns terminal width from COLUMNS, or 80 if unset/invalid.
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|width| *width >= 20)
        .unwrap_or(80)
}

/// Truncates text to at most `width` chars, appending ellipsis if truncated.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let text_len = text.chars().count();
    if text_len <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    if width == 1 {
        return "…".to_string();
    }

    let mut output: String = text.chars().take(width - 1).collect();
    output.push('…');
    output
}

/// Lines shown when the queue is empty or missing.
pub fn empty_queue_lines(queue_file: &Path, width: usize) -> Vec<String> {
    vec![
        truncate_to_width(
            &format!("{EMPTY_QUEUE_GUIDANCE} ({})", queue_file.display()),
            width,
        ),
        truncate_to_width(QUEUE_EXAMPLE, width),
    ]
}

/// One line per finished entry: `✅ url -> path` or `❌ url (STATUS after n attempts)`.
pub(crate) fn render_outcome_line(outcome: &DownloadOutcome) -> String {
    match outcome {
        DownloadOutcome::Success { url, path, .. } => {
            format!("✅ {url} -> {}", path.display())
        }
        DownloadOutcome::Failure {
            url,
            attempts,
            kind,
            ..
        } => format!("❌ {url} ({kind} after {attempts} attempt(s))"),
    }
}

pub(crate) fn render_run_summary_lines(
    summary: &RunSummary,
    log_file: &Path,
    failed_file: &Path,
    width: usize,
) -> Vec<String> {
    let mut lines = vec![truncate_to_width(
        &format!(
            "Done: {} succeeded, {} failed, {} skipped line(s), {} retries",
            summary.succeeded,
            summary.failed(),
            summary.skipped_lines,
            summary.retries
        ),
        width,
    )];
    lines.push(truncate_to_width(
        &format!("History: {}", log_file.display()),
        width,
    ));
    if summary.failed() > 0 {
        lines.push(truncate_to_width(
            &format!(
                "Failed URLs: {} ({} new)",
                failed_file.display(),
                summary.newly_listed
            ),
            width,
        ));
        let kinds: Vec<FailureKind> = summary.failures.iter().map(|f| f.kind).collect();
        lines.extend(render_failure_summary_lines(&kinds, width));
    }
    lines
}

pub(crate) fn render_failure_summary_lines(kinds: &[FailureKind], width: usize) -> Vec<String> {
    if kinds.is_empty() {
        return Vec::new();
    }

    let mut grouped: BTreeMap<FailureKind, usize> = BTreeMap::new();
    for kind in kinds {
        *grouped.entry(*kind).or_insert(0) += 1;
    }

    let mut lines = vec![truncate_to_width("Failure summary by category:", width)];
    for (kind, count) in &grouped {
        let descriptor = failure::describe_failure(*kind);
        let header = format!("- {} {}: {}", descriptor.icon(), descriptor.what, count);
        lines.push(truncate_to_width(&header, width));
        lines.push(truncate_to_width(
            &format!("  Why: {}", descriptor.why),
            width,
        ));
        lines.push(truncate_to_width(
            &format!("  Fix: {}", descriptor.fix),
            width,
        ));
    }

    lines
}

pub(crate) fn render_history_row(record: &HistoryRecord, failed_only: bool, width: usize) -> String {
    let date = record.timestamp.format("%Y-%m-%d %H:%M:%S");
    let detail = record
        .path
        .as_deref()
        .and_then(|path| Path::new(path).file_name().and_then(|name| name.to_str()))
        .or(record.error.as_deref())
        .unwrap_or("n/a");
    let base_line = format!(
        "{date} | {} | {} attempt(s) | {} | {detail}",
        record.status_code, record.attempts, record.url
    );

    if failed_only
        && let Some(kind) = failure::kind_from_status_code(&record.status_code)
    {
        let descriptor = failure::describe_failure(kind);
        let what_line = format!("  {} What: {}", descriptor.icon(), descriptor.what);
        let fix_line = format!("  Fix: {}", descriptor.fix);
        return format!(
            "{}\n{}\n{}",
            truncate_to_width(&base_line, width),
            truncate_to_width(&what_line, width),
            truncate_to_width(&fix_line, width)
        );
    }

    truncate_to_width(&base_line, width)
}
