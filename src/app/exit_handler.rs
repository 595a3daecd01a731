//! Exit code logic for the queue-dl process.
//!
//! Single responsibility: map how a run ended to the process exit outcome.

use queue_dl_core::RunError;

use crate::ProcessExit;

/// Determines the process exit outcome for a run.
///
/// A run that completes is a success even when individual URLs failed; those
/// are recorded, not fatal. Fatal errors and interruption are not.
pub(crate) fn determine_exit_outcome(
    result: Option<&Result<queue_dl_core::RunSummary, RunError>>,
) -> ProcessExit {
    match result {
        None => ProcessExit::Interrupted,
        Some(Ok(_)) => ProcessExit::Success,
        Some(Err(_)) => ProcessExit::Failure,
    }
}
