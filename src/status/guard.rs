// Per-file operation guard with break-on-fail cancellation

use std::sync::atomic::{AtomicBool, Ordering};

use crate::common::types::Outcome;
use crate::status::FileStatusStore;

/// Run a guarded per-file operation.
///
/// Checks the global stop flag and the file's cancel flag before doing
/// anything; a cancelled file is skipped without touching its record.
/// On failure the file is cancelled with the operation's message, and
/// with `break_on_fail` every sibling file that has neither started nor
/// been cancelled is cancelled as well.
///
/// Returns whether the operation ran and succeeded.
pub fn proceed_guarded<F>(
    store: &FileStatusStore,
    file: &str,
    break_on_fail: bool,
    stop: &AtomicBool,
    inner: F,
) -> bool
where
    F: FnOnce() -> Outcome,
{
    if stop.load(Ordering::SeqCst) {
        log::warn!("Interrupt received, cancelling file {}", file);
        return false;
    }

    if store.is_cancelled(file) {
        log::warn!("File already cancelled, stopping file {}", file);
        return false;
    }

    store.mark_started(file);
    log::info!("File {} started", file);

    let outcome = inner();

    if !outcome.ok {
        log::warn!("Operation failed for {}: {}", file, outcome.message);
        store.cancel_file(file, &outcome.message);

        if break_on_fail {
            let message = format!(
                "Cancelling transfer due to file '{}'. Break-on-fail specified in call.",
                file
            );
            log::info!("{}", message);
            let cancelled = store.cancel_pending(file, &message);
            if !cancelled.is_empty() {
                log::info!("Cancelled {} pending file(s)", cancelled.len());
            }
        }
    }

    outcome.ok
}
