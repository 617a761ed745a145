// Per-file, per-named sub-operation status wrapper

use crate::common::types::{Outcome, SubOperation};
use crate::status::FileStatusStore;

/// Run a named sub-operation on a file and record its progress.
///
/// The operation name must be one of the recognized sub-operations and
/// the file's record must have been registered with a slot for it;
/// either violation is a programming error and aborts the run.
///
/// The inner operation may return an extra value alongside its outcome;
/// it is passed through unchanged while the status layer only inspects
/// ok/message.
pub fn guard_sub_operation<F, T>(
    store: &FileStatusStore,
    file: &str,
    op_name: &str,
    inner: F,
) -> (Outcome, T)
where
    F: FnOnce() -> (Outcome, T),
{
    let op = match SubOperation::from_name(op_name) {
        Some(op) => op,
        None => panic!("sub-operation '{}' is not recognized", op_name),
    };
    if !store.has_sub_op(file, op) {
        panic!(
            "no status record for sub-operation '{}' on file '{}'",
            op_name, file
        );
    }

    store.mark_sub_started(file, op);
    log::info!("File {} status updated to {}: started", file, op);

    let (outcome, extra) = inner();

    if !outcome.ok {
        store.set_failed_op(file, op);
        log::warn!("{} failed: {}", op, outcome.message);
    } else {
        store.mark_sub_done(file, op);
        log::info!("File {} status updated to {}: done", file, op);
    }

    (outcome, extra)
}
