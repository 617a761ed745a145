// Filesystem preparation guard

use std::fs;
use std::path::Path;

use crate::common::types::Outcome;

/// Make sure `base/sub` exists before running the wrapped operation.
///
/// Missing directories (and all parents) are created idempotently; a
/// pre-existing directory is not an error. An OS-level creation failure
/// short-circuits with a failed outcome and the wrapped operation is
/// never invoked. On success the operation receives the full path.
pub fn ensure_subpath<F>(base: &Path, sub: &Path, inner: F) -> Outcome
where
    F: FnOnce(&Path) -> Outcome,
{
    let full_path = base.join(sub);

    if !full_path.exists() {
        if let Err(err) = fs::create_dir_all(&full_path) {
            return Outcome::fail(err.to_string());
        }
        log::info!("New directory created: {}", full_path.display());
    }

    inner(&full_path)
}
