// Per-file transfer status tracking

pub mod guard;
pub mod subop;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::common::types::SubOperation;

/// Progress flags for one named sub-operation on a file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubOpStatus {
    pub started: bool,
    pub done: bool,
}

/// Status record for one file in the session
#[derive(Debug, Clone, Default)]
pub struct FileRecord {
    /// Operation entry attempted for this file
    pub started: bool,
    /// File excluded from further processing
    pub cancel: bool,
    /// Last failure/status message
    pub message: String,
    /// Which named sub-operation failed, if any
    pub failed_op: Option<SubOperation>,
    /// Per-sub-operation progress, pre-populated at registration
    pub operations: HashMap<SubOperation, SubOpStatus>,
}

/// File-keyed state table for one upload/download session.
///
/// A single mutex guards the whole map. Every mutation is a short
/// critical section, so the per-file operations themselves always run
/// outside the lock and the table stays safe under file-level
/// parallelism. Records are never removed mid-run; cancellation is a
/// flag, not removal.
#[derive(Debug, Default)]
pub struct FileStatusStore {
    inner: Mutex<HashMap<String, FileRecord>>,
}

impl FileStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, FileRecord>> {
        self.inner.lock().expect("status store mutex poisoned")
    }

    /// Create a record for `file` with all flags false and a status slot
    /// for each of the given sub-operations. Re-registering a file
    /// resets its record.
    pub fn register(&self, file: &str, ops: &[SubOperation]) {
        let mut record = FileRecord::default();
        for op in ops {
            record.operations.insert(*op, SubOpStatus::default());
        }
        self.lock().insert(file.to_string(), record);
    }

    pub fn contains(&self, file: &str) -> bool {
        self.lock().contains_key(file)
    }

    /// Snapshot of the record for `file`
    pub fn record(&self, file: &str) -> Option<FileRecord> {
        self.lock().get(file).cloned()
    }

    pub fn is_cancelled(&self, file: &str) -> bool {
        self.lock().get(file).map(|r| r.cancel).unwrap_or(false)
    }

    pub fn mark_started(&self, file: &str) {
        if let Some(record) = self.lock().get_mut(file) {
            record.started = true;
        }
    }

    /// Cancel a single file, recording the reason
    pub fn cancel_file(&self, file: &str, message: &str) {
        if let Some(record) = self.lock().get_mut(file) {
            record.cancel = true;
            record.message = message.to_string();
        }
    }

    /// Cancel every file that is neither cancelled nor started yet,
    /// excluding `trigger`. Returns the keys that were cancelled.
    ///
    /// The candidate set is snapshotted before any record is mutated so
    /// the scan never observes its own writes.
    pub fn cancel_pending(&self, trigger: &str, message: &str) -> Vec<String> {
        let mut map = self.lock();
        let candidates: Vec<String> = map
            .iter()
            .filter(|(key, record)| {
                !record.cancel && !record.started && key.as_str() != trigger
            })
            .map(|(key, _)| key.clone())
            .collect();
        for key in &candidates {
            if let Some(record) = map.get_mut(key) {
                record.cancel = true;
                record.message = message.to_string();
            }
        }
        candidates
    }

    pub fn has_sub_op(&self, file: &str, op: SubOperation) -> bool {
        self.lock()
            .get(file)
            .map(|r| r.operations.contains_key(&op))
            .unwrap_or(false)
    }

    pub fn sub_op(&self, file: &str, op: SubOperation) -> Option<SubOpStatus> {
        self.lock()
            .get(file)
            .and_then(|r| r.operations.get(&op).copied())
    }

    pub fn mark_sub_started(&self, file: &str, op: SubOperation) {
        if let Some(record) = self.lock().get_mut(file) {
            if let Some(status) = record.operations.get_mut(&op) {
                status.started = true;
            }
        }
    }

    pub fn mark_sub_done(&self, file: &str, op: SubOperation) {
        if let Some(record) = self.lock().get_mut(file) {
            if let Some(status) = record.operations.get_mut(&op) {
                status.done = true;
            }
        }
    }

    pub fn set_failed_op(&self, file: &str, op: SubOperation) {
        if let Some(record) = self.lock().get_mut(file) {
            record.failed_op = Some(op);
        }
    }

    /// All registered file keys
    pub fn files(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
