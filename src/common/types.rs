// Shared types for the transfer status core

use std::fmt;

/// Default read size for streaming file chunks (64 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 65536;

/// Smallest accepted chunk size
pub const MIN_CHUNK_SIZE: usize = 1024;

/// Largest accepted chunk size (64 MiB)
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// Tagged result of a per-file operation.
///
/// Recoverable per-file failures are reported as values, never raised:
/// the guards record them on the status store and the orchestrator
/// aggregates them at the end of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub ok: bool,
    pub message: String,
}

impl Outcome {
    /// Successful outcome with an empty message
    pub fn ok() -> Self {
        Self {
            ok: true,
            message: String::new(),
        }
    }

    /// Failed outcome carrying the failure message
    pub fn fail<S: Into<String>>(message: S) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// The closed set of recognized sub-operations.
///
/// These are exactly the named phases that mutate persistent transfer
/// state; wrapping any other operation in the sub-status guard is a
/// programming error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubOperation {
    TransferToStore,
    RegisterInCatalog,
    FetchFromStore,
    FinalizeRecord,
}

impl SubOperation {
    pub const ALL: [SubOperation; 4] = [
        SubOperation::TransferToStore,
        SubOperation::RegisterInCatalog,
        SubOperation::FetchFromStore,
        SubOperation::FinalizeRecord,
    ];

    /// Sub-operations performed for an upload, in order
    pub const UPLOAD: [SubOperation; 2] =
        [SubOperation::TransferToStore, SubOperation::RegisterInCatalog];

    /// Sub-operations performed for a download, in order
    pub const DOWNLOAD: [SubOperation; 2] =
        [SubOperation::FetchFromStore, SubOperation::FinalizeRecord];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubOperation::TransferToStore => "transfer-to-store",
            SubOperation::RegisterInCatalog => "register-in-catalog",
            SubOperation::FetchFromStore => "fetch-from-store",
            SubOperation::FinalizeRecord => "finalize-record",
        }
    }

    /// Look up a sub-operation by its wire name
    pub fn from_name(name: &str) -> Option<SubOperation> {
        Self::ALL.iter().copied().find(|op| op.as_str() == name)
    }
}

impl fmt::Display for SubOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
