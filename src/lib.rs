pub mod backend;
pub mod common;
pub mod fsops;
pub mod pipeline;
pub mod remote;
pub mod status;
pub mod verify;

// Re-export the pieces callers compose most often
pub use crate::common::config::TransferConfig;
pub use crate::common::error::{Error, Result};
pub use crate::common::types::{Outcome, SubOperation};
pub use crate::pipeline::{FileSpec, SessionReport, StoreBackend, TransferPipeline};
pub use crate::status::FileStatusStore;
