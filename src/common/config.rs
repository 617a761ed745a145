// Configuration types and parsing

use std::path::PathBuf;

use crate::common::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Destination root for downloaded files
    pub destination: PathBuf,
    /// Read size used when streaming file chunks
    pub chunk_size: usize,
    /// Cancel all not-yet-started files when one file fails
    pub break_on_fail: bool,
    /// Verify the SHA-256 digest of downloaded files
    pub verify_checksum: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            destination: PathBuf::from("./downloads"),
            chunk_size: super::types::DEFAULT_CHUNK_SIZE,
            break_on_fail: false,
            verify_checksum: false,
        }
    }
}

impl TransferConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_destination(mut self, dir: PathBuf) -> Self {
        self.destination = dir;
        self
    }

    pub fn with_chunk_size(mut self, size: usize) -> Result<Self> {
        if size < super::types::MIN_CHUNK_SIZE || size > super::types::MAX_CHUNK_SIZE {
            return Err(Error::Config(format!(
                "Chunk size must be between {} and {}",
                super::types::MIN_CHUNK_SIZE,
                super::types::MAX_CHUNK_SIZE
            )));
        }
        self.chunk_size = size;
        Ok(self)
    }

    pub fn with_break_on_fail(mut self, break_on_fail: bool) -> Self {
        self.break_on_fail = break_on_fail;
        self
    }

    pub fn with_verify_checksum(mut self, verify: bool) -> Self {
        self.verify_checksum = verify;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TransferConfig::new();
        assert_eq!(config.chunk_size, super::super::types::DEFAULT_CHUNK_SIZE);
        assert!(!config.break_on_fail);
        assert!(!config.verify_checksum);
    }

    #[test]
    fn test_chunk_size_bounds() {
        assert!(TransferConfig::new().with_chunk_size(512).is_err());
        assert!(TransferConfig::new().with_chunk_size(8192).is_ok());
    }
}
