// Streaming checksum verification

use std::fs::File;
use std::io::Read;
use std::path::Path;

use ring::digest;

use crate::common::error::Result;
use crate::common::types::Outcome;

/// Message reported when the computed digest does not match the
/// expected one
pub const CHECKSUM_MISMATCH_MSG: &str = "Checksum verification failed. File compromised.";

/// Verify the integrity of a chunk stream against an expected SHA-256
/// digest (lowercase hex).
///
/// `produce` is the wrapped data-producing operation; any arguments it
/// needs travel inside the closure. If it fails before yielding chunks
/// the result is its error message and no hashing occurs. With
/// `do_verify` false the producer's own success is the sole determinant
/// of the result. With `do_verify` true the chunks are consumed to
/// completion through a running digest; a chunk-read error fails with
/// that error's message, a digest mismatch fails with
/// [`CHECKSUM_MISMATCH_MSG`].
pub fn verify_checksum<F, I>(expected_digest: &str, do_verify: bool, produce: F) -> Outcome
where
    F: FnOnce() -> Result<I>,
    I: Iterator<Item = Result<Vec<u8>>>,
{
    let chunks = match produce() {
        Ok(chunks) => chunks,
        Err(err) => return Outcome::fail(err.to_string()),
    };

    if !do_verify {
        return Outcome::ok();
    }

    log::info!("Verifying file integrity...");
    let mut context = digest::Context::new(&digest::SHA256);
    for chunk in chunks {
        match chunk {
            Ok(data) => context.update(&data),
            Err(err) => {
                let message = err.to_string();
                log::warn!("{}", message);
                return Outcome::fail(message);
            }
        }
    }

    let computed = hex::encode(context.finish().as_ref());
    if computed != expected_digest {
        log::warn!("{}", CHECKSUM_MISMATCH_MSG);
        return Outcome::fail(CHECKSUM_MISMATCH_MSG);
    }

    log::info!("File integrity verified.");
    Outcome::ok()
}

/// Read a file as a lazy, one-pass sequence of byte chunks
pub fn file_chunks(
    path: &Path,
    chunk_size: usize,
) -> Result<impl Iterator<Item = Result<Vec<u8>>>> {
    let mut file = File::open(path)?;
    let mut buffer = vec![0u8; chunk_size];
    let mut finished = false;

    Ok(std::iter::from_fn(move || {
        if finished {
            return None;
        }
        match file.read(&mut buffer) {
            Ok(0) => {
                finished = true;
                None
            }
            Ok(n) => Some(Ok(buffer[..n].to_vec())),
            Err(err) => {
                finished = true;
                Some(Err(err.into()))
            }
        }
    }))
}

/// Compute the SHA-256 digest (lowercase hex) of a file
pub fn compute_file_digest(path: &Path, chunk_size: usize) -> Result<String> {
    let mut context = digest::Context::new(&digest::SHA256);
    for chunk in file_chunks(path, chunk_size)? {
        context.update(&chunk?);
    }
    Ok(hex::encode(context.finish().as_ref()))
}
