//! SHA-256 content hashing.
//!
//! All digests are rendered as 64 lowercase hex characters.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};

use super::canonical::{canonicalize, EncodingError};
use crate::error::PipelineError;

/// Chunk size for streamed file hashing (1 MiB)
pub const FILE_CHUNK_SIZE: usize = 1024 * 1024;

/// Incremental SHA-256 hasher
#[derive(Debug, Clone, Default)]
pub struct ContentHasher {
    inner: Sha256,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes
    pub fn update(&mut self, bytes: impl AsRef<[u8]>) {
        self.inner.update(bytes.as_ref());
    }

    /// Consume the hasher and return the hex digest
    pub fn finish(self) -> String {
        hex::encode(self.inner.finalize())
    }
}

/// Hash a byte slice
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = ContentHasher::new();
    hasher.update(bytes);
    hasher.finish()
}

/// Hash a file's contents, reading in fixed-size chunks
pub fn hash_file(path: &Path) -> Result<String, PipelineError> {
    let mut file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let mut hasher = ContentHasher::new();
    let mut chunk = vec![0u8; FILE_CHUNK_SIZE];

    loop {
        let read = match file.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(PipelineError::io(path, e)),
        };
        hasher.update(&chunk[..read]);
    }

    Ok(hasher.finish())
}

/// Hash the canonical encoding of a value
pub fn hash_canonical<T: Serialize + ?Sized>(value: &T) -> Result<String, EncodingError> {
    Ok(hash_bytes(&canonicalize(value)?))
}
