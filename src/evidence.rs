use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvidenceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("read of {len} bytes at offset {offset} exceeds evidence length {evidence_len}")]
    OutOfBounds {
        offset: u64,
        len: u64,
        evidence_len: u64,
    },
}

/// Immutable evidence buffer with bounds-checked random access.
///
/// The whole input is held in memory for the lifetime of a run; there is no
/// streaming mode. Callers carving very large images must account for that
/// before loading.
pub struct ByteSource {
    data: Vec<u8>,
}

impl ByteSource {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Read the entire file at `path` into memory.
    pub fn load(path: &Path) -> Result<Self, EvidenceError> {
        let data = std::fs::read(path)?;
        Ok(Self { data })
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Borrow `len` bytes starting at `offset`. A range reaching past the end
    /// of the buffer is an error, never a short read.
    pub fn slice(&self, offset: u64, len: u64) -> Result<&[u8], EvidenceError> {
        let end = offset.checked_add(len).ok_or(EvidenceError::OutOfBounds {
            offset,
            len,
            evidence_len: self.len(),
        })?;
        if end > self.len() {
            return Err(EvidenceError::OutOfBounds {
                offset,
                len,
                evidence_len: self.len(),
            });
        }
        Ok(&self.data[offset as usize..end as usize])
    }
}
