//! In-memory Byte Source
//!
//! A snapshot held in an owned buffer, used for small dumps and tests.

use super::traits::checked_range;
use super::ByteSource;
use crate::error::{Error, Result};

/// A snapshot backed by an owned byte vector
#[derive(Debug, Clone, Default)]
pub struct BufferSource {
    data: Vec<u8>,
}

impl BufferSource {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Create a zero-filled snapshot of `size` bytes
    pub fn zeroed(size: usize) -> Self {
        Self::new(vec![0; size])
    }

    /// Copy `bytes` into the snapshot at `address`, growing it if needed
    pub fn write(&mut self, address: usize, bytes: &[u8]) -> Result<()> {
        let end = address
            .checked_add(bytes.len())
            .ok_or(Error::OutOfBounds {
                address: address as u64,
                size: bytes.len(),
                len: self.len(),
            })?;
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[address..end].copy_from_slice(bytes);
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl From<Vec<u8>> for BufferSource {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl ByteSource for BufferSource {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_bytes(&self, address: u64, size: usize) -> Result<&[u8]> {
        let range = checked_range(address, size, self.len())?;
        Ok(&self.data[range])
    }
}
