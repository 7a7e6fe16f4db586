//! Byte Source Trait
//!
//! Core abstraction for reading integers and strings out of a flat dump.

use crate::error::{Error, Result};
use byteorder::{ByteOrder, BE, LE};
use serde::Deserialize;
use std::borrow::Cow;
use std::ops::Range;

/// Byte order of an integer field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endian {
    #[default]
    Little,
    Big,
}

/// Width and byte order used for every pointer dereference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerLayout {
    pub width: usize,
    pub endian: Endian,
}

impl Default for PointerLayout {
    fn default() -> Self {
        Self {
            width: 4,
            endian: Endian::Little,
        }
    }
}

/// Trait for reading from a flat, absolutely addressed byte snapshot
pub trait ByteSource {
    /// Total size of the snapshot in bytes
    fn len(&self) -> u64;

    /// Borrow `size` bytes starting at `address`
    fn read_bytes(&self, address: u64, size: usize) -> Result<&[u8]>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if an address lies inside the snapshot
    fn contains(&self, address: u64) -> bool {
        address < self.len()
    }

    /// Read an unsigned integer of 1 to 8 bytes
    fn read_uint(&self, address: u64, width: usize, endian: Endian) -> Result<u64> {
        if !(1..=8).contains(&width) {
            return Err(Error::UnsupportedFieldType(format!(
                "{}-byte integer",
                width
            )));
        }

        let bytes = self.read_bytes(address, width)?;
        Ok(match endian {
            Endian::Little => LE::read_uint(bytes, width),
            Endian::Big => BE::read_uint(bytes, width),
        })
    }

    /// Read a single byte
    fn read_u8(&self, address: u64) -> Result<u8> {
        Ok(self.read_bytes(address, 1)?[0])
    }

    /// Read a pointer using the given layout
    fn read_pointer(&self, address: u64, layout: PointerLayout) -> Result<u64> {
        self.read_uint(address, layout.width, layout.endian)
    }

    /// Read a null-terminated string
    ///
    /// Returns `None` for the null pointer without touching the snapshot.
    /// Reading stops at the first NUL, after `max_len` bytes, or at the end
    /// of the dump. Invalid UTF-8 is replaced rather than reported.
    fn read_cstring(&self, address: u64, max_len: usize) -> Result<Option<String>> {
        if address == 0 {
            return Ok(None);
        }
        if !self.contains(address) {
            return Err(Error::OutOfBounds {
                address,
                size: 1,
                len: self.len(),
            });
        }

        let remaining = usize::try_from(self.len() - address).unwrap_or(usize::MAX);
        let bytes = self.read_bytes(address, max_len.min(remaining))?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());

        let text = match String::from_utf8_lossy(&bytes[..end]) {
            Cow::Borrowed(s) => s.to_string(),
            Cow::Owned(s) => {
                tracing::trace!("Replaced invalid UTF-8 in string at {:#x}", address);
                s
            }
        };
        Ok(Some(text))
    }
}

/// Resolve `address..address+size` against a snapshot of `len` bytes
pub(crate) fn checked_range(address: u64, size: usize, len: u64) -> Result<Range<usize>> {
    let out_of_bounds = || Error::OutOfBounds { address, size, len };

    let end = address
        .checked_add(size as u64)
        .filter(|&end| end <= len)
        .ok_or_else(out_of_bounds)?;
    let start = usize::try_from(address).map_err(|_| out_of_bounds())?;
    let end = usize::try_from(end).map_err(|_| out_of_bounds())?;

    Ok(start..end)
}
