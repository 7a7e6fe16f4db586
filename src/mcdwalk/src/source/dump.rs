//! Dump File Byte Source
//!
//! Read-only memory-mapped access to a raw memory snapshot.

use super::traits::checked_range;
use super::ByteSource;
use crate::error::{Error, Result};

use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Memory dump file source
///
/// The file is treated as a flat snapshot: file offset == address.
pub struct DumpFile {
    mmap: Mmap,
    /// Path to the dump file
    pub path: PathBuf,
}

impl DumpFile {
    /// Open and map a dump file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| Error::io(&path, e))?;

        let size = file.metadata().map_err(|e| Error::io(&path, e))?.len();
        if size == 0 {
            return Err(Error::config(format!(
                "dump file {} is empty",
                path.display()
            )));
        }

        // The map is read-only and the dump is not modified while we hold it.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::io(&path, e))?;

        tracing::info!(
            "Opened dump file: {} ({} bytes)",
            path.display(),
            mmap.len()
        );

        Ok(Self { mmap, path })
    }
}

impl ByteSource for DumpFile {
    fn len(&self) -> u64 {
        self.mmap.len() as u64
    }

    fn read_bytes(&self, address: u64, size: usize) -> Result<&[u8]> {
        let range = checked_range(address, size, self.len())?;
        Ok(&self.mmap[range])
    }
}
