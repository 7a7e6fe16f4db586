//! Error types for dump decoding

use std::path::PathBuf;

/// Errors raised while opening a dump, loading a walk description, or
/// reading from the dump.
///
/// Only configuration and I/O errors abort a run. Read errors inside a
/// traversal are turned into per-field sentinels by the walker.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Read of {size} bytes at {address:#x} exceeds dump size {len:#x}")]
    OutOfBounds { address: u64, size: usize, len: u64 },

    #[error("Unsupported field type: {0}")]
    UnsupportedFieldType(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
