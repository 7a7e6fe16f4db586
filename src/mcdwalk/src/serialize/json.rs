//! JSON document output

use crate::error::{Error, Result};
use crate::record::RootRecord;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Pretty-printed document for `records`, field order preserved
pub fn to_json_string(records: &[RootRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Write the document to `path`, creating parent directories as needed
pub fn write_json<P: AsRef<Path>>(path: P, records: &[RootRecord]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| Error::io(path, e))?;

    tracing::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}
