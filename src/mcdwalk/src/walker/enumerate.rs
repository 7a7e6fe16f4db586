//! Root Enumeration
//!
//! Walks the process-wide linked list of top-level records starting at the
//! configured base address.

use super::{field_address, SeenSet, Walker};
use crate::config::WalkConfig;
use crate::error::{Error, Result};
use crate::record::RootRecord;
use crate::source::ByteSource;

/// Decode every top-level record reachable from `config.base_address`
///
/// Stops at a null link, a revisited address, `max_records`, or a link that
/// cannot be read. An invalid schema or flag table, and a zero or out-of-dump
/// base address, are configuration errors reported before any traversal.
pub fn enumerate_roots(source: &dyn ByteSource, config: &WalkConfig) -> Result<Vec<RootRecord>> {
    config.validate()?;

    let base = config.base_address;
    if base == 0 {
        return Err(Error::config("base address is zero"));
    }
    if !source.contains(base) {
        return Err(Error::config(format!(
            "base address {:#x} is outside the dump ({:#x} bytes)",
            base,
            source.len()
        )));
    }

    tracing::info!(
        "Walking records from {:#x} (next at +{:#x}, max {})",
        base,
        config.next_offset,
        config.max_records
    );

    let walker = Walker::new(source, config);
    let mut records = Vec::new();
    let mut seen = SeenSet::new();
    let mut current = base;

    while current != 0 && records.len() < config.max_records {
        if !seen.insert(current) {
            tracing::debug!("Record chain revisits {:#x}, stopping", current);
            break;
        }

        let record = walker.decode_struct(&config.schema, current);
        tracing::debug!(
            "Record {} at {:#x}: {} fields",
            records.len(),
            current,
            record.len()
        );
        records.push(RootRecord {
            index: records.len(),
            address: current,
            record,
        });

        let next = field_address(current, config.next_offset).and_then(|a| walker.read_pointer(a));
        current = match next {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!("Cannot read next record pointer after {:#x}: {}", current, e);
                break;
            }
        };
    }

    if records.len() == config.max_records && current != 0 && !seen.contains(current) {
        tracing::warn!(
            "Stopped at max_records ({}); more records follow",
            config.max_records
        );
    }
    tracing::info!("Decoded {} records", records.len());

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::super::tests::put_u32;
    use super::*;
    use super::super::tests::RecordingSource;
    use crate::bitflags::BitflagTable;
    use crate::record::DecodedValue;
    use crate::schema::{FieldKind, FieldSpec, StructSchema};
    use crate::source::BufferSource;

    const NEXT: u64 = 0x18;

    fn id_schema() -> StructSchema {
        StructSchema::new(vec![FieldSpec::new("id", FieldKind::scalar(4))])
    }

    /// Node layout: +4 id, +0x18 next
    fn put_node(source: &mut BufferSource, at: usize, id: u32, next: u32) {
        put_u32(source, at + 4, id);
        put_u32(source, at + NEXT as usize, next);
    }

    #[test]
    fn test_three_node_list() {
        let mut source = BufferSource::zeroed(0x400);
        put_node(&mut source, 0x100, 0xA, 0x300);
        put_node(&mut source, 0x300, 0xB, 0x200);
        put_node(&mut source, 0x200, 0xC, 0);

        let config = WalkConfig::new(0x100, NEXT, id_schema());
        let records = enumerate_roots(&source, &config).unwrap();

        assert_eq!(records.len(), 3);
        let indices: Vec<usize> = records.iter().map(|r| r.index).collect();
        let addresses: Vec<u64> = records.iter().map(|r| r.address).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(addresses, vec![0x100, 0x300, 0x200]);
        assert_eq!(records[2].record.get("id"), Some(&DecodedValue::text("0xC")));
    }

    #[test]
    fn test_max_records() {
        let mut source = BufferSource::zeroed(0x400);
        for i in 0..8u32 {
            let at = 0x40 + i as usize * 0x40;
            put_node(&mut source, at, i, at as u32 + 0x40);
        }

        let config = WalkConfig::new(0x40, NEXT, id_schema()).with_max_records(5);
        let records = enumerate_roots(&source, &config).unwrap();
        assert_eq!(records.len(), 5);

        let config = config.with_max_records(0);
        assert!(enumerate_roots(&source, &config).unwrap().is_empty());
    }

    #[test]
    fn test_cycle_stops_enumeration() {
        let mut source = BufferSource::zeroed(0x400);
        put_node(&mut source, 0x100, 1, 0x200);
        put_node(&mut source, 0x200, 2, 0x100);

        let config = WalkConfig::new(0x100, NEXT, id_schema());
        let records = enumerate_roots(&source, &config).unwrap();

        let addresses: Vec<u64> = records.iter().map(|r| r.address).collect();
        assert_eq!(addresses, vec![0x100, 0x200]);
    }

    #[test]
    fn test_dangling_next_keeps_records() {
        let mut source = BufferSource::zeroed(0x400);
        put_node(&mut source, 0x100, 1, 0x3F0);

        let config = WalkConfig::new(0x100, NEXT, id_schema());
        let records = enumerate_roots(&source, &config).unwrap();

        // The node at 0x3F0 decodes (its id is in range) but its next pointer is not
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].address, 0x3F0);
    }

    #[test]
    fn test_invalid_base_address() {
        let source = BufferSource::zeroed(0x100);

        let config = WalkConfig::new(0, NEXT, id_schema());
        assert!(matches!(
            enumerate_roots(&source, &config),
            Err(Error::Config(_))
        ));

        let config = WalkConfig::new(0x100, NEXT, id_schema());
        assert!(matches!(
            enumerate_roots(&source, &config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_invalid_schema_rejected_before_reading() {
        let mut source = BufferSource::zeroed(0x400);
        put_node(&mut source, 0x100, 7, 0);
        let source = RecordingSource::new(source);

        let schema = StructSchema::new(vec![
            FieldSpec::new("id", FieldKind::scalar(4)),
            FieldSpec::new("id", FieldKind::scalar(0)),
        ]);
        let config = WalkConfig::new(0x100, NEXT, schema);
        assert!(matches!(
            enumerate_roots(&source, &config),
            Err(Error::Config(_))
        ));

        let schema = StructSchema::new(vec![FieldSpec::new("state", FieldKind::bitflag(8))]);
        let config = WalkConfig::new(0x100, NEXT, schema).with_bitflags(BitflagTable::new());
        assert!(matches!(
            enumerate_roots(&source, &config),
            Err(Error::Config(_))
        ));

        assert!(source.reads.borrow().is_empty());
    }
}
