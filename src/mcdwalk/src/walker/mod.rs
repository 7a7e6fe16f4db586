//! Pointer-Graph Walker
//!
//! Decodes struct instances out of a dump by following a `StructSchema`:
//! - `Walker::decode_struct` - one struct instance into a `DecodedRecord`
//! - collection fields - single dereference or linked-list chains
//! - `enumerate_roots` - the top-level linked list of records
//!
//! Read failures never abort a walk. A field that cannot be read is
//! rendered as a fault sentinel and decoding continues with its siblings.

mod chain;
mod enumerate;

pub use chain::SeenSet;
pub use enumerate::enumerate_roots;

use crate::config::WalkConfig;
use crate::error::{Error, Result};
use crate::record::{DecodedRecord, DecodedValue};
use crate::schema::{FieldKind, FieldSpec, StructSchema};
use crate::source::ByteSource;

/// Schema-guided decoder bound to one source and one configuration
pub struct Walker<'a> {
    source: &'a dyn ByteSource,
    config: &'a WalkConfig,
}

impl<'a> Walker<'a> {
    pub fn new(source: &'a dyn ByteSource, config: &'a WalkConfig) -> Self {
        Self { source, config }
    }

    /// Decode the struct at `address`, fields in declaration order
    pub fn decode_struct(&self, schema: &StructSchema, address: u64) -> DecodedRecord {
        let mut record = DecodedRecord::with_capacity(schema.len());
        for field in &schema.fields {
            record.push(field.name.clone(), self.decode_field(field, address));
        }
        record
    }

    fn decode_field(&self, field: &FieldSpec, base: u64) -> DecodedValue {
        match self.read_field(field, base) {
            Ok(value) => value,
            Err(Error::UnsupportedFieldType(kind)) => {
                tracing::debug!(
                    "Skipping '{}' at {:#x}: unsupported type {}",
                    field.path,
                    base,
                    kind
                );
                DecodedValue::Unsupported(kind)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to decode '{}' of struct at {:#x}: {}",
                    field.path,
                    base,
                    e
                );
                DecodedValue::Fault(e.to_string())
            }
        }
    }

    fn read_field(&self, field: &FieldSpec, base: u64) -> Result<DecodedValue> {
        match &field.kind {
            FieldKind::Scalar {
                offset,
                width,
                endian,
            } => {
                let address = field_address(base, *offset)?;
                let value = self.source.read_uint(address, *width, *endian)?;
                Ok(DecodedValue::Text(match self.config.bitflags.get(&field.path) {
                    Some(flags) => flags.render(value),
                    None => format!("0x{:X}", value),
                }))
            }
            FieldKind::Bitflag {
                offset,
                width,
                endian,
            } => {
                let address = field_address(base, *offset)?;
                let value = self.source.read_uint(address, *width, *endian)?;
                let flags = self.config.bitflags.get(&field.path).ok_or_else(|| {
                    Error::config(format!("flags field '{}' has no bitflag table", field.path))
                })?;
                Ok(DecodedValue::Text(flags.render(value)))
            }
            FieldKind::StringRef { offset } => {
                let pointer = self.read_pointer(field_address(base, *offset)?)?;
                Ok(self
                    .source
                    .read_cstring(pointer, self.config.max_string_len)?
                    .map_or(DecodedValue::Null, DecodedValue::Text))
            }
            FieldKind::Bool { offset } => {
                let byte = self.source.read_u8(field_address(base, *offset)?)?;
                Ok(DecodedValue::text(if byte != 0 { "true" } else { "false" }))
            }
            FieldKind::Collection(spec) => {
                let head = self.read_pointer(field_address(base, spec.offset)?)?;
                Ok(DecodedValue::List(self.walk_collection(&field.path, spec, head)))
            }
            FieldKind::Unsupported { kind } => Err(Error::UnsupportedFieldType(kind.clone())),
        }
    }

    /// Read a pointer with the configured layout
    pub fn read_pointer(&self, address: u64) -> Result<u64> {
        self.source.read_pointer(address, self.config.pointer)
    }
}

/// `base + offset`, failing instead of wrapping
pub(crate) fn field_address(base: u64, offset: u64) -> Result<u64> {
    base.checked_add(offset).ok_or(Error::OutOfBounds {
        address: base,
        size: 0,
        len: u64::MAX,
    })
}
