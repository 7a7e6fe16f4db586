//! Schema-driven decoding of pointer-linked reflection structures from raw
//! memory dumps.
//!
//! A walk starts at a known absolute address, decodes each record with a
//! declarative [`StructSchema`], follows collection pointers (single or
//! linked lists) with per-walk cycle detection, and hands the resulting
//! [`RootRecord`]s to the serializers.
//!
//! ```no_run
//! use mcdwalk::{enumerate_roots, serialize, DumpFile, WalkConfig};
//!
//! let config = WalkConfig::load("walk.yaml")?;
//! let dump = DumpFile::open("bone1.bin")?;
//! let records = enumerate_roots(&dump, &config)?;
//! serialize::write_json("classes.json", &records)?;
//! # Ok::<(), mcdwalk::Error>(())
//! ```

pub mod bitflags;
pub mod config;
pub mod error;
pub mod record;
pub mod schema;
pub mod serialize;
pub mod source;
pub mod walker;

pub use bitflags::{BitflagTable, FlagSet};
pub use config::{parse_address, WalkConfig};
pub use error::{Error, Result};
pub use record::{DecodedRecord, DecodedValue, RootRecord};
pub use schema::{ChainMode, CollectionSpec, FieldKind, FieldSpec, StructSchema};
pub use source::{BufferSource, ByteSource, DumpFile, Endian, PointerLayout};
pub use walker::{enumerate_roots, SeenSet, Walker};
