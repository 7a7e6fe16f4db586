//! Byte Source Abstraction
//!
//! Random-access readers over a raw memory snapshot:
//! - Memory dump files via `DumpFile` (memory-mapped)
//! - Owned byte buffers via `BufferSource`
//!
//! All addresses are absolute offsets into the snapshot.

mod buffer;
mod dump;
mod traits;

pub use buffer::BufferSource;
pub use dump::DumpFile;
pub use traits::{ByteSource, Endian, PointerLayout};
