//! binview — cursor-based typed binary reader/writer over memory and
//! files, with windowed sub-views and coverage maps.
//!
//! The central type is [`Accessor`]: a cursor + window + byte order over a
//! byte storage. Storages come in four shapes — a borrowed slice, an owned
//! heap buffer, a memory-mapped file window, and a growable write buffer —
//! and read-only sub-views can be carved out of any read accessor, sharing
//! the underlying storage.
//!
//! On top of the cursor sit endianness-parameterised codecs for integers
//! (1..=8 byte widths, including 24-bit and LEB128/zig-zag forms), floats,
//! element arrays, raw blocks, and several string conventions. An optional
//! coverage log records which byte ranges were consumed and why, and can
//! be summarised into a sorted, merged map — the raw material for
//! annotated file-layout maps in format-reverse-engineering tools.
//!
//! ```
//! use binview::{Accessor, Endianness};
//!
//! let mut w = Accessor::open_writing_memory(0, 0)?;
//! w.write_u32_endian(0xdead_beef, Endianness::Big)?;
//! w.write_c_string(b"payload")?;
//!
//! w.seek(std::io::SeekFrom::Start(0))?;
//! assert_eq!(w.read_u32_endian(Endianness::Big)?, 0xdead_beef);
//! assert_eq!(w.read_c_string()?, b"payload");
//! # Ok::<(), binview::Error>(())
//! ```

pub mod accessor;
pub mod coverage;
pub mod endian;
pub mod error;

mod fileio;
mod storage;

/// The cursor + window + byte order object; see the [`accessor`] module.
pub use accessor::Accessor;

/// Byte-order tags and resolution helpers.
pub use endian::{default_endianness, set_default_endianness, Endianness, MAX_INT_WIDTH};

/// Error taxonomy shared by every operation.
pub use error::{Error, Result};

/// Coverage log records and summarisation defaults.
pub use coverage::{
    default_coverage_compare, default_coverage_merge, CoverageForce, CoverageRecord,
};

/// Maximum LEB128 encoding length for the 64-bit accumulator.
pub use accessor::MAX_VARINT_BYTES;

/// Options for creating output files.
pub use fileio::WriteOptions;

/// Windows at least this large are opened through a file mapping.
pub use fileio::MMAP_THRESHOLD;

/// Write-buffer growth step default and initial-allocation cap.
pub use storage::{DEFAULT_WRITE_GRANULARITY, MAX_INITIAL_ALLOCATION};
