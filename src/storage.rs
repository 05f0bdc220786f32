//! Base byte storage behind accessors.
//!
//! A read accessor sees one of three backings: a slice borrowed from the
//! caller, heap bytes the storage owns, or a file mapping. All three are
//! immutable once created and shared between a base and its sub-views
//! through an `Rc`, so a base handle may be dropped while sub-views are
//! still alive; the bytes are released when the last view goes away.
//!
//! A write accessor owns a [`WriteBuf`] exclusively: a heap buffer grown in
//! granularity-sized steps and zero-filled as it extends.

use std::rc::Rc;

use memmap2::Mmap;

use crate::error::{Error, Result};

/// Default growth step for write buffers.
#[cfg(target_pointer_width = "64")]
pub const DEFAULT_WRITE_GRANULARITY: usize = 64 * 1024;
#[cfg(not(target_pointer_width = "64"))]
pub const DEFAULT_WRITE_GRANULARITY: usize = 4 * 1024;

/// Upper bound applied to the initial allocation of a write buffer.
pub const MAX_INITIAL_ALLOCATION: usize = 64 * 1024;

// ─────────────────────────────────────────────────────────────────────────────
// Shared read storage
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) enum ReadBytes<'a> {
    /// Caller-owned bytes; nothing is released on drop.
    Borrowed(&'a [u8]),
    /// Heap bytes owned by the storage.
    Owned(Box<[u8]>),
    /// A read-only file mapping covering the whole mapped span, including
    /// any page-alignment skew before the logical window.
    Mapped(Mmap),
}

/// Immutable storage shared by a base accessor and every sub-view derived
/// from it.
pub(crate) struct SharedStorage<'a> {
    bytes: ReadBytes<'a>,
    /// Offset in the source file of byte 0 of `bytes`. Zero for memory
    /// storages; for mappings this is the page-aligned map offset, which may
    /// sit before the logical window.
    data_file_offset: u64,
}

impl<'a> SharedStorage<'a> {
    pub(crate) fn new(bytes: ReadBytes<'a>, data_file_offset: u64) -> Rc<Self> {
        Rc::new(SharedStorage {
            bytes,
            data_file_offset,
        })
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[u8] {
        match &self.bytes {
            ReadBytes::Borrowed(s) => s,
            ReadBytes::Owned(b) => b,
            ReadBytes::Mapped(m) => &m[..],
        }
    }

    #[inline]
    pub(crate) fn data_file_offset(&self) -> u64 {
        self.data_file_offset
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Growable write buffer
// ─────────────────────────────────────────────────────────────────────────────

/// Heap buffer for write accessors. Its length is the allocated span; the
/// accessor tracks the logical window size within it. Growth rounds up to a
/// non-null multiple of the granularity and zero-fills the new area.
pub(crate) struct WriteBuf {
    buf: Vec<u8>,
    granularity: usize,
}

impl WriteBuf {
    /// Allocates a zero-filled buffer. `initial_allocation` is clamped to
    /// [`MAX_INITIAL_ALLOCATION`] and rounded up to a non-null multiple of
    /// the granularity; a zero granularity selects the platform default.
    pub(crate) fn new(initial_allocation: usize, granularity: usize) -> Result<WriteBuf> {
        let granularity = if granularity == 0 {
            DEFAULT_WRITE_GRANULARITY
        } else {
            granularity
        };
        let capped = initial_allocation.min(MAX_INITIAL_ALLOCATION);
        let rounded = round_up(capped, granularity)?;
        let mut buf = Vec::new();
        buf.try_reserve_exact(rounded).map_err(|_| Error::OutOfMemory)?;
        buf.resize(rounded, 0);
        Ok(WriteBuf { buf, granularity })
    }

    /// Allocated span in bytes.
    #[inline]
    pub(crate) fn allocated(&self) -> usize {
        self.buf.len()
    }

    /// Grows the allocated span so that at least `new_size` bytes are
    /// addressable. No-op when the buffer is already large enough. The new
    /// tail is zero-filled.
    pub(crate) fn ensure(&mut self, new_size: usize) -> Result<()> {
        if new_size <= self.buf.len() {
            return Ok(());
        }
        let rounded = round_up(new_size, self.granularity)?;
        let additional = rounded - self.buf.len();
        self.buf
            .try_reserve_exact(additional)
            .map_err(|_| Error::OutOfMemory)?;
        self.buf.resize(rounded, 0);
        Ok(())
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    /// Consumes the buffer, freezing its bytes into shared read storage.
    pub(crate) fn into_shared(self) -> Rc<SharedStorage<'static>> {
        SharedStorage::new(ReadBytes::Owned(self.buf.into_boxed_slice()), 0)
    }
}

/// Rounds `n` up to a non-null multiple of `step`.
fn round_up(n: usize, step: usize) -> Result<usize> {
    debug_assert!(step > 0);
    let full = n
        .checked_add(step - 1)
        .ok_or(Error::OutOfMemory)?
        / step
        * step;
    Ok(full.max(step))
}
