//! The accessor object: a cursor + window + byte order over a byte storage.
//!
//! A *base* accessor owns (or maps, or borrows) its storage; a *sub-view* is
//! a read-only accessor over a sub-range of its super's window, sharing the
//! base storage. Storage is reference-counted, so a base handle may be
//! dropped while sub-views remain; the bytes are released with the last
//! view.
//!
//! Submodules add the operation surface:
//! - `cursor` — seek / truncate / cursor stack
//! - `scalar` — integers and floats at 1..=8 byte widths
//! - `varint` — variable-length and zig-zag integers
//! - `array` — element arrays and raw byte blocks
//! - `string` — C / Pascal / fixed / padded / wide strings
//! - `lookahead` — non-consuming reads and delimiter search

mod array;
mod cursor;
mod lookahead;
mod scalar;
mod string;
mod varint;

pub use varint::MAX_VARINT_BYTES;

use std::fs::File;
use std::path::Path;
use std::rc::Rc;

use log::{debug, warn};

use crate::coverage::{Coverage, CoverageForce, CoverageRecord};
use crate::endian::{default_endianness, Endianness};
use crate::error::{Error, Result};
use crate::fileio::{self, WriteOptions, MMAP_THRESHOLD};
use crate::storage::{ReadBytes, SharedStorage, WriteBuf};

enum Backing<'a> {
    /// Immutable storage shared with sub-views.
    Shared(Rc<SharedStorage<'a>>),
    /// Exclusive growable buffer of a write accessor.
    Writable(WriteBuf),
}

/// Cursor-based typed reader/writer over a window of bytes.
pub struct Accessor<'a> {
    backing: Backing<'a>,
    /// Offset of this window inside its super's window; for bases, the
    /// intra-page skew of a mapping (zero otherwise).
    window_offset: usize,
    /// Cumulative offset of this window into the backing bytes. The only
    /// offset consulted on the read/write path.
    base_window_offset: usize,
    window_size: usize,
    cursor: usize,
    endianness: Endianness,
    write_enabled: bool,
    cursor_stack: Vec<usize>,
    coverage: Coverage,
    /// Output file receiving the buffered window when the accessor closes.
    pending_output: Option<File>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Construction
// ─────────────────────────────────────────────────────────────────────────────

impl<'a> Accessor<'a> {
    fn from_shared(
        storage: Rc<SharedStorage<'a>>,
        window_offset: usize,
        base_window_offset: usize,
        window_size: usize,
    ) -> Accessor<'a> {
        Accessor {
            backing: Backing::Shared(storage),
            window_offset,
            base_window_offset,
            window_size,
            cursor: 0,
            endianness: default_endianness(),
            write_enabled: false,
            cursor_stack: Vec::new(),
            coverage: Coverage::new(),
            pending_output: None,
        }
    }

    /// Opens a read-only accessor over `[offset, offset + size)` of a
    /// caller-owned slice. A `size` of `None` runs to the end of the slice.
    pub fn open_reading_bytes(
        data: &'a [u8],
        offset: usize,
        size: Option<usize>,
    ) -> Result<Accessor<'a>> {
        let size = resolve_span(data.len(), offset, size)?;
        let storage = SharedStorage::new(ReadBytes::Borrowed(data), 0);
        Ok(Self::from_shared(storage, offset, offset, size))
    }

    /// As [`open_reading_bytes`](Self::open_reading_bytes), but takes
    /// ownership of the buffer; it is freed when the last view closes.
    pub fn open_reading_owned(
        data: Vec<u8>,
        offset: usize,
        size: Option<usize>,
    ) -> Result<Accessor<'static>> {
        let size = resolve_span(data.len(), offset, size)?;
        let storage = SharedStorage::new(ReadBytes::Owned(data.into_boxed_slice()), 0);
        Ok(Accessor::from_shared(storage, offset, offset, size))
    }

    /// Opens a read-only accessor over `[offset, offset + size)` of the file
    /// at `path`. Windows at or above [`MMAP_THRESHOLD`] are memory-mapped
    /// (falling back to a buffered read if the mapping fails); smaller
    /// windows are read into a heap buffer in bounded chunks.
    pub fn open_reading_file<P: AsRef<Path>>(
        path: P,
        offset: u64,
        size: Option<u64>,
    ) -> Result<Accessor<'static>> {
        let path = path.as_ref();
        let (mut file, file_len) = fileio::open_input(path)?;
        if offset > file_len {
            return Err(Error::BeyondEnd);
        }
        let size = match size {
            None => file_len - offset,
            Some(s) if s > file_len - offset => return Err(Error::BeyondEnd),
            Some(s) => s,
        };
        let size = usize::try_from(size).map_err(|_| Error::InvalidParameter)?;

        if size >= MMAP_THRESHOLD {
            match fileio::map_window(&file, offset, size) {
                Ok((map, map_offset, skew)) => {
                    debug!("{}: {} byte window via mmap", path.display(), size);
                    let storage = SharedStorage::new(ReadBytes::Mapped(map), map_offset);
                    return Ok(Accessor::from_shared(storage, skew, skew, size));
                }
                Err(e) => {
                    debug!("{}: mmap failed ({e}), using buffered read", path.display());
                }
            }
        }
        let bytes = fileio::read_window(&mut file, offset, size)?;
        debug!("{}: {} byte window buffered", path.display(), size);
        let storage = SharedStorage::new(ReadBytes::Owned(bytes), offset);
        Ok(Accessor::from_shared(storage, 0, 0, size))
    }

    /// Opens an empty write accessor backed by a growable buffer.
    ///
    /// `initial_allocation` is clamped to
    /// [`MAX_INITIAL_ALLOCATION`](crate::MAX_INITIAL_ALLOCATION)
    /// and rounded up to a non-null multiple of the granularity; a zero
    /// `granularity` selects the platform default (64 KiB on 64-bit
    /// targets, 4 KiB otherwise).
    pub fn open_writing_memory(
        initial_allocation: usize,
        granularity: usize,
    ) -> Result<Accessor<'static>> {
        Ok(Accessor {
            backing: Backing::Writable(WriteBuf::new(initial_allocation, granularity)?),
            window_offset: 0,
            base_window_offset: 0,
            window_size: 0,
            cursor: 0,
            endianness: default_endianness(),
            write_enabled: true,
            cursor_stack: Vec::new(),
            coverage: Coverage::new(),
            pending_output: None,
        })
    }

    /// As [`open_writing_memory`](Self::open_writing_memory), but the
    /// output file at `path` is created (truncating any existing content)
    /// immediately, and the buffered window is written to it when the
    /// accessor closes.
    pub fn open_writing_file<P: AsRef<Path>>(
        path: P,
        options: WriteOptions,
        initial_allocation: usize,
        granularity: usize,
    ) -> Result<Accessor<'static>> {
        let file = fileio::create_output(path.as_ref(), options)?;
        let mut accessor = Accessor::open_writing_memory(initial_allocation, granularity)?;
        accessor.pending_output = Some(file);
        Ok(accessor)
    }

    /// Snapshots `[offset, offset + size)` of this accessor's window to a
    /// freshly created (or truncated) file. The accessor is not modified.
    pub fn write_to_file<P: AsRef<Path>>(
        &self,
        path: P,
        options: WriteOptions,
        offset: usize,
        size: Option<usize>,
    ) -> Result<()> {
        let size = resolve_span(self.window_size, offset, size)?;
        let mut file = fileio::create_output(path.as_ref(), options)?;
        let window = self.window_slice();
        fileio::flush_output(&mut file, &window[offset..offset + size])
    }
}

/// Resolves an `(offset, size)` pair against a span length, with `None`
/// meaning "until the end".
fn resolve_span(len: usize, offset: usize, size: Option<usize>) -> Result<usize> {
    match size {
        None => len.checked_sub(offset).ok_or(Error::BeyondEnd),
        Some(s) => {
            let end = offset.checked_add(s).ok_or(Error::BeyondEnd)?;
            if end > len {
                Err(Error::BeyondEnd)
            } else {
                Ok(s)
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sub-views
// ─────────────────────────────────────────────────────────────────────────────

impl<'a> Accessor<'a> {
    /// Shared handle to the backing storage; write accessors are rejected.
    ///
    /// An accessor that lost its write permission (see [`swap`](Self::swap))
    /// still holds an exclusive buffer; it is frozen into shared storage on
    /// the first sub-view request.
    fn shared_storage(&mut self) -> Result<Rc<SharedStorage<'a>>> {
        if self.write_enabled {
            return Err(Error::InvalidParameter);
        }
        if let Backing::Shared(rc) = &self.backing {
            return Ok(rc.clone());
        }
        let placeholder = Backing::Shared(SharedStorage::new(
            ReadBytes::Owned(Vec::new().into_boxed_slice()),
            0,
        ));
        let Backing::Writable(buf) = std::mem::replace(&mut self.backing, placeholder) else {
            unreachable!();
        };
        let rc = buf.into_shared();
        self.backing = Backing::Shared(rc.clone());
        Ok(rc)
    }

    /// Consumes the next `count` bytes (`None`: all remaining) into a new
    /// read-only sub-view sharing this accessor's storage.
    ///
    /// One coverage record covering the consumed range is logged against
    /// this accessor, then the cursor advances past it. The sub-view
    /// inherits the byte order and starts with coverage disabled.
    pub fn sub_accessor_bytes(&mut self, count: Option<usize>) -> Result<Accessor<'a>> {
        let count = match count {
            None => self.available(),
            Some(c) if c > self.available() => return Err(Error::BeyondEnd),
            Some(c) => c,
        };
        let storage = self.shared_storage()?;
        let mut sub = Accessor::from_shared(
            storage,
            self.cursor,
            self.base_window_offset + self.cursor,
            count,
        );
        sub.endianness = self.endianness;
        self.coverage.note_read(self.cursor, count);
        self.cursor += count;
        Ok(sub)
    }

    /// Opens a read-only sub-view over `[offset, offset + size)` of this
    /// accessor's window. The cursor does not move and no coverage is
    /// logged.
    pub fn sub_accessor_window(
        &mut self,
        offset: usize,
        size: Option<usize>,
    ) -> Result<Accessor<'a>> {
        let size = resolve_span(self.window_size, offset, size)?;
        let storage = self.shared_storage()?;
        let mut sub = Accessor::from_shared(
            storage,
            offset,
            self.base_window_offset + offset,
            size,
        );
        sub.endianness = self.endianness;
        Ok(sub)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Introspection, swap, close
// ─────────────────────────────────────────────────────────────────────────────

impl<'a> Accessor<'a> {
    /// Bytes between the cursor and the end of the window.
    #[inline]
    pub fn available_bytes(&self) -> usize {
        self.window_size - self.cursor
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Offset of this window inside its super's window (for sub-views), or
    /// the intra-page skew of the mapping (for mapped bases).
    #[inline]
    pub fn window_offset(&self) -> usize {
        self.window_offset
    }

    #[inline]
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    #[inline]
    pub fn set_endianness(&mut self, e: Endianness) {
        self.endianness = e;
    }

    #[inline]
    pub fn is_write_enabled(&self) -> bool {
        self.write_enabled
    }

    /// Position of the window start in the original file or memory region:
    /// the cumulative window offset plus the storage's file offset. Useful
    /// for diagnostics that must name absolute positions.
    pub fn root_window_offset(&self) -> u64 {
        let file_offset = match &self.backing {
            Backing::Shared(s) => s.data_file_offset(),
            Backing::Writable(_) => 0,
        };
        file_offset + self.base_window_offset as u64
    }

    /// Exchanges two accessors in place. If either side is not
    /// write-enabled, both come out read-only, so handing a built buffer to
    /// a reader cannot leak write permission.
    pub fn swap(&mut self, other: &mut Accessor<'a>) {
        std::mem::swap(self, other);
        if !self.write_enabled || !other.write_enabled {
            self.write_enabled = false;
            other.write_enabled = false;
        }
    }

    /// Closes the accessor, flushing the buffered window to the pending
    /// output file if one was opened.
    ///
    /// Dropping the accessor performs the same flush but reports failures
    /// only through the log; call `close` to observe them.
    pub fn close(mut self) -> Result<()> {
        self.flush_pending()
    }

    fn flush_pending(&mut self) -> Result<()> {
        let Some(mut file) = self.pending_output.take() else {
            return Ok(());
        };
        let window = &self.bytes()[self.base_window_offset..][..self.window_size];
        debug!("flushing {} bytes to output file", window.len());
        fileio::flush_output(&mut file, window)
    }
}

impl Drop for Accessor<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.flush_pending() {
            warn!("discarding output flush failure on drop: {e}");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Coverage surface
// ─────────────────────────────────────────────────────────────────────────────

impl Accessor<'_> {
    /// Enables or disables the coverage log.
    pub fn allow_coverage(&mut self, enabled: bool) {
        self.coverage.set_enabled(enabled);
    }

    /// Suspends implicit and explicit logging; suspensions nest.
    pub fn suspend_coverage(&mut self) {
        self.coverage.suspend();
    }

    /// Undoes one suspension; saturates at fully resumed.
    pub fn resume_coverage(&mut self) {
        self.coverage.resume();
    }

    /// Sets the usage pair attached to implicitly logged records.
    pub fn set_coverage_usage(&mut self, usage1: u64, usage2: usize) {
        self.coverage.set_usage(usage1, usage2);
    }

    /// Appends an explicit record for `[offset, offset + size)` of the
    /// window (`None`: to the window end). Records reaching outside the
    /// window are dropped silently; suspension always wins over `force`.
    pub fn add_coverage_record(
        &mut self,
        offset: usize,
        size: Option<usize>,
        usage1: u64,
        usage2: usize,
        force: CoverageForce,
    ) {
        self.coverage
            .add_record(offset, size, self.window_size, usage1, usage2, force);
    }

    /// The coverage log as currently recorded.
    pub fn coverage_records(&self) -> &[CoverageRecord] {
        self.coverage.records()
    }

    /// Drops all recorded coverage.
    pub fn clear_coverage(&mut self) {
        self.coverage.clear();
    }

    /// Sorts and merges the log with the default ordering and merge rules.
    pub fn summarize_coverage(&mut self) {
        self.coverage.summarize(
            crate::coverage::default_coverage_compare,
            crate::coverage::default_coverage_merge,
        );
    }

    /// Sorts and merges the log with caller-supplied rules: `compare`
    /// orders records, `merge` folds the second record into the first and
    /// reports whether it did.
    pub fn summarize_coverage_with<C, M>(&mut self, compare: C, merge: M)
    where
        C: FnMut(&CoverageRecord, &CoverageRecord) -> core::cmp::Ordering,
        M: FnMut(&mut CoverageRecord, &CoverageRecord) -> bool,
    {
        self.coverage.summarize(compare, merge);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Read/write core shared by the codec submodules
// ─────────────────────────────────────────────────────────────────────────────

impl<'a> Accessor<'a> {
    #[inline]
    pub(crate) fn available(&self) -> usize {
        self.window_size - self.cursor
    }

    #[inline]
    fn bytes(&self) -> &[u8] {
        match &self.backing {
            Backing::Shared(s) => s.as_slice(),
            Backing::Writable(b) => b.as_slice(),
        }
    }

    /// The accessor's whole window.
    #[inline]
    pub(crate) fn window_slice(&self) -> &[u8] {
        &self.bytes()[self.base_window_offset..][..self.window_size]
    }

    /// The unread remainder of the window.
    #[inline]
    pub(crate) fn remaining_slice(&self) -> &[u8] {
        &self.window_slice()[self.cursor..]
    }

    /// Consumes `n` bytes: bounds-check, advance, log coverage, hand back
    /// the consumed range.
    pub(crate) fn take_read(&mut self, n: usize) -> Result<&[u8]> {
        if n > self.available() {
            return Err(Error::BeyondEnd);
        }
        let start = self.cursor;
        self.cursor += n;
        self.coverage.note_read(start, n);
        let lo = self.base_window_offset + start;
        Ok(&self.bytes()[lo..lo + n])
    }

    /// Grows the window of a write accessor to `new_window_size`,
    /// zero-filling the extension. The backing buffer is extended in
    /// granularity steps when needed.
    pub(crate) fn grow_to(&mut self, new_window_size: usize) -> Result<()> {
        if !self.write_enabled {
            return Err(Error::ReadOnly);
        }
        if new_window_size <= self.window_size {
            return Ok(());
        }
        let Backing::Writable(buf) = &mut self.backing else {
            return Err(Error::ReadOnly);
        };
        buf.ensure(self.base_window_offset + new_window_size)?;
        // Bytes between the old and new window end may hold stale content
        // after a truncate; the extension must read back as zero.
        buf.as_mut_slice()[self.base_window_offset + self.window_size
            ..self.base_window_offset + new_window_size]
            .fill(0);
        self.window_size = new_window_size;
        Ok(())
    }

    /// Reserves `n` writable bytes at the cursor: permission check, grow,
    /// advance, hand back the reserved range.
    pub(crate) fn take_write(&mut self, n: usize) -> Result<&mut [u8]> {
        if !self.write_enabled {
            return Err(Error::ReadOnly);
        }
        let start = self.cursor;
        let end = start.checked_add(n).ok_or(Error::BeyondEnd)?;
        if end > self.window_size {
            self.grow_to(end)?;
        }
        self.cursor = end;
        let lo = self.base_window_offset + start;
        let Backing::Writable(buf) = &mut self.backing else {
            return Err(Error::ReadOnly);
        };
        Ok(&mut buf.as_mut_slice()[lo..lo + n])
    }

    /// Logs the implicit record for a consuming read that bypassed
    /// [`take_read`](Self::take_read).
    #[inline]
    pub(crate) fn note_read(&mut self, offset: usize, size: usize) {
        self.coverage.note_read(offset, size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_reading_bytes_window_bounds() {
        let data = [0u8; 16];
        let a = Accessor::open_reading_bytes(&data, 4, None).unwrap();
        assert_eq!(a.window_size(), 12);
        assert_eq!(a.root_window_offset(), 4);
        assert!(matches!(
            Accessor::open_reading_bytes(&data, 4, Some(13)),
            Err(Error::BeyondEnd)
        ));
        assert!(matches!(
            Accessor::open_reading_bytes(&data, 17, None),
            Err(Error::BeyondEnd)
        ));
    }

    #[test]
    fn sub_view_offsets_compose() {
        let data: Vec<u8> = (0..64).collect();
        let mut a = Accessor::open_reading_owned(data, 0, None).unwrap();
        a.seek(std::io::SeekFrom::Start(8)).unwrap();
        let mut b = a.sub_accessor_bytes(Some(16)).unwrap();
        assert_eq!(a.cursor(), 24);
        assert_eq!(b.window_offset(), 8);
        assert_eq!(b.root_window_offset(), 8);
        assert_eq!(b.window_size(), 16);
        assert_eq!(b.read_u8().unwrap(), 8);

        let c = b.sub_accessor_window(4, Some(4)).unwrap();
        assert_eq!(c.root_window_offset(), 12);
        // The explicit-window form does not move the cursor.
        assert_eq!(b.cursor(), 1);
    }

    #[test]
    fn sub_view_outlives_super() {
        let data: Vec<u8> = (0..32).collect();
        let mut a = Accessor::open_reading_owned(data, 0, None).unwrap();
        let mut b = a.sub_accessor_bytes(Some(8)).unwrap();
        drop(a);
        assert_eq!(b.read_u8().unwrap(), 0);
        assert_eq!(b.available_bytes(), 7);
    }

    #[test]
    fn sub_view_of_write_accessor_is_rejected() {
        let mut w = Accessor::open_writing_memory(0, 0).unwrap();
        assert!(matches!(
            w.sub_accessor_bytes(None),
            Err(Error::InvalidParameter)
        ));
    }

    #[test]
    fn sub_views_are_read_only() {
        let data = [1u8, 2, 3, 4];
        let mut a = Accessor::open_reading_bytes(&data, 0, None).unwrap();
        let mut b = a.sub_accessor_bytes(None).unwrap();
        assert!(matches!(b.write_u8(0), Err(Error::ReadOnly)));
    }

    #[test]
    fn swap_forces_read_only_pairing() {
        let data = [0u8; 8];
        let mut r = Accessor::open_reading_bytes(&data, 0, None).unwrap();
        let mut w = Accessor::open_writing_memory(0, 0).unwrap();
        w.write_u8(0xaa).unwrap();
        r.swap(&mut w);
        // Both handles are now read-only; the swapped-in buffer is visible.
        assert!(!r.is_write_enabled());
        assert!(!w.is_write_enabled());
        assert_eq!(r.window_size(), 1);
        assert!(matches!(w.write_u8(0), Err(Error::ReadOnly)));
        assert!(matches!(r.write_u8(0), Err(Error::ReadOnly)));
    }

    #[test]
    fn frozen_write_buffer_supports_sub_views() {
        // Declared before `w` so it outlives the accessor after the swap below.
        let data = [0u8; 1];
        let mut w = Accessor::open_writing_memory(0, 0).unwrap();
        for b in *b"abcd" {
            w.write_u8(b).unwrap();
        }
        let mut r = Accessor::open_reading_bytes(&data, 0, None).unwrap();
        r.swap(&mut w);
        // `r` now holds the built bytes, read-only.
        r.seek(std::io::SeekFrom::Start(0)).unwrap();
        let mut sub = r.sub_accessor_bytes(Some(4)).unwrap();
        let mut out = [0u8; 4];
        sub.read_bytes(&mut out).unwrap();
        assert_eq!(&out, b"abcd");
    }

    #[test]
    fn write_grows_window_and_read_back() {
        let mut w = Accessor::open_writing_memory(0, 0).unwrap();
        assert_eq!(w.window_size(), 0);
        w.write_u8(1).unwrap();
        w.write_u8(2).unwrap();
        assert_eq!(w.window_size(), 2);
        w.seek(std::io::SeekFrom::Start(0)).unwrap();
        assert_eq!(w.available_bytes(), 2);
        assert_eq!(w.read_u8().unwrap(), 1);
        assert_eq!(w.read_u8().unwrap(), 2);
    }
}
