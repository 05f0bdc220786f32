//! Filesystem plumbing for file-backed accessors.
//!
//! Two read strategies: windows at or above [`MMAP_THRESHOLD`] are mapped
//! read-only with the map offset aligned down to a page boundary (the
//! intra-page skew is reported back so the accessor can place its window),
//! smaller windows are read into a heap buffer in bounded chunks. Output
//! files are created eagerly, truncating any previous content, and receive
//! the whole buffered window in one flush.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::debug;
use memmap2::{Mmap, MmapOptions};

use crate::error::{Error, Result};

/// Smallest window opened through a file mapping rather than a buffered read.
pub const MMAP_THRESHOLD: usize = 64 * 1024;

/// Largest single transfer requested from the OS while filling a buffer.
pub(crate) const MAX_READ_CHUNK: usize = 1 << 30;

/// Options for opening output files.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Create missing parent directories before opening.
    pub create_parents: bool,
    /// Unix permission bits for newly created files; `None` keeps the
    /// process default.
    pub mode: Option<u32>,
}

/// Host page size, used to align map offsets.
pub(crate) fn page_size() -> u64 {
    // SAFETY: sysconf with a valid name has no preconditions.
    let sz = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if sz <= 0 {
        4096
    } else {
        sz as u64
    }
}

/// Size of the file at `path`, opening it read-only.
pub(crate) fn open_input(path: &Path) -> Result<(File, u64)> {
    let file = File::open(path).map_err(Error::open)?;
    let len = file.metadata().map_err(Error::host)?.len();
    Ok((file, len))
}

/// Reads exactly `size` bytes starting at `offset` into fresh heap storage.
///
/// Transfers are bounded to [`MAX_READ_CHUNK`] per call; a zero-length
/// transfer before the window is full is a host failure, not end-of-data,
/// because the window was validated against the file size beforehand.
pub(crate) fn read_window(file: &mut File, offset: u64, size: usize) -> Result<Box<[u8]>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(size.max(1))
        .map_err(|_| Error::OutOfMemory)?;
    buf.resize(size, 0);

    file.seek(SeekFrom::Start(offset)).map_err(Error::host)?;
    let mut filled = 0usize;
    while filled < size {
        let upper = (filled + MAX_READ_CHUNK).min(size);
        let n = file.read(&mut buf[filled..upper]).map_err(Error::host)?;
        if n == 0 {
            return Err(Error::Host(std::io::ErrorKind::UnexpectedEof));
        }
        filled += n;
    }
    Ok(buf.into_boxed_slice())
}

/// Maps `[offset, offset + size)` of `file` read-only.
///
/// Returns the mapping together with the page-aligned offset it actually
/// starts at and the skew of the requested offset within the first page.
/// The mapping spans `size + skew` bytes so the logical window begins
/// `skew` bytes into it.
pub(crate) fn map_window(file: &File, offset: u64, size: usize) -> Result<(Mmap, u64, usize)> {
    let skew = (offset % page_size()) as usize;
    let map_offset = offset - skew as u64;
    let map_len = size + skew;
    // SAFETY: the mapping is private and read-only; the file stays open for
    // the lifetime of the map.
    let map = unsafe {
        MmapOptions::new()
            .offset(map_offset)
            .len(map_len)
            .map(file)
            .map_err(Error::host)?
    };
    debug!(
        "mapped {} bytes at file offset {} (skew {})",
        map_len, map_offset, skew
    );
    Ok((map, map_offset, skew))
}

/// Creates (or truncates) the output file at `path`.
pub(crate) fn create_output(path: &Path, options: WriteOptions) -> Result<File> {
    if options.create_parents {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(Error::host)?;
            }
        }
    }
    let mut open = OpenOptions::new();
    open.write(true).create(true).truncate(true);
    #[cfg(unix)]
    if let Some(mode) = options.mode {
        use std::os::unix::fs::OpenOptionsExt;
        open.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = options.mode;
    let file = open.open(path).map_err(Error::open)?;
    debug!("created output file {}", path.display());
    Ok(file)
}

/// Writes `bytes` to `file` as one block.
pub(crate) fn flush_output(file: &mut File, bytes: &[u8]) -> Result<()> {
    file.write_all(bytes).map_err(Error::write)?;
    file.flush().map_err(Error::write)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn page_size_is_sane() {
        let p = page_size();
        assert!(p >= 512 && p.is_power_of_two());
    }

    #[test]
    fn read_window_reads_exact_span() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&[0u8, 1, 2, 3, 4, 5, 6, 7]).unwrap();
        let (mut file, len) = open_input(tmp.path()).unwrap();
        assert_eq!(len, 8);
        let bytes = read_window(&mut file, 2, 4).unwrap();
        assert_eq!(&bytes[..], &[2, 3, 4, 5]);
    }

    #[test]
    fn read_window_zero_size_is_empty() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"x").unwrap();
        let (mut file, _) = open_input(tmp.path()).unwrap();
        let bytes = read_window(&mut file, 0, 0).unwrap();
        assert!(bytes.is_empty());
    }

    #[test]
    fn map_window_reports_skew() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        let page = page_size() as usize;
        let payload: Vec<u8> = (0..page + 64).map(|i| i as u8).collect();
        tmp.write_all(&payload).unwrap();
        let (file, _) = open_input(tmp.path()).unwrap();

        // Offset inside the first page: the map starts at 0 with a skew.
        let (map, map_offset, skew) = map_window(&file, 3, 16).unwrap();
        assert_eq!(map_offset, 0);
        assert_eq!(skew, 3);
        assert_eq!(&map[skew..skew + 16], &payload[3..19]);

        // Page-aligned offset: no skew.
        let (map, map_offset, skew) = map_window(&file, page as u64, 8).unwrap();
        assert_eq!(map_offset, page as u64);
        assert_eq!(skew, 0);
        assert_eq!(&map[..8], &payload[page..page + 8]);
    }

    #[test]
    fn create_output_truncates_and_makes_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep/nested/out.bin");
        let mut file = create_output(
            &path,
            WriteOptions {
                create_parents: true,
                mode: None,
            },
        )
        .unwrap();
        flush_output(&mut file, b"hello").unwrap();
        drop(file);
        // Reopen: previous content is gone.
        let mut file = create_output(&path, WriteOptions::default()).unwrap();
        flush_output(&mut file, b"hi").unwrap();
        drop(file);
        assert_eq!(std::fs::read(&path).unwrap(), b"hi");
    }
}
