//! E2E Test Suite 07: File backends
//!
//! Exercises the on-disk lifecycle: building through a write accessor that
//! flushes at close, reopening through the buffered and memory-mapped read
//! paths (including an unaligned window that forces a page skew), and
//! direct window snapshots.

use std::io::SeekFrom;

use binview::{Accessor, Endianness, Error, WriteOptions, MMAP_THRESHOLD};
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn payload(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = XorShiftRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen()).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: write accessor flushes at close
// ─────────────────────────────────────────────────────────────────────────────

/// Bytes written through a file-backed write accessor appear on disk after
/// `close`, and reopening them round-trips the content.
#[test]
fn write_close_reopen_round_trip() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("built.bin");
    let body = payload(10_000, 1);

    let mut w = Accessor::open_writing_file(&path, WriteOptions::default(), 0, 0).unwrap();
    w.write_u32_endian(body.len() as u32, Endianness::Big).unwrap();
    w.write_bytes(&body).unwrap();
    w.close().unwrap();

    let mut r = Accessor::open_reading_file(&path, 0, None).unwrap();
    assert_eq!(r.window_size(), 4 + body.len());
    let len = r.read_u32_endian(Endianness::Big).unwrap() as usize;
    assert_eq!(len, body.len());
    assert_eq!(r.read_allocated_bytes(len).unwrap(), body);
    assert_eq!(r.available_bytes(), 0);
}

/// Opening a writing file truncates an existing file even when nothing is
/// written before close.
#[test]
fn open_writing_file_truncates() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truncated.bin");
    std::fs::write(&path, b"previous content").unwrap();

    let w = Accessor::open_writing_file(&path, WriteOptions::default(), 0, 0).unwrap();
    w.close().unwrap();
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: buffered and mapped read windows
// ─────────────────────────────────────────────────────────────────────────────

/// A small window takes the buffered path; its absolute offsets still
/// report the position in the file.
#[test]
fn small_window_is_buffered_with_file_offsets() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("small.bin");
    let body = payload(4096, 2);
    std::fs::write(&path, &body).unwrap();

    let mut r = Accessor::open_reading_file(&path, 100, Some(200)).unwrap();
    assert_eq!(r.window_size(), 200);
    assert_eq!(r.root_window_offset(), 100);
    assert_eq!(r.read_allocated_bytes(200).unwrap(), &body[100..300]);
}

/// A window at or above the mapping threshold, starting inside a page,
/// reads the same bytes and reports the same absolute offsets as the
/// buffered path.
#[test]
fn large_unaligned_window_maps_with_skew() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("large.bin");
    let body = payload(MMAP_THRESHOLD * 2 + 4096, 3);
    std::fs::write(&path, &body).unwrap();

    let offset = 3u64; // unaligned: forces an intra-page skew
    let size = MMAP_THRESHOLD + 17;
    let mut r = Accessor::open_reading_file(&path, offset, Some(size as u64)).unwrap();
    assert_eq!(r.window_size(), size);
    assert_eq!(r.root_window_offset(), offset);

    let got = r.read_allocated_bytes(size).unwrap();
    assert_eq!(got, &body[3..3 + size]);

    // Sub-views over a mapped base keep absolute offsets consistent.
    r.seek(SeekFrom::Start(100)).unwrap();
    let sub = r.sub_accessor_bytes(Some(64)).unwrap();
    assert_eq!(sub.root_window_offset(), offset + 100);
}

/// Windows reaching past the file fail to open; a zero-length window at
/// the end opens empty.
#[test]
fn window_bounds_against_file_size() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bounds.bin");
    std::fs::write(&path, [0u8; 100]).unwrap();

    assert!(matches!(
        Accessor::open_reading_file(&path, 101, None),
        Err(Error::BeyondEnd)
    ));
    assert!(matches!(
        Accessor::open_reading_file(&path, 0, Some(101)),
        Err(Error::BeyondEnd)
    ));
    let r = Accessor::open_reading_file(&path, 100, None).unwrap();
    assert_eq!(r.window_size(), 0);
    assert_eq!(r.available_bytes(), 0);

    assert!(matches!(
        Accessor::open_reading_file(dir.path().join("absent.bin"), 0, None),
        Err(Error::Open(std::io::ErrorKind::NotFound))
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: window snapshots
// ─────────────────────────────────────────────────────────────────────────────

/// `write_to_file` snapshots a sub-range of the window without touching
/// the accessor, creating parent directories on request.
#[test]
fn snapshot_window_to_file() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let body = payload(1024, 4);
    let mut a = Accessor::open_reading_owned(body.clone(), 0, None).unwrap();
    a.seek(SeekFrom::Start(17)).unwrap();

    let out = dir.path().join("nested/dir/snapshot.bin");
    a.write_to_file(
        &out,
        WriteOptions {
            create_parents: true,
            mode: None,
        },
        128,
        Some(256),
    )
    .unwrap();

    assert_eq!(a.cursor(), 17);
    assert_eq!(std::fs::read(&out).unwrap(), &body[128..384]);

    // A snapshot reaching past the window is rejected before any file work.
    assert!(matches!(
        a.write_to_file(&out, WriteOptions::default(), 1000, Some(100)),
        Err(Error::BeyondEnd)
    ));
}

/// A write accessor can snapshot its own buffered window while staying
/// writable.
#[test]
fn writer_snapshot_keeps_building() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("partial.bin");

    let mut w = Accessor::open_writing_memory(0, 0).unwrap();
    w.write_c_string(b"first half").unwrap();
    w.write_to_file(&out, WriteOptions::default(), 0, None).unwrap();
    assert_eq!(std::fs::read(&out).unwrap(), b"first half\0");

    w.write_c_string(b"second half").unwrap();
    assert!(w.is_write_enabled());
    assert_eq!(w.window_size(), 11 + 12);
}
