//! E2E Test Suite 05: Nested sub-views
//!
//! Sub-views share their base's storage and compose their offsets
//! additively, so the absolute position of any view is its super's
//! absolute position plus its own window offset — however deep the chain.

use std::io::SeekFrom;

use binview::{Accessor, Error};

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: absolute offsets compose through the chain
// ─────────────────────────────────────────────────────────────────────────────

/// Base opened at offset 1, sub-view at offset 1 of the base, sub-view at
/// offset 1 of that: absolute offsets 1, 2, 3.
#[test]
fn chained_offsets_compose_additively() {
    let data = vec![0u8; 65_536];
    let mut a = Accessor::open_reading_bytes(&data, 1, None).unwrap();
    assert_eq!(a.root_window_offset(), 1);

    let mut b = a.sub_accessor_window(1, None).unwrap();
    assert_eq!(b.root_window_offset(), 2);
    assert_eq!(
        b.root_window_offset(),
        a.root_window_offset() + b.window_offset() as u64
    );

    let c = b.sub_accessor_window(1, None).unwrap();
    assert_eq!(c.root_window_offset(), 3);
    assert_eq!(
        c.root_window_offset(),
        b.root_window_offset() + c.window_offset() as u64
    );

    // Sizes shrink by one per level.
    assert_eq!(a.window_size(), 65_535);
    assert_eq!(b.window_size(), 65_534);
    assert_eq!(c.window_size(), 65_533);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: cursor-consuming sub-views
// ─────────────────────────────────────────────────────────────────────────────

/// The consuming form takes bytes from the super's cursor, logs one
/// coverage record against the super, and leaves the sub-view's own log
/// disabled.
#[test]
fn consuming_sub_view_advances_super() {
    let data: Vec<u8> = (0..=255).collect();
    let mut a = Accessor::open_reading_bytes(&data, 0, None).unwrap();
    a.allow_coverage(true);
    a.seek(SeekFrom::Start(16)).unwrap();

    let mut b = a.sub_accessor_bytes(Some(32)).unwrap();
    assert_eq!(a.cursor(), 48);
    assert_eq!(a.coverage_records().len(), 1);
    assert_eq!(
        (a.coverage_records()[0].offset, a.coverage_records()[0].size),
        (16, 32)
    );

    // The sub-view sees the right bytes and starts with coverage off.
    assert_eq!(b.read_u8().unwrap(), 16);
    assert!(b.coverage_records().is_empty());

    // Until-end form consumes the remainder.
    let c = a.sub_accessor_bytes(None).unwrap();
    assert_eq!(c.window_size(), 208);
    assert_eq!(a.available_bytes(), 0);
}

/// Requesting more bytes than remain fails without moving the cursor.
#[test]
fn oversized_sub_view_is_rejected() {
    let data = [0u8; 8];
    let mut a = Accessor::open_reading_bytes(&data, 0, None).unwrap();
    a.seek(SeekFrom::Start(6)).unwrap();
    assert!(matches!(
        a.sub_accessor_bytes(Some(3)),
        Err(Error::BeyondEnd)
    ));
    assert_eq!(a.cursor(), 6);
    assert!(matches!(
        a.sub_accessor_window(4, Some(5)),
        Err(Error::BeyondEnd)
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: lifetime of the shared base
// ─────────────────────────────────────────────────────────────────────────────

/// Dropping the base (and intermediate views) before the deepest view
/// leaves the storage alive until the last handle goes.
#[test]
fn deep_view_survives_ancestors() {
    let data: Vec<u8> = (0..64).collect();
    let mut a = Accessor::open_reading_owned(data, 0, None).unwrap();
    let mut b = a.sub_accessor_window(8, Some(32)).unwrap();
    let mut c = b.sub_accessor_window(8, Some(16)).unwrap();
    drop(a);
    drop(b);
    assert_eq!(c.root_window_offset(), 16);
    assert_eq!(c.read_u8().unwrap(), 16);
    let tail = c.read_allocated_bytes(15).unwrap();
    assert_eq!(tail, (17..32).collect::<Vec<u8>>());
}

/// Sub-views inherit the super's byte order at creation time.
#[test]
fn sub_view_inherits_endianness() {
    use binview::Endianness;
    let data = [0x12u8, 0x34, 0x56, 0x78];
    let mut a = Accessor::open_reading_bytes(&data, 0, None).unwrap();
    a.set_endianness(Endianness::Big);
    let mut b = a.sub_accessor_window(0, None).unwrap();
    assert_eq!(b.endianness(), Endianness::Big);
    assert_eq!(b.read_u16().unwrap(), 0x1234);
}
