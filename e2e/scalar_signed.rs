//! E2E Test Suite 01: Scalar widths and sign extension
//!
//! Builds a buffer through the width-specialised unsigned writers plus the
//! generic N-byte writer, then reads everything back through the signed
//! counterparts, checking the sign extension at every width including the
//! odd 7-byte case.

use std::io::SeekFrom;

use binview::{Accessor, Endianness, Error};

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: unsigned writes, signed read-back
// ─────────────────────────────────────────────────────────────────────────────

/// High-bit-set values written unsigned come back correctly negative when
/// read through the signed routines of the same widths.
#[test]
fn unsigned_writes_read_back_signed() {
    let mut w = Accessor::open_writing_memory(0, 0).expect("open writer");

    w.write_u8(0x87).unwrap();
    w.write_u16(0x8765).unwrap();
    w.write_u24(0x876543).unwrap();
    w.write_u32(0x87654321).unwrap();
    w.write_u64(0x8765_4321_0fed_cba9).unwrap();
    w.write_uint(0x87_6543_210f_edcb, 7).unwrap();

    w.seek(SeekFrom::Start(0)).unwrap();
    assert_eq!(w.read_i8().unwrap(), -0x79);
    assert_eq!(w.read_i16().unwrap(), -0x789b);
    assert_eq!(w.read_i24().unwrap(), -0x789abd);
    assert_eq!(w.read_i32().unwrap(), -0x789abcdf);
    assert_eq!(w.read_i64().unwrap(), -0x789a_bcde_f012_3457);
    assert_eq!(w.read_int(7).unwrap(), -0x78_9abc_def0_1235);
    assert_eq!(w.available_bytes(), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: round-trip at every width for every byte order
// ─────────────────────────────────────────────────────────────────────────────

/// write → seek(0) → read reproduces the value at each width 1..=8 under
/// every byte-order tag.
#[test]
fn round_trip_every_width_and_tag() {
    let tags = [
        Endianness::Big,
        Endianness::Little,
        Endianness::Native,
        Endianness::Reverse,
    ];
    for e in tags {
        for n in 1..=8usize {
            let value = 0xa5e1_9d47_3c0b_f268u64 & mask(n);
            let mut w = Accessor::open_writing_memory(0, 0).unwrap();
            w.write_uint_endian(value, n, e).unwrap();
            w.seek(SeekFrom::Start(0)).unwrap();
            assert_eq!(w.read_uint_endian(n, e).unwrap(), value, "n={n} e={e}");
        }
    }
}

/// Reading with the opposite byte order yields the byte-swapped value.
#[test]
fn opposite_order_reads_swapped_value() {
    let mut w = Accessor::open_writing_memory(0, 0).unwrap();
    w.write_u32_endian(0x0102_0304, Endianness::Big).unwrap();
    w.seek(SeekFrom::Start(0)).unwrap();
    assert_eq!(
        w.read_u32_endian(Endianness::Little).unwrap(),
        0x0403_0201
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: window-end behaviour
// ─────────────────────────────────────────────────────────────────────────────

/// Seeking to the very end then reading one byte fails; one before the end
/// succeeds.
#[test]
fn end_of_window_boundary() {
    let data = [0x5au8; 16];
    let mut a = Accessor::open_reading_bytes(&data, 0, None).unwrap();
    a.seek(SeekFrom::End(0)).unwrap();
    assert!(matches!(a.read_u8(), Err(Error::BeyondEnd)));
    a.seek(SeekFrom::End(-1)).unwrap();
    assert_eq!(a.read_u8().unwrap(), 0x5a);
}

/// After writing two values totalling `s` bytes and seeking back to zero,
/// exactly `s` bytes are available.
#[test]
fn available_bytes_after_rewind() {
    let mut w = Accessor::open_writing_memory(0, 0).unwrap();
    w.write_u32(7).unwrap();
    w.write_u16(9).unwrap();
    w.seek(SeekFrom::Start(0)).unwrap();
    assert_eq!(w.available_bytes(), 6);
}

fn mask(n: usize) -> u64 {
    if n >= 8 {
        u64::MAX
    } else {
        (1u64 << (n * 8)) - 1
    }
}
