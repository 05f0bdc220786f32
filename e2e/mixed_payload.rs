//! E2E Test Suite 03: Mixed payload round-trip
//!
//! Builds a container-like buffer — a large random block followed by a
//! Pascal string, a C string, and a 16-bit wide string — then reads every
//! field back and checks the window is fully consumed.

use std::io::SeekFrom;

use binview::{Accessor, Endianness};
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

/// Prime-sized random block + three string conventions, written then read
/// back in order; nothing may remain in the window afterwards.
#[test]
fn block_and_strings_round_trip() {
    let mut rng = XorShiftRng::seed_from_u64(0x5eed);
    let block: Vec<u8> = (0..65_521).map(|_| rng.gen()).collect();
    let pascal = b"pascal payload".to_vec();
    let cstr = b"c payload, NUL terminated".to_vec();
    let wide: Vec<u16> = "wide payload \u{2603}".encode_utf16().collect();

    let mut w = Accessor::open_writing_memory(0, 0).expect("open writer");
    w.write_bytes(&block).unwrap();
    w.write_p_string(&pascal).unwrap();
    w.write_c_string(&cstr).unwrap();
    w.write_string16_endian(&wide, Endianness::Big).unwrap();

    let expected_total =
        block.len() + (1 + pascal.len()) + (cstr.len() + 1) + (wide.len() + 1) * 2;
    assert_eq!(w.window_size(), expected_total);

    w.seek(SeekFrom::Start(0)).unwrap();
    let got_block = w.read_allocated_bytes(block.len()).unwrap();
    assert_eq!(got_block, block);
    assert_eq!(w.read_p_string().unwrap(), pascal);
    assert_eq!(w.read_c_string().unwrap(), cstr);
    assert_eq!(w.read_string16_endian(Endianness::Big).unwrap(), wide);
    assert_eq!(w.available_bytes(), 0);
}

/// The same payload parses identically after the buffer is frozen into a
/// read-only view and consumed through sub-views.
#[test]
fn frozen_buffer_parses_through_sub_views() {
    let mut rng = XorShiftRng::seed_from_u64(77);
    let block: Vec<u8> = (0..4096).map(|_| rng.gen()).collect();

    // Declared before `w` so it outlives the accessor after the swap below.
    let guard = [0u8; 1];

    let mut w = Accessor::open_writing_memory(0, 0).unwrap();
    w.write_u32_endian(block.len() as u32, Endianness::Little)
        .unwrap();
    w.write_bytes(&block).unwrap();
    w.write_c_string(b"trailer").unwrap();

    // Freeze: swap with a throwaway read accessor.
    let mut r = Accessor::open_reading_bytes(&guard, 0, None).unwrap();
    r.swap(&mut w);
    r.seek(SeekFrom::Start(0)).unwrap();

    let len = r.read_u32_endian(Endianness::Little).unwrap() as usize;
    let mut body = r.sub_accessor_bytes(Some(len)).unwrap();
    assert_eq!(body.window_size(), len);
    let got = body.read_allocated_bytes(len).unwrap();
    assert_eq!(got, block);
    assert_eq!(r.read_c_string().unwrap(), b"trailer");
    assert_eq!(r.available_bytes(), 0);
}

/// Interleaved varints and zig-zags inside a longer payload keep their
/// framing.
#[test]
fn varint_framing_inside_payload() {
    let values: Vec<u64> = vec![0, 1, 127, 128, 300, 1 << 20, u64::MAX];
    let signed: Vec<i64> = vec![0, -1, 63, -64, i64::MIN, i64::MAX];

    let mut w = Accessor::open_writing_memory(0, 0).unwrap();
    w.write_varint(values.len() as u64).unwrap();
    for &v in &values {
        w.write_varint(v).unwrap();
    }
    for &v in &signed {
        w.write_zigzag(v).unwrap();
    }

    w.seek(SeekFrom::Start(0)).unwrap();
    let n = w.read_varint().unwrap() as usize;
    assert_eq!(n, values.len());
    for &v in &values {
        assert_eq!(w.read_varint().unwrap(), v);
    }
    for &v in &signed {
        assert_eq!(w.read_zigzag().unwrap(), v);
    }
    assert_eq!(w.available_bytes(), 0);
}
