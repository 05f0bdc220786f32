//! E2E Test Suite 02: Float bit patterns
//!
//! Floats travel as bit-pattern copies of the same-width unsigned
//! integers, so round-trips must be bit-exact for every byte-order tag —
//! including values that would change under numeric conversion, NaNs with
//! payloads, and signed zeros.

use std::io::SeekFrom;

use binview::{Accessor, Endianness};

const TAGS: [Endianness; 4] = [
    Endianness::Big,
    Endianness::Little,
    Endianness::Native,
    Endianness::Reverse,
];

/// Negative high-precision literal round-trips bit-exact at both widths
/// under all four byte-order tags.
#[test]
fn high_precision_round_trip() {
    #[allow(clippy::excessive_precision)]
    let f = -0.1234567890123456789f32;
    #[allow(clippy::excessive_precision)]
    let d = -0.1234567890123456789f64;

    for e in TAGS {
        let mut w = Accessor::open_writing_memory(0, 0).unwrap();
        w.write_f32_endian(f, e).unwrap();
        w.write_f64_endian(d, e).unwrap();
        w.seek(SeekFrom::Start(0)).unwrap();
        assert_eq!(w.read_f32_endian(e).unwrap().to_bits(), f.to_bits(), "e={e}");
        assert_eq!(w.read_f64_endian(e).unwrap().to_bits(), d.to_bits(), "e={e}");
        assert_eq!(w.available_bytes(), 0);
    }
}

/// Special values: signed zero, infinities, and a NaN with a payload all
/// survive unchanged.
#[test]
fn special_values_survive() {
    let f32s = [
        0.0f32,
        -0.0,
        f32::INFINITY,
        f32::NEG_INFINITY,
        f32::from_bits(0x7fc0_dead),
    ];
    let f64s = [
        0.0f64,
        -0.0,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::from_bits(0x7ff8_0000_dead_beef),
    ];

    for e in TAGS {
        let mut w = Accessor::open_writing_memory(0, 0).unwrap();
        for &v in &f32s {
            w.write_f32_endian(v, e).unwrap();
        }
        for &v in &f64s {
            w.write_f64_endian(v, e).unwrap();
        }
        w.seek(SeekFrom::Start(0)).unwrap();
        for &v in &f32s {
            assert_eq!(w.read_f32_endian(e).unwrap().to_bits(), v.to_bits());
        }
        for &v in &f64s {
            assert_eq!(w.read_f64_endian(e).unwrap().to_bits(), v.to_bits());
        }
    }
}

/// A float written big-endian reads back as the byte-reversed pattern when
/// decoded little-endian.
#[test]
fn float_bytes_follow_integer_order() {
    let mut w = Accessor::open_writing_memory(0, 0).unwrap();
    w.write_f32_endian(1.0, Endianness::Big).unwrap();
    w.seek(SeekFrom::Start(0)).unwrap();
    let mut raw = [0u8; 4];
    w.read_bytes(&mut raw).unwrap();
    assert_eq!(raw, [0x3f, 0x80, 0x00, 0x00]);

    w.seek(SeekFrom::Start(0)).unwrap();
    let as_le = w.read_f32_endian(Endianness::Little).unwrap();
    assert_eq!(as_le.to_bits(), 0x0000_803f);
}
