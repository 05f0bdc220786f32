//! E2E Test Suite 06: Write protection
//!
//! Read-only accessors reject every mutating operation, and swapping a
//! write-enabled accessor with a read-only one strips write permission
//! from both sides, so a built buffer can be handed to readers without
//! leaking mutability.

use std::io::SeekFrom;

use binview::{Accessor, Endianness, Error};

/// Every write-family operation on a swapped handle reports the read-only
/// state.
#[test]
fn swapped_handle_rejects_all_writes() {
    let guard = [0u8; 256];
    let mut r = Accessor::open_reading_bytes(&guard, 0, None).unwrap();
    let mut w = Accessor::open_writing_memory(0, 0).unwrap();
    w.write_u32(0x11223344).unwrap();

    r.swap(&mut w);
    // `r` now holds the built buffer, `w` the guard window; neither writes.
    for handle in [&mut r, &mut w] {
        handle.seek(SeekFrom::Start(0)).unwrap();
        assert!(matches!(handle.write_u8(0), Err(Error::ReadOnly)));
        assert!(matches!(handle.write_i8(0), Err(Error::ReadOnly)));
        assert!(matches!(handle.write_u16(0), Err(Error::ReadOnly)));
        assert!(matches!(handle.write_u24(0), Err(Error::ReadOnly)));
        assert!(matches!(handle.write_u32(0), Err(Error::ReadOnly)));
        assert!(matches!(handle.write_u64(0), Err(Error::ReadOnly)));
        assert!(matches!(handle.write_uint(0, 5), Err(Error::ReadOnly)));
        assert!(matches!(handle.write_int(-1, 5), Err(Error::ReadOnly)));
        assert!(matches!(
            handle.write_f32_endian(0.0, Endianness::Big),
            Err(Error::ReadOnly)
        ));
        assert!(matches!(handle.write_f64(0.0), Err(Error::ReadOnly)));
        assert!(matches!(handle.write_varint(1), Err(Error::ReadOnly)));
        assert!(matches!(handle.write_zigzag(-1), Err(Error::ReadOnly)));
        assert!(matches!(handle.write_bytes(b"x"), Err(Error::ReadOnly)));
        assert!(matches!(
            handle.write_u16_array(&[1, 2]),
            Err(Error::ReadOnly)
        ));
        assert!(matches!(
            handle.write_c_string(b"s"),
            Err(Error::ReadOnly)
        ));
        assert!(matches!(
            handle.write_p_string(b"s"),
            Err(Error::ReadOnly)
        ));
        assert!(matches!(
            handle.write_string16(&[1]),
            Err(Error::ReadOnly)
        ));
        assert!(matches!(handle.truncate(), Err(Error::ReadOnly)));
        assert!(matches!(handle.get_bytes_to_write(1), Err(Error::ReadOnly)));
    }

    // The built content is still readable through the swapped handle.
    r.seek(SeekFrom::Start(0)).unwrap();
    assert_eq!(r.read_u32().unwrap(), 0x11223344);
}

/// Swapping two write-enabled accessors keeps both writable.
#[test]
fn swap_of_two_writers_keeps_permission() {
    let mut a = Accessor::open_writing_memory(0, 0).unwrap();
    let mut b = Accessor::open_writing_memory(0, 0).unwrap();
    a.write_u8(1).unwrap();
    a.swap(&mut b);
    assert!(a.is_write_enabled());
    assert!(b.is_write_enabled());
    b.write_u8(2).unwrap();
    assert_eq!(b.window_size(), 2);
    a.write_u8(9).unwrap();
    assert_eq!(a.window_size(), 1);
}

/// Read-only accessors cannot grow: seeking past the end fails and leaves
/// the cursor alone.
#[test]
fn read_only_window_cannot_grow() {
    let data = [0u8; 8];
    let mut a = Accessor::open_reading_bytes(&data, 0, None).unwrap();
    assert!(matches!(
        a.seek(SeekFrom::Start(9)),
        Err(Error::BeyondEnd)
    ));
    assert!(matches!(a.seek(SeekFrom::End(1)), Err(Error::BeyondEnd)));
    assert_eq!(a.cursor(), 0);
    assert_eq!(a.window_size(), 8);
}
