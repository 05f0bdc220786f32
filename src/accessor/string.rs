//! String codecs over raw code units: C (NUL-terminated), Pascal
//! (length-prefixed), fixed-length, padded, and 16/32-bit wide
//! NUL-unit-terminated forms.
//!
//! No charset conversion happens anywhere here; payloads are returned as
//! the code units found in the window. Scanning forms fail with
//! `BeyondEnd` when no terminator exists inside the window, leaving the
//! cursor in place.

use crate::endian::{self, Endianness};
use crate::error::{Error, Result};

use super::Accessor;

// ─────────────────────────────────────────────────────────────────────────────
// Byte strings
// ─────────────────────────────────────────────────────────────────────────────

impl Accessor<'_> {
    /// Reads bytes up to the next NUL. The cursor moves past the
    /// terminator; the returned payload excludes it.
    pub fn read_c_string(&mut self) -> Result<Vec<u8>> {
        let remaining = self.remaining_slice();
        let len = remaining
            .iter()
            .position(|&b| b == 0)
            .ok_or(Error::BeyondEnd)?;
        let mut out = Vec::new();
        out.try_reserve_exact(len).map_err(|_| Error::OutOfMemory)?;
        out.extend_from_slice(&remaining[..len]);
        let start = self.cursor;
        self.cursor += len + 1;
        self.note_read(start, len + 1);
        Ok(out)
    }

    /// Writes `payload` followed by a NUL terminator.
    pub fn write_c_string(&mut self, payload: &[u8]) -> Result<()> {
        let dst = self.take_write(payload.len() + 1)?;
        dst[..payload.len()].copy_from_slice(payload);
        dst[payload.len()] = 0;
        Ok(())
    }

    /// Reads a length-prefixed string: one length byte, then that many
    /// payload bytes.
    pub fn read_p_string(&mut self) -> Result<Vec<u8>> {
        let remaining = self.remaining_slice();
        let &len_byte = remaining.first().ok_or(Error::BeyondEnd)?;
        let len = usize::from(len_byte);
        if remaining.len() < 1 + len {
            return Err(Error::BeyondEnd);
        }
        let mut out = Vec::new();
        out.try_reserve_exact(len).map_err(|_| Error::OutOfMemory)?;
        out.extend_from_slice(&remaining[1..1 + len]);
        let start = self.cursor;
        self.cursor += 1 + len;
        self.note_read(start, 1 + len);
        Ok(out)
    }

    /// Writes a length-prefixed string. Payloads longer than 255 bytes do
    /// not fit the length byte and are invalid.
    pub fn write_p_string(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() > 255 {
            return Err(Error::InvalidParameter);
        }
        let dst = self.take_write(1 + payload.len())?;
        dst[0] = payload.len() as u8;
        dst[1..].copy_from_slice(payload);
        Ok(())
    }

    /// Reads exactly `len` bytes; the payload may contain embedded NULs
    /// and is returned unshortened.
    pub fn read_fixed_length_string(&mut self, len: usize) -> Result<Vec<u8>> {
        if len > self.available() {
            return Err(Error::BeyondEnd);
        }
        let mut out = Vec::new();
        out.try_reserve_exact(len).map_err(|_| Error::OutOfMemory)?;
        let src = self.take_read(len)?;
        out.extend_from_slice(src);
        Ok(out)
    }

    /// Reads a `len`-byte field and strips trailing `pad` bytes from the
    /// returned payload. The cursor always moves the full `len`.
    pub fn read_padded_string(&mut self, len: usize, pad: u8) -> Result<Vec<u8>> {
        let mut out = self.read_fixed_length_string(len)?;
        let trimmed = out
            .iter()
            .rposition(|&b| b != pad)
            .map_or(0, |pos| pos + 1);
        out.truncate(trimmed);
        Ok(out)
    }

    /// Writes `payload` into a `len`-byte field, filling the tail with
    /// `pad`. A payload longer than the field is invalid.
    pub fn write_padded_string(&mut self, payload: &[u8], len: usize, pad: u8) -> Result<()> {
        if payload.len() > len {
            return Err(Error::InvalidParameter);
        }
        let dst = self.take_write(len)?;
        dst[..payload.len()].copy_from_slice(payload);
        dst[payload.len()..].fill(pad);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wide strings
// ─────────────────────────────────────────────────────────────────────────────

macro_rules! wide_string_codec {
    (
        $elem:literal, $uty:ty, $load:path, $store:path,
        $read_e:ident, $read:ident, $write_e:ident, $write:ident
    ) => {
        impl Accessor<'_> {
            #[doc = concat!(
                "Reads ", stringify!($elem), "-byte code units under `e` up to the next ",
                "zero unit. The cursor moves past the terminator; the payload excludes it."
            )]
            pub fn $read_e(&mut self, e: Endianness) -> Result<Vec<$uty>> {
                let remaining = self.remaining_slice();
                let mut count = 0usize;
                loop {
                    let lo = count * $elem;
                    if lo + $elem > remaining.len() {
                        return Err(Error::BeyondEnd);
                    }
                    if remaining[lo..lo + $elem].iter().all(|&b| b == 0) {
                        break;
                    }
                    count += 1;
                }
                let mut out: Vec<$uty> = Vec::new();
                out.try_reserve_exact(count).map_err(|_| Error::OutOfMemory)?;
                for chunk in remaining[..count * $elem].chunks_exact($elem) {
                    out.push($load(chunk, e));
                }
                let start = self.cursor;
                let consumed = (count + 1) * $elem;
                self.cursor += consumed;
                self.note_read(start, consumed);
                Ok(out)
            }

            #[doc = concat!(
                "As the endian form, with the accessor's byte order."
            )]
            pub fn $read(&mut self) -> Result<Vec<$uty>> {
                self.$read_e(self.endianness)
            }

            #[doc = concat!(
                "Writes every unit of `payload` under `e`, then a zero terminator unit. ",
                "The payload length is taken from the slice; no scan happens."
            )]
            pub fn $write_e(&mut self, payload: &[$uty], e: Endianness) -> Result<()> {
                let total = payload
                    .len()
                    .checked_add(1)
                    .and_then(|n| n.checked_mul($elem))
                    .ok_or(Error::BeyondEnd)?;
                let dst = self.take_write(total)?;
                for (chunk, &v) in dst.chunks_exact_mut($elem).zip(payload) {
                    $store(chunk, v, e);
                }
                dst[payload.len() * $elem..].fill(0);
                Ok(())
            }

            #[doc = concat!(
                "As the endian form, with the accessor's byte order."
            )]
            pub fn $write(&mut self, payload: &[$uty]) -> Result<()> {
                self.$write_e(payload, self.endianness)
            }
        }
    };
}

wide_string_codec!(2, u16, endian::load_u16, endian::store_u16,
    read_string16_endian, read_string16, write_string16_endian, write_string16);
wide_string_codec!(4, u32, endian::load_u32, endian::store_u32,
    read_string32_endian, read_string32, write_string32_endian, write_string32);

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::SeekFrom;

    #[test]
    fn c_string_round_trip_and_terminator_consumption() {
        let mut w = Accessor::open_writing_memory(0, 0).unwrap();
        w.write_c_string(b"first").unwrap();
        w.write_c_string(b"").unwrap();
        w.write_c_string(b"second").unwrap();
        w.seek(SeekFrom::Start(0)).unwrap();
        assert_eq!(w.read_c_string().unwrap(), b"first");
        assert_eq!(w.read_c_string().unwrap(), b"");
        assert_eq!(w.read_c_string().unwrap(), b"second");
        assert_eq!(w.available_bytes(), 0);
    }

    #[test]
    fn c_string_without_terminator_is_beyond_end() {
        let raw = *b"no terminator here";
        let mut a = Accessor::open_reading_bytes(&raw, 0, None).unwrap();
        assert!(matches!(a.read_c_string(), Err(Error::BeyondEnd)));
        assert_eq!(a.cursor(), 0);
    }

    #[test]
    fn p_string_round_trip_and_length_limit() {
        let mut w = Accessor::open_writing_memory(0, 0).unwrap();
        w.write_p_string(b"pascal").unwrap();
        let max = vec![0x55u8; 255];
        w.write_p_string(&max).unwrap();
        assert!(matches!(
            w.write_p_string(&vec![0u8; 256]),
            Err(Error::InvalidParameter)
        ));
        w.seek(SeekFrom::Start(0)).unwrap();
        assert_eq!(w.read_p_string().unwrap(), b"pascal");
        assert_eq!(w.read_p_string().unwrap(), max);
    }

    #[test]
    fn p_string_with_short_payload_is_beyond_end() {
        let raw = [5u8, b'a', b'b'];
        let mut a = Accessor::open_reading_bytes(&raw, 0, None).unwrap();
        assert!(matches!(a.read_p_string(), Err(Error::BeyondEnd)));
        assert_eq!(a.cursor(), 0);
    }

    #[test]
    fn fixed_length_keeps_embedded_nuls() {
        let raw = [b'a', 0, b'b', 0];
        let mut a = Accessor::open_reading_bytes(&raw, 0, None).unwrap();
        assert_eq!(a.read_fixed_length_string(4).unwrap(), raw);
        assert_eq!(a.available_bytes(), 0);
    }

    #[test]
    fn padded_string_trims_trailing_pad_only() {
        let mut w = Accessor::open_writing_memory(0, 0).unwrap();
        w.write_padded_string(b"name", 8, b' ').unwrap();
        assert_eq!(w.cursor(), 8);
        w.seek(SeekFrom::Start(0)).unwrap();
        assert_eq!(w.read_padded_string(8, b' ').unwrap(), b"name");

        // Pad bytes inside the payload survive.
        let raw = *b"a b    ";
        let mut a = Accessor::open_reading_bytes(&raw, 0, None).unwrap();
        assert_eq!(a.read_padded_string(7, b' ').unwrap(), b"a b");
        assert_eq!(a.cursor(), 7);

        // An all-pad field trims to empty.
        let raw = [b'.'; 4];
        let mut a = Accessor::open_reading_bytes(&raw, 0, None).unwrap();
        assert_eq!(a.read_padded_string(4, b'.').unwrap(), b"");
    }

    #[test]
    fn padded_write_rejects_oversized_payload() {
        let mut w = Accessor::open_writing_memory(0, 0).unwrap();
        assert!(matches!(
            w.write_padded_string(b"too long", 4, 0),
            Err(Error::InvalidParameter)
        ));
    }

    #[test]
    fn string16_round_trip_all_tags() {
        let payload: Vec<u16> = "wide\u{2603}".encode_utf16().collect();
        for e in [
            Endianness::Big,
            Endianness::Little,
            Endianness::Native,
            Endianness::Reverse,
        ] {
            let mut w = Accessor::open_writing_memory(0, 0).unwrap();
            w.write_string16_endian(&payload, e).unwrap();
            assert_eq!(w.cursor(), (payload.len() + 1) * 2);
            w.seek(SeekFrom::Start(0)).unwrap();
            assert_eq!(w.read_string16_endian(e).unwrap(), payload, "e={e}");
            assert_eq!(w.available_bytes(), 0);
        }
    }

    #[test]
    fn string16_terminator_is_a_full_unit() {
        // A single 0x00 byte inside a unit is not a terminator.
        let raw = [0x01u8, 0x00, 0x00, 0x01, 0x00, 0x00];
        let mut a = Accessor::open_reading_bytes(&raw, 0, None).unwrap();
        let got = a.read_string16_endian(Endianness::Big).unwrap();
        assert_eq!(got, [0x0100, 0x0001]);
        assert_eq!(a.cursor(), 6);
    }

    #[test]
    fn string16_odd_tail_without_terminator_is_beyond_end() {
        let raw = [0x41u8, 0x00, 0x42];
        let mut a = Accessor::open_reading_bytes(&raw, 0, None).unwrap();
        assert!(matches!(
            a.read_string16_endian(Endianness::Little),
            Err(Error::BeyondEnd)
        ));
        assert_eq!(a.cursor(), 0);
    }

    #[test]
    fn string32_round_trip() {
        let payload = [0x1f600u32, 0x41, 0x10ffff];
        let mut w = Accessor::open_writing_memory(0, 0).unwrap();
        w.write_string32_endian(&payload, Endianness::Big).unwrap();
        w.seek(SeekFrom::Start(0)).unwrap();
        assert_eq!(
            w.read_string32_endian(Endianness::Big).unwrap(),
            payload
        );
    }
}
