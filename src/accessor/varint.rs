//! Variable-length integers: LEB128 unsigned and zig-zag signed.
//!
//! Encoded least-significant group first, seven payload bits per byte, high
//! bit set on every byte except the last. The maximum encoded size follows
//! from the accumulator width rather than being a fixed constant.

use crate::error::{Error, Result};

use super::Accessor;

/// Longest valid encoding for a 64-bit accumulator: one byte per started
/// 7-bit group.
pub const MAX_VARINT_BYTES: usize = (u64::BITS as usize + 6) / 7;

impl Accessor<'_> {
    /// Reads an LEB128 unsigned integer.
    ///
    /// Fails with `InvalidReadData` when the continuation bit is still set
    /// after [`MAX_VARINT_BYTES`] groups, and with `BeyondEnd` when the
    /// window ends before the value terminates. The cursor moves only on
    /// success.
    pub fn read_varint(&mut self) -> Result<u64> {
        let window = self.remaining_slice();
        let mut result = 0u64;
        let mut consumed = 0usize;
        loop {
            let Some(&byte) = window.get(consumed) else {
                return Err(Error::BeyondEnd);
            };
            result |= u64::from(byte & 0x7f) << (consumed * 7);
            consumed += 1;
            if byte & 0x80 == 0 {
                break;
            }
            if consumed == MAX_VARINT_BYTES {
                return Err(Error::InvalidReadData);
            }
        }
        let start = self.cursor;
        self.cursor += consumed;
        self.note_read(start, consumed);
        Ok(result)
    }

    /// Writes `value` as an LEB128 unsigned integer; 1 to
    /// [`MAX_VARINT_BYTES`] bytes.
    pub fn write_varint(&mut self, value: u64) -> Result<()> {
        let mut scratch = [0u8; MAX_VARINT_BYTES];
        let mut v = value;
        let mut len = 0usize;
        loop {
            let mut byte = (v & 0x7f) as u8;
            v >>= 7;
            if v != 0 {
                byte |= 0x80;
            }
            scratch[len] = byte;
            len += 1;
            if v == 0 {
                break;
            }
        }
        self.take_write(len)?.copy_from_slice(&scratch[..len]);
        Ok(())
    }

    /// Reads a zig-zag-coded signed integer from an unsigned varint.
    pub fn read_zigzag(&mut self) -> Result<i64> {
        let u = self.read_varint()?;
        Ok(((u >> 1) as i64) ^ -((u & 1) as i64))
    }

    /// Writes `value` zig-zag-coded as an unsigned varint, keeping small
    /// magnitudes short regardless of sign.
    pub fn write_zigzag(&mut self, value: i64) -> Result<()> {
        let zz = ((value << 1) ^ (value >> 63)) as u64;
        self.write_varint(zz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::SeekFrom;

    #[test]
    fn max_encoding_length_follows_accumulator_width() {
        assert_eq!(MAX_VARINT_BYTES, 10);
    }

    #[test]
    fn known_encodings() {
        let mut w = Accessor::open_writing_memory(0, 0).unwrap();
        w.write_varint(0).unwrap();
        w.write_varint(127).unwrap();
        w.write_varint(128).unwrap();
        w.write_varint(300).unwrap();
        assert_eq!(w.cursor(), 1 + 1 + 2 + 2);
        w.seek(SeekFrom::Start(0)).unwrap();
        let mut raw = [0u8; 6];
        w.read_bytes(&mut raw).unwrap();
        assert_eq!(raw, [0x00, 0x7f, 0x80, 0x01, 0xac, 0x02]);
    }

    #[test]
    fn round_trip_across_group_boundaries() {
        let mut w = Accessor::open_writing_memory(0, 0).unwrap();
        let samples = [
            0u64,
            1,
            0x7f,
            0x80,
            0x3fff,
            0x4000,
            u64::from(u32::MAX),
            u64::MAX - 1,
            u64::MAX,
        ];
        for &v in &samples {
            w.write_varint(v).unwrap();
        }
        w.seek(SeekFrom::Start(0)).unwrap();
        for &v in &samples {
            assert_eq!(w.read_varint().unwrap(), v);
        }
        assert_eq!(w.available_bytes(), 0);
    }

    #[test]
    fn u64_max_takes_ten_bytes() {
        let mut w = Accessor::open_writing_memory(0, 0).unwrap();
        w.write_varint(u64::MAX).unwrap();
        assert_eq!(w.cursor(), MAX_VARINT_BYTES);
    }

    #[test]
    fn unterminated_varint_is_invalid_data() {
        let raw = [0xffu8; 16];
        let mut a = Accessor::open_reading_bytes(&raw, 0, None).unwrap();
        assert!(matches!(a.read_varint(), Err(Error::InvalidReadData)));
        assert_eq!(a.cursor(), 0);
    }

    #[test]
    fn truncated_varint_is_beyond_end() {
        let raw = [0x80u8, 0x80];
        let mut a = Accessor::open_reading_bytes(&raw, 0, None).unwrap();
        assert!(matches!(a.read_varint(), Err(Error::BeyondEnd)));
        assert_eq!(a.cursor(), 0);
    }

    #[test]
    fn zigzag_round_trip_and_small_magnitudes() {
        let mut w = Accessor::open_writing_memory(0, 0).unwrap();
        let samples = [0i64, -1, 1, -2, 2, i64::MIN, i64::MAX, -123456789];
        for &v in &samples {
            w.write_zigzag(v).unwrap();
        }
        w.seek(SeekFrom::Start(0)).unwrap();
        for &v in &samples {
            assert_eq!(w.read_zigzag().unwrap(), v);
        }

        // -1 is one byte under zig-zag.
        let mut w = Accessor::open_writing_memory(0, 0).unwrap();
        w.write_zigzag(-1).unwrap();
        assert_eq!(w.cursor(), 1);
        w.seek(SeekFrom::Start(0)).unwrap();
        assert_eq!(w.read_u8().unwrap(), 0x01);
    }
}
