//! Element arrays and raw byte blocks.
//!
//! Array reads allocate the result buffer, then decode element by element
//! under the requested byte order; array writes are the mirror image. Raw
//! block transfers come in two shapes: into a caller slice, or into a
//! freshly allocated buffer handed to the caller. The endian block variants
//! reverse the whole block when the byte order is the reverse of the host,
//! so an N-byte big-endian blob can be consumed on a little-endian host in
//! one move.
//!
//! Each successful operation logs a single coverage record spanning the
//! whole transfer.

use crate::endian::{self, Endianness};
use crate::error::{Error, Result};

use super::Accessor;

// ─────────────────────────────────────────────────────────────────────────────
// Raw byte blocks
// ─────────────────────────────────────────────────────────────────────────────

impl Accessor<'_> {
    /// Fills `dst` from the cursor.
    pub fn read_bytes(&mut self, dst: &mut [u8]) -> Result<()> {
        let src = self.take_read(dst.len())?;
        dst.copy_from_slice(src);
        Ok(())
    }

    /// Fills `dst` from the cursor, reversing it afterwards when `e` is the
    /// byte-reverse of the host.
    pub fn read_bytes_endian(&mut self, dst: &mut [u8], e: Endianness) -> Result<()> {
        self.read_bytes(dst)?;
        if e.is_reverse_of_host() {
            dst.reverse();
        }
        Ok(())
    }

    /// Reads `count` bytes into a freshly allocated buffer.
    pub fn read_allocated_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        if count > self.available() {
            return Err(Error::BeyondEnd);
        }
        let mut out = Vec::new();
        out.try_reserve_exact(count).map_err(|_| Error::BeyondEnd)?;
        let src = self.take_read(count)?;
        out.extend_from_slice(src);
        Ok(out)
    }

    /// As [`read_allocated_bytes`](Self::read_allocated_bytes), reversed
    /// when `e` is the byte-reverse of the host.
    pub fn read_allocated_bytes_endian(&mut self, count: usize, e: Endianness) -> Result<Vec<u8>> {
        let mut out = self.read_allocated_bytes(count)?;
        if e.is_reverse_of_host() {
            out.reverse();
        }
        Ok(out)
    }

    /// Writes all of `src` at the cursor.
    pub fn write_bytes(&mut self, src: &[u8]) -> Result<()> {
        self.take_write(src.len())?.copy_from_slice(src);
        Ok(())
    }

    /// Writes all of `src`, reversed when `e` is the byte-reverse of the
    /// host.
    pub fn write_bytes_endian(&mut self, src: &[u8], e: Endianness) -> Result<()> {
        let dst = self.take_write(src.len())?;
        dst.copy_from_slice(src);
        if e.is_reverse_of_host() {
            dst.reverse();
        }
        Ok(())
    }

    /// Reads `count` bytes into a freshly allocated buffer; byte order does
    /// not apply at width 1, so this is plain block allocation.
    pub fn read_u8_array(&mut self, count: usize) -> Result<Vec<u8>> {
        if count > self.available() {
            return Err(Error::BeyondEnd);
        }
        let mut out = Vec::new();
        out.try_reserve_exact(count).map_err(|_| Error::OutOfMemory)?;
        let src = self.take_read(count)?;
        out.extend_from_slice(src);
        Ok(out)
    }

    pub fn write_u8_array(&mut self, values: &[u8]) -> Result<()> {
        self.write_bytes(values)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Element arrays
// ─────────────────────────────────────────────────────────────────────────────

#[inline]
fn load_i16(buf: &[u8], e: Endianness) -> i16 {
    endian::load_u16(buf, e) as i16
}

#[inline]
fn store_i16(buf: &mut [u8], v: i16, e: Endianness) {
    endian::store_u16(buf, v as u16, e);
}

#[inline]
fn load_i32(buf: &[u8], e: Endianness) -> i32 {
    endian::load_u32(buf, e) as i32
}

#[inline]
fn store_i32(buf: &mut [u8], v: i32, e: Endianness) {
    endian::store_u32(buf, v as u32, e);
}

#[inline]
fn load_i64(buf: &[u8], e: Endianness) -> i64 {
    endian::load_u64(buf, e) as i64
}

#[inline]
fn store_i64(buf: &mut [u8], v: i64, e: Endianness) {
    endian::store_u64(buf, v as u64, e);
}

#[inline]
fn load_i24(buf: &[u8], e: Endianness) -> i32 {
    endian::sign_extend(u64::from(endian::load_u24(buf, e)), 3) as i32
}

#[inline]
fn store_i24(buf: &mut [u8], v: i32, e: Endianness) {
    endian::store_u24(buf, v as u32, e);
}

#[inline]
fn load_f32(buf: &[u8], e: Endianness) -> f32 {
    f32::from_bits(endian::load_u32(buf, e))
}

#[inline]
fn store_f32(buf: &mut [u8], v: f32, e: Endianness) {
    endian::store_u32(buf, v.to_bits(), e);
}

#[inline]
fn load_f64(buf: &[u8], e: Endianness) -> f64 {
    f64::from_bits(endian::load_u64(buf, e))
}

#[inline]
fn store_f64(buf: &mut [u8], v: f64, e: Endianness) {
    endian::store_u64(buf, v.to_bits(), e);
}

macro_rules! array_codec {
    (
        $elem:literal, $ety:ty, $load:path, $store:path,
        $read_e:ident, $read:ident, $write_e:ident, $write:ident
    ) => {
        impl Accessor<'_> {
            #[doc = concat!(
                "Reads `count` elements of ", stringify!($elem),
                " bytes each under `e`."
            )]
            pub fn $read_e(&mut self, count: usize, e: Endianness) -> Result<Vec<$ety>> {
                let total = count.checked_mul($elem).ok_or(Error::BeyondEnd)?;
                if total > self.available() {
                    return Err(Error::BeyondEnd);
                }
                let mut out: Vec<$ety> = Vec::new();
                out.try_reserve_exact(count).map_err(|_| Error::OutOfMemory)?;
                let src = self.take_read(total)?;
                for chunk in src.chunks_exact($elem) {
                    out.push($load(chunk, e));
                }
                Ok(out)
            }

            #[doc = concat!(
                "Reads `count` elements of ", stringify!($elem),
                " bytes each with the accessor's byte order."
            )]
            pub fn $read(&mut self, count: usize) -> Result<Vec<$ety>> {
                self.$read_e(count, self.endianness)
            }

            #[doc = concat!(
                "Writes every element of `values` at ", stringify!($elem),
                " bytes each under `e`."
            )]
            pub fn $write_e(&mut self, values: &[$ety], e: Endianness) -> Result<()> {
                let total = values.len().checked_mul($elem).ok_or(Error::BeyondEnd)?;
                let dst = self.take_write(total)?;
                for (chunk, &v) in dst.chunks_exact_mut($elem).zip(values) {
                    $store(chunk, v, e);
                }
                Ok(())
            }

            #[doc = concat!(
                "Writes every element of `values` at ", stringify!($elem),
                " bytes each with the accessor's byte order."
            )]
            pub fn $write(&mut self, values: &[$ety]) -> Result<()> {
                self.$write_e(values, self.endianness)
            }
        }
    };
}

array_codec!(2, u16, endian::load_u16, endian::store_u16,
    read_u16_array_endian, read_u16_array, write_u16_array_endian, write_u16_array);
array_codec!(2, i16, load_i16, store_i16,
    read_i16_array_endian, read_i16_array, write_i16_array_endian, write_i16_array);
array_codec!(3, u32, endian::load_u24, endian::store_u24,
    read_u24_array_endian, read_u24_array, write_u24_array_endian, write_u24_array);
array_codec!(3, i32, load_i24, store_i24,
    read_i24_array_endian, read_i24_array, write_i24_array_endian, write_i24_array);
array_codec!(4, u32, endian::load_u32, endian::store_u32,
    read_u32_array_endian, read_u32_array, write_u32_array_endian, write_u32_array);
array_codec!(4, i32, load_i32, store_i32,
    read_i32_array_endian, read_i32_array, write_i32_array_endian, write_i32_array);
array_codec!(8, u64, endian::load_u64, endian::store_u64,
    read_u64_array_endian, read_u64_array, write_u64_array_endian, write_u64_array);
array_codec!(8, i64, load_i64, store_i64,
    read_i64_array_endian, read_i64_array, write_i64_array_endian, write_i64_array);
array_codec!(4, f32, load_f32, store_f32,
    read_f32_array_endian, read_f32_array, write_f32_array_endian, write_f32_array);
array_codec!(8, f64, load_f64, store_f64,
    read_f64_array_endian, read_f64_array, write_f64_array_endian, write_f64_array);
