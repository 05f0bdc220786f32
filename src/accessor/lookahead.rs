//! Non-consuming reads, zero-copy access to the unread window, and bounded
//! delimiter search.
//!
//! The borrow-returning forms hand out slices tied to the accessor borrow,
//! so the compiler ends their validity at the next mutating call — a
//! pointer can never survive a cursor move or a buffer growth.

use crate::error::{Error, Result};

use super::Accessor;

impl Accessor<'_> {
    /// Copies up to `dst.len()` bytes from the cursor without moving it.
    /// Returns how many bytes were copied; never fails.
    pub fn look_ahead_bytes(&self, dst: &mut [u8]) -> usize {
        let remaining = self.remaining_slice();
        let n = dst.len().min(remaining.len());
        dst[..n].copy_from_slice(&remaining[..n]);
        n
    }

    /// As [`look_ahead_bytes`](Self::look_ahead_bytes), reversing the
    /// copied prefix when `e` is the byte-reverse of the host.
    pub fn look_ahead_bytes_endian(&self, dst: &mut [u8], e: crate::Endianness) -> usize {
        let n = self.look_ahead_bytes(dst);
        if e.is_reverse_of_host() {
            dst[..n].reverse();
        }
        n
    }

    /// The unread remainder of the window, without copying. Empty when the
    /// cursor sits at the window end.
    pub fn look_ahead_available_bytes(&self) -> &[u8] {
        self.remaining_slice()
    }

    /// Number of bytes between the cursor and the first occurrence of
    /// `delimiter`, scanning at most `limit` starting positions past the
    /// cursor (`None`: the whole remainder).
    ///
    /// An empty delimiter is invalid; a window with fewer bytes than the
    /// delimiter, or no occurrence within bounds, is `BeyondEnd`. The
    /// cursor does not move.
    pub fn count_bytes_before_delimiter(
        &self,
        limit: Option<usize>,
        delimiter: &[u8],
    ) -> Result<usize> {
        if delimiter.is_empty() {
            return Err(Error::InvalidParameter);
        }
        let remaining = self.remaining_slice();
        if remaining.len() < delimiter.len() {
            return Err(Error::BeyondEnd);
        }
        let max_start = remaining.len() - delimiter.len();
        let max_start = match limit {
            None => max_start,
            Some(l) => l.min(max_start),
        };
        let scan = &remaining[..max_start + delimiter.len()];
        let found = match delimiter {
            [b] => scan.iter().position(|x| x == b),
            [b0, b1] => scan
                .windows(2)
                .position(|w| w[0] == *b0 && w[1] == *b1),
            _ => scan
                .windows(delimiter.len())
                .position(|w| w == delimiter),
        };
        found.ok_or(Error::BeyondEnd)
    }

    /// Consumes `n` bytes and hands back the consumed range without
    /// copying. One coverage record is logged. The slice borrows the
    /// accessor, ending at the next mutating call.
    pub fn get_bytes_to_read(&mut self, n: usize) -> Result<&[u8]> {
        self.take_read(n)
    }

    /// Reserves `n` writable bytes at the cursor, growing the window as
    /// needed, and hands back the reserved range. The slice borrows the
    /// accessor, ending at the next call that may move the cursor or grow
    /// the buffer.
    pub fn get_bytes_to_write(&mut self, n: usize) -> Result<&mut [u8]> {
        self.take_write(n)
    }
}
