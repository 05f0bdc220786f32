//! Cursor and window operations: seek, truncate, and the cursor stack.

use std::io::SeekFrom;

use crate::error::{Error, Result};

use super::Accessor;

impl Accessor<'_> {
    /// Moves the cursor.
    ///
    /// Relative variants use wrapping arithmetic on the cursor, so a large
    /// negative delta that underflows lands far past the window and is
    /// rejected by the window check rather than panicking. Seeking past the
    /// window end grows a write-enabled accessor (zero-filling the
    /// extension) and fails with `BeyondEnd` on a read-only one.
    ///
    /// Returns the new cursor position.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<usize> {
        let new_cursor = match pos {
            SeekFrom::Start(o) => usize::try_from(o).map_err(|_| Error::InvalidParameter)?,
            SeekFrom::Current(d) => self.cursor.wrapping_add_signed(d as isize),
            SeekFrom::End(d) => self.window_size.wrapping_add_signed(d as isize),
        };
        if new_cursor > self.window_size {
            if !self.write_enabled {
                return Err(Error::BeyondEnd);
            }
            self.grow_to(new_cursor)?;
        }
        self.cursor = new_cursor;
        Ok(new_cursor)
    }

    /// Cuts the window at the cursor: everything from the cursor on is
    /// discarded and `available_bytes` drops to zero. Write accessors only.
    pub fn truncate(&mut self) -> Result<()> {
        if !self.write_enabled {
            return Err(Error::ReadOnly);
        }
        self.window_size = self.cursor;
        Ok(())
    }

    /// Saves the cursor on the accessor's stack.
    pub fn push_cursor(&mut self) {
        self.cursor_stack.push(self.cursor);
    }

    /// Restores the most recently pushed cursor. The restore goes through
    /// [`seek`](Self::seek), so a write-enabled accessor whose window
    /// shrank since the push grows back to the saved position.
    pub fn pop_cursor(&mut self) -> Result<usize> {
        let saved = self.cursor_stack.pop().ok_or(Error::InvalidParameter)?;
        match self.seek(SeekFrom::Start(saved as u64)) {
            Ok(pos) => Ok(pos),
            Err(e) => {
                // The pop itself failed; the entry stays consumable state —
                // put it back so the stack still matches the pushes.
                self.cursor_stack.push(saved);
                Err(e)
            }
        }
    }

    /// Pops `count` saved cursors, restoring the deepest of them.
    /// Equivalent to dropping `count - 1` entries and popping the last.
    pub fn pop_cursors(&mut self, count: usize) -> Result<usize> {
        if count == 0 || count > self.cursor_stack.len() {
            return Err(Error::InvalidParameter);
        }
        self.drop_cursors(count - 1)?;
        self.pop_cursor()
    }

    /// Discards the most recently pushed cursor without restoring it.
    pub fn drop_cursor(&mut self) -> Result<()> {
        self.cursor_stack.pop().ok_or(Error::InvalidParameter)?;
        Ok(())
    }

    /// Discards the `count` most recently pushed cursors.
    pub fn drop_cursors(&mut self, count: usize) -> Result<()> {
        if count > self.cursor_stack.len() {
            return Err(Error::InvalidParameter);
        }
        let keep = self.cursor_stack.len() - count;
        self.cursor_stack.truncate(keep);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(data: &[u8]) -> Accessor<'_> {
        Accessor::open_reading_bytes(data, 0, None).unwrap()
    }

    #[test]
    fn seek_set_cur_end() {
        let data = [0u8; 10];
        let mut a = reader(&data);
        assert_eq!(a.seek(SeekFrom::Start(4)).unwrap(), 4);
        assert_eq!(a.seek(SeekFrom::Current(3)).unwrap(), 7);
        assert_eq!(a.seek(SeekFrom::Current(-7)).unwrap(), 0);
        assert_eq!(a.seek(SeekFrom::End(-1)).unwrap(), 9);
        assert_eq!(a.seek(SeekFrom::End(0)).unwrap(), 10);
        assert_eq!(a.available_bytes(), 0);
    }

    #[test]
    fn seek_past_end_read_only_fails_and_keeps_cursor() {
        let data = [0u8; 10];
        let mut a = reader(&data);
        a.seek(SeekFrom::Start(3)).unwrap();
        assert!(matches!(a.seek(SeekFrom::Start(11)), Err(Error::BeyondEnd)));
        assert!(matches!(a.seek(SeekFrom::Current(-4)), Err(Error::BeyondEnd)));
        assert_eq!(a.cursor(), 3);
    }

    #[test]
    fn seek_past_end_grows_write_accessor_zero_filled() {
        let mut w = Accessor::open_writing_memory(0, 0).unwrap();
        w.write_u8(0xff).unwrap();
        w.seek(SeekFrom::Start(5)).unwrap();
        assert_eq!(w.window_size(), 5);
        w.seek(SeekFrom::Start(0)).unwrap();
        assert_eq!(w.read_u8().unwrap(), 0xff);
        for _ in 0..4 {
            assert_eq!(w.read_u8().unwrap(), 0);
        }
    }

    #[test]
    fn truncate_cuts_window_at_cursor() {
        let mut w = Accessor::open_writing_memory(0, 0).unwrap();
        for b in 0..8u8 {
            w.write_u8(b).unwrap();
        }
        w.seek(SeekFrom::Start(3)).unwrap();
        w.truncate().unwrap();
        assert_eq!(w.window_size(), 3);
        assert_eq!(w.available_bytes(), 0);
        assert!(matches!(w.read_u8(), Err(Error::BeyondEnd)));
    }

    #[test]
    fn truncated_bytes_come_back_zeroed() {
        let mut w = Accessor::open_writing_memory(0, 0).unwrap();
        for b in [0xaau8, 0xbb, 0xcc, 0xdd] {
            w.write_u8(b).unwrap();
        }
        w.seek(SeekFrom::Start(2)).unwrap();
        w.truncate().unwrap();
        // Growing again must not resurrect the stale tail.
        w.seek(SeekFrom::Start(4)).unwrap();
        w.seek(SeekFrom::Start(2)).unwrap();
        assert_eq!(w.read_u8().unwrap(), 0);
        assert_eq!(w.read_u8().unwrap(), 0);
    }

    #[test]
    fn truncate_is_rejected_on_read_only() {
        let data = [0u8; 4];
        let mut a = reader(&data);
        assert!(matches!(a.truncate(), Err(Error::ReadOnly)));
    }

    #[test]
    fn cursor_stack_is_lifo() {
        let data = [0u8; 16];
        let mut a = reader(&data);
        a.seek(SeekFrom::Start(2)).unwrap();
        a.push_cursor();
        a.seek(SeekFrom::Start(5)).unwrap();
        a.push_cursor();
        a.seek(SeekFrom::Start(9)).unwrap();
        assert_eq!(a.pop_cursor().unwrap(), 5);
        assert_eq!(a.pop_cursor().unwrap(), 2);
        assert!(matches!(a.pop_cursor(), Err(Error::InvalidParameter)));
    }

    #[test]
    fn pop_cursors_equals_drops_then_pop() {
        let data = [0u8; 16];
        let mut a = reader(&data);
        for pos in [1u64, 2, 3, 4] {
            a.seek(SeekFrom::Start(pos)).unwrap();
            a.push_cursor();
        }
        let mut b = reader(&data);
        for pos in [1u64, 2, 3, 4] {
            b.seek(SeekFrom::Start(pos)).unwrap();
            b.push_cursor();
        }

        assert_eq!(a.pop_cursors(3).unwrap(), 2);
        b.drop_cursors(2).unwrap();
        assert_eq!(b.pop_cursor().unwrap(), 2);
        assert_eq!(a.cursor(), b.cursor());
    }

    #[test]
    fn empty_stack_operations_are_invalid() {
        let data = [0u8; 4];
        let mut a = reader(&data);
        assert!(matches!(a.drop_cursor(), Err(Error::InvalidParameter)));
        assert!(matches!(a.pop_cursors(0), Err(Error::InvalidParameter)));
        assert!(matches!(a.pop_cursors(1), Err(Error::InvalidParameter)));
        assert!(matches!(a.drop_cursors(1), Err(Error::InvalidParameter)));
        a.drop_cursors(0).unwrap();
    }
}
