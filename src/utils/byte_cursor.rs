use crate::err::{RdatError, Result, usize_to_u32};
use crate::utils::bytes;

/// A lightweight cursor over an immutable byte slice.
///
/// This is the slice/offset equivalent of `Cursor<&[u8]>`: every read is bounds-checked against
/// the backing slice and fails with [`RdatError::Truncated`] instead of panicking.
///
/// All reads are little-endian and advance the cursor on success.
#[derive(Clone, Copy, Debug)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    #[inline]
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    pub(crate) fn with_pos(buf: &'a [u8], pos: usize, what: &'static str) -> Result<Self> {
        // Allow pos == len (EOF), reject pos > len.
        if pos > buf.len() {
            return Err(RdatError::OffsetOutOfBounds {
                what,
                offset: usize_to_u32(pos),
                len: buf.len(),
            });
        }
        Ok(Self { buf, pos })
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    pub(crate) fn take_bytes(&mut self, len: usize, what: &'static str) -> Result<&'a [u8]> {
        let out = bytes::slice_r(self.buf, self.pos, len, what)?;
        self.pos += len;
        Ok(out)
    }

    #[inline]
    pub(crate) fn u8_named(&mut self, what: &'static str) -> Result<u8> {
        let b = bytes::read_u8(self.buf, self.pos).ok_or_else(|| RdatError::Truncated {
            what,
            offset: usize_to_u32(self.pos),
            need: 1,
            have: self.remaining(),
        })?;
        self.pos += 1;
        Ok(b)
    }

    #[inline]
    pub(crate) fn u16_named(&mut self, what: &'static str) -> Result<u16> {
        let v = bytes::read_u16_le_r(self.buf, self.pos, what)?;
        self.pos += 2;
        Ok(v)
    }

    #[inline]
    pub(crate) fn u32_named(&mut self, what: &'static str) -> Result<u32> {
        let v = bytes::read_u32_le_r(self.buf, self.pos, what)?;
        self.pos += 4;
        Ok(v)
    }

    /// Reads `count` consecutive `u32` values with a single bounds check.
    pub(crate) fn u32_vec(&mut self, count: usize, what: &'static str) -> Result<Vec<u32>> {
        let out = bytes::read_u32_vec_le_r(self.buf, self.pos, count, what)?;
        self.pos += count * 4;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_advances_and_stops_at_end() {
        let buf = [0x10, 0, 0, 0, 0xAA, 0xBB, 0x01];
        let mut cursor = ByteCursor::new(&buf);

        assert_eq!(cursor.u32_named("version").unwrap(), 0x10);
        assert_eq!(cursor.u16_named("half").unwrap(), 0xBBAA);
        assert_eq!(cursor.u8_named("byte").unwrap(), 1);
        assert_eq!(cursor.remaining(), 0);
        assert!(cursor.u8_named("past end").is_err());
    }

    #[test]
    fn test_with_pos_rejects_positions_past_end() {
        let buf = [0u8; 4];
        assert!(ByteCursor::with_pos(&buf, 4, "eof").is_ok());
        assert!(matches!(
            ByteCursor::with_pos(&buf, 5, "past eof"),
            Err(RdatError::OffsetOutOfBounds { offset: 5, .. })
        ));
    }
}
