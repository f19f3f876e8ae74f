//! Byte-slice utilities for bounds-oriented parsing.
//!
//! There are two layers:
//! - **Option layer** (`read_*`): helpers that return `Option<T>`.
//! - **Result layer** (`*_r`): wrappers that map `None` to [`RdatError::Truncated`].
//!
//! All numeric reads are **little-endian** (RDAT is LE on every platform) and offsets are
//! interpreted relative to the slice you pass in.

use byteorder::{ByteOrder, LittleEndian};

use crate::err::{RdatError, usize_to_u32};

/// Read `N` raw bytes at `offset`.
///
/// Returns `None` if the range is out of bounds.
pub(crate) fn read_array<const N: usize>(buf: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    let bytes: [u8; N] = buf.get(offset..end)?.try_into().ok()?;
    Some(bytes)
}

pub(crate) fn read_u8(buf: &[u8], offset: usize) -> Option<u8> {
    buf.get(offset).copied()
}

pub(crate) fn read_u16_le(buf: &[u8], offset: usize) -> Option<u16> {
    Some(LittleEndian::read_u16(&read_array::<2>(buf, offset)?))
}

pub(crate) fn read_u32_le(buf: &[u8], offset: usize) -> Option<u32> {
    Some(LittleEndian::read_u32(&read_array::<4>(buf, offset)?))
}

#[inline]
fn truncated(what: &'static str, offset: usize, need: usize, len: usize) -> RdatError {
    RdatError::Truncated {
        what,
        offset: usize_to_u32(offset),
        need,
        have: len.saturating_sub(offset),
    }
}

pub(crate) fn slice_r<'a>(
    buf: &'a [u8],
    offset: usize,
    len: usize,
    what: &'static str,
) -> Result<&'a [u8], RdatError> {
    let end = offset
        .checked_add(len)
        .ok_or_else(|| truncated(what, offset, len, buf.len()))?;
    buf.get(offset..end)
        .ok_or_else(|| truncated(what, offset, len, buf.len()))
}

/// Read a `u16` (little-endian) at `offset`, or return `RdatError::Truncated`.
pub(crate) fn read_u16_le_r(buf: &[u8], offset: usize, what: &'static str) -> Result<u16, RdatError> {
    read_u16_le(buf, offset).ok_or_else(|| truncated(what, offset, 2, buf.len()))
}

/// Read a `u32` (little-endian) at `offset`, or return `RdatError::Truncated`.
pub(crate) fn read_u32_le_r(buf: &[u8], offset: usize, what: &'static str) -> Result<u32, RdatError> {
    read_u32_le(buf, offset).ok_or_else(|| truncated(what, offset, 4, buf.len()))
}

/// Read a `count`-element `u32` (little-endian) table at `offset`.
///
/// This does a single bounds check for the whole table and then reads each element.
pub(crate) fn read_u32_vec_le_r(
    buf: &[u8],
    offset: usize,
    count: usize,
    what: &'static str,
) -> Result<Vec<u32>, RdatError> {
    let bytes = count
        .checked_mul(4)
        .ok_or_else(|| truncated(what, offset, usize::MAX, buf.len()))?;
    let table = slice_r(buf, offset, bytes, what)?;

    Ok(table.chunks_exact(4).map(LittleEndian::read_u32).collect())
}

/// Round `n` up to the next multiple of four.
#[inline]
pub(crate) const fn align4(n: usize) -> usize {
    (n + 3) & !3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_are_bounds_checked() {
        let buf = [1u8, 0, 0, 0, 2, 0];
        assert_eq!(read_u32_le(&buf, 0), Some(1));
        assert_eq!(read_u16_le(&buf, 4), Some(2));
        assert_eq!(read_u32_le(&buf, 4), None);
        assert_eq!(read_u32_le(&buf, usize::MAX), None);

        match read_u32_le_r(&buf, 4, "value") {
            Err(RdatError::Truncated {
                what, need, have, ..
            }) => {
                assert_eq!(what, "value");
                assert_eq!(need, 4);
                assert_eq!(have, 2);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_align4() {
        assert_eq!(align4(0), 0);
        assert_eq!(align4(1), 4);
        assert_eq!(align4(4), 4);
        assert_eq!(align4(5), 8);
    }
}
