use log::trace;

use crate::err::{RdatError, Result, checked_u32};
use crate::index_arrays::SENTINEL;

/// An `(offset, size)` range inside the raw bytes part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BytesRef {
    pub offset: u32,
    pub size: u32,
}

impl BytesRef {
    pub const EMPTY: BytesRef = BytesRef {
        offset: SENTINEL,
        size: 0,
    };

    pub fn is_empty(self) -> bool {
        self.offset == SENTINEL
    }
}

/// Opaque byte blobs (root signatures) interned by whole-blob equality.
///
/// While encoding, blobs are kept individually and only concatenated by
/// [`RawBytes::into_bytes`]. A loaded table is a single already-concatenated buffer.
#[derive(Debug, Clone, Default)]
pub struct RawBytes {
    blobs: Vec<Vec<u8>>,
}

impl RawBytes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the contents with a raw bytes part payload.
    pub fn load(&mut self, data: &[u8]) {
        self.blobs.clear();
        if !data.is_empty() {
            self.blobs.push(data.to_vec());
        }
    }

    pub fn len(&self) -> usize {
        self.blobs.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Interns `bytes`, returning the range it occupies in the concatenated buffer.
    pub fn make_ref(&mut self, bytes: &[u8]) -> Result<BytesRef> {
        if bytes.is_empty() {
            return Ok(BytesRef::EMPTY);
        }

        let size = checked_u32(bytes.len(), "raw bytes size")?;
        let idx = match self.blobs.iter().position(|b| b.as_slice() == bytes) {
            Some(idx) => idx,
            None => {
                self.blobs.push(bytes.to_vec());
                self.blobs.len() - 1
            }
        };

        let offset = self.blobs[..idx].iter().map(Vec::len).sum();
        let offset = checked_u32(offset, "raw bytes offset")?;
        trace!("interned {} raw bytes at offset {}", size, offset);
        Ok(BytesRef { offset, size })
    }

    /// Returns the bytes covered by `r`; the empty reference yields an empty slice.
    pub fn get(&self, r: BytesRef) -> Result<Vec<u8>> {
        if r.is_empty() {
            return Ok(Vec::new());
        }

        let mut start = r.offset as usize;
        let size = r.size as usize;
        // A range never spans two blobs: every interned range is one whole blob.
        for blob in &self.blobs {
            if start < blob.len() {
                return start
                    .checked_add(size)
                    .and_then(|end| blob.get(start..end))
                    .map(<[u8]>::to_vec)
                    .ok_or(RdatError::Truncated {
                        what: "raw bytes range",
                        offset: r.offset,
                        need: size,
                        have: blob.len() - start,
                    });
            }
            start -= blob.len();
        }

        Err(RdatError::OffsetOutOfBounds {
            what: "raw bytes range",
            offset: r.offset,
            len: self.len(),
        })
    }

    /// Concatenates every interned blob into the raw bytes part payload.
    pub fn into_bytes(self) -> Vec<u8> {
        self.blobs.concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_blobs_share_a_range() {
        let mut raw = RawBytes::new();
        let a = raw.make_ref(&[1, 2, 3]).unwrap();
        let b = raw.make_ref(&[4, 5]).unwrap();
        let c = raw.make_ref(&[1, 2, 3]).unwrap();

        assert_eq!(a, BytesRef { offset: 0, size: 3 });
        assert_eq!(b, BytesRef { offset: 3, size: 2 });
        assert_eq!(c, a);
        assert_eq!(raw.get(b).unwrap(), vec![4, 5]);
        assert_eq!(raw.into_bytes(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_empty_blob_is_the_sentinel() {
        let mut raw = RawBytes::new();
        assert_eq!(raw.make_ref(&[]).unwrap(), BytesRef::EMPTY);
        assert!(raw.is_empty());
        assert_eq!(raw.get(BytesRef::EMPTY).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_get_rejects_ranges_past_the_end() {
        let mut raw = RawBytes::new();
        raw.load(&[0xAA; 8]);

        assert_eq!(raw.get(BytesRef { offset: 4, size: 4 }).unwrap(), vec![0xAA; 4]);
        assert!(matches!(
            raw.get(BytesRef { offset: 6, size: 4 }),
            Err(RdatError::Truncated { .. })
        ));
        assert!(matches!(
            raw.get(BytesRef { offset: 8, size: 1 }),
            Err(RdatError::OffsetOutOfBounds { .. })
        ));
    }
}
