use log::trace;

use crate::err::{RdatError, Result, checked_u32, usize_to_u32};

/// The all-ones offset used in place of an index array (or byte range) that is absent.
pub const SENTINEL: u32 = u32::MAX;

/// Offset (in `u32` elements) of an array inside an [`IndexArrays`] table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexArrayRef(pub u32);

impl IndexArrayRef {
    pub const NULL: IndexArrayRef = IndexArrayRef(SENTINEL);

    pub fn is_null(self) -> bool {
        self.0 == SENTINEL
    }
}

/// How arrays are delimited inside the table, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexArrayMode {
    /// Each array is preceded by its element count (the RDAT wire format).
    Prefixed,
    /// Arrays carry no length; a reader gets everything from the start offset onwards and
    /// must know the real count from elsewhere.
    Unprefixed,
}

/// One contiguous buffer of `u32` arrays, addressed by element offset.
#[derive(Debug, Clone)]
pub struct IndexArrays {
    mode: IndexArrayMode,
    values: Vec<u32>,
}

impl IndexArrays {
    pub fn new(mode: IndexArrayMode) -> Self {
        IndexArrays {
            mode,
            values: Vec::new(),
        }
    }

    pub fn mode(&self) -> IndexArrayMode {
        self.mode
    }

    /// Replaces the contents with an index array part payload. Trailing bytes that do not
    /// make up a whole `u32` are ignored.
    pub fn load(&mut self, data: &[u8]) {
        self.values = data
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Serializes the table as a little-endian byte buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    /// Returns the array referenced by `r`.
    ///
    /// In prefixed mode this is exactly the stored array. In unprefixed mode it is everything
    /// from `r` to the end of the table; use [`IndexArrays::span_exact`] when the count is
    /// known.
    pub fn span(&self, r: IndexArrayRef) -> Result<&[u32]> {
        let start = self.check_start(r)?;
        match self.mode {
            IndexArrayMode::Prefixed => {
                let len = self.values[start] as usize;
                self.slice(r, start + 1, len)
            }
            IndexArrayMode::Unprefixed => Ok(&self.values[start..]),
        }
    }

    /// Returns `len` elements of the array referenced by `r`, skipping the length prefix in
    /// prefixed mode.
    pub fn span_exact(&self, r: IndexArrayRef, len: usize) -> Result<&[u32]> {
        let start = self.check_start(r)?;
        match self.mode {
            IndexArrayMode::Prefixed => self.slice(r, start + 1, len),
            IndexArrayMode::Unprefixed => self.slice(r, start, len),
        }
    }

    fn check_start(&self, r: IndexArrayRef) -> Result<usize> {
        let start = r.0 as usize;
        if r.is_null() || start >= self.values.len() {
            return Err(RdatError::OffsetOutOfBounds {
                what: "index array reference",
                offset: r.0,
                len: self.values.len(),
            });
        }
        Ok(start)
    }

    fn slice(&self, r: IndexArrayRef, start: usize, len: usize) -> Result<&[u32]> {
        start
            .checked_add(len)
            .and_then(|end| self.values.get(start..end))
            .ok_or(RdatError::Truncated {
                what: "index array",
                offset: r.0,
                need: len,
                have: self.values.len().saturating_sub(start),
            })
    }

    /// Interns `idxs`, returning its offset.
    ///
    /// With `empty_is_null`, an empty array yields [`IndexArrayRef::NULL`] and the table is not
    /// touched. With `dedup`, an existing occurrence is reused: in prefixed mode only a stored
    /// array with the same count and contents matches, in unprefixed mode any offset whose
    /// following elements start with `idxs` matches (so an array can be reused as the prefix
    /// of a longer one).
    pub fn make_ref(&mut self, idxs: &[u32], empty_is_null: bool, dedup: bool) -> Result<IndexArrayRef> {
        if empty_is_null && idxs.is_empty() {
            return Ok(IndexArrayRef::NULL);
        }

        if dedup {
            if let Some(offset) = self.find(idxs) {
                return Ok(IndexArrayRef(usize_to_u32(offset)));
            }
        }

        let offset = checked_u32(self.values.len(), "index array offset")?;
        if self.mode == IndexArrayMode::Prefixed {
            self.values
                .push(checked_u32(idxs.len(), "index array length")?);
        }
        self.values.extend_from_slice(idxs);
        trace!("interned index array {:?} at offset {}", idxs, offset);
        Ok(IndexArrayRef(offset))
    }

    fn find(&self, idxs: &[u32]) -> Option<usize> {
        match self.mode {
            IndexArrayMode::Prefixed => {
                let mut offset = 0;
                while offset < self.values.len() {
                    let len = self.values[offset] as usize;
                    let start = offset + 1;
                    let stored = self.values.get(start..start.checked_add(len)?)?;
                    if stored == idxs {
                        return Some(offset);
                    }
                    offset = start + len;
                }
                None
            }
            IndexArrayMode::Unprefixed => (0..self.values.len())
                .find(|&offset| self.values[offset..].starts_with(idxs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_arrays_store_their_length() {
        let mut table = IndexArrays::new(IndexArrayMode::Prefixed);
        let a = table.make_ref(&[3, 4], true, true).unwrap();
        let b = table.make_ref(&[7], true, true).unwrap();

        assert_eq!(a, IndexArrayRef(0));
        assert_eq!(b, IndexArrayRef(3));
        assert_eq!(table.values(), &[2, 3, 4, 1, 7]);
        assert_eq!(table.span(a).unwrap(), &[3, 4]);
        assert_eq!(table.span(b).unwrap(), &[7]);
    }

    #[test]
    fn test_prefixed_dedup_matches_whole_arrays_only() {
        let mut table = IndexArrays::new(IndexArrayMode::Prefixed);
        let long = table.make_ref(&[1, 2, 3], true, true).unwrap();
        assert_eq!(table.make_ref(&[1, 2, 3], true, true).unwrap(), long);

        // a prefix of a stored array is a different array
        let short = table.make_ref(&[1, 2], true, true).unwrap();
        assert_eq!(short, IndexArrayRef(4));
        assert_eq!(table.values(), &[3, 1, 2, 3, 2, 1, 2]);
    }

    #[test]
    fn test_unprefixed_dedup_reuses_a_longer_run() {
        let mut table = IndexArrays::new(IndexArrayMode::Unprefixed);
        let long = table.make_ref(&[5, 6, 7], true, true).unwrap();
        let inner = table.make_ref(&[6, 7], true, true).unwrap();
        let head = table.make_ref(&[5, 6], true, true).unwrap();

        assert_eq!(long, IndexArrayRef(0));
        assert_eq!(inner, IndexArrayRef(1));
        assert_eq!(head, IndexArrayRef(0));
        assert_eq!(table.values(), &[5, 6, 7]);
        assert_eq!(table.span(inner).unwrap(), &[6, 7]);
        assert_eq!(table.span_exact(head, 2).unwrap(), &[5, 6]);
    }

    #[test]
    fn test_empty_is_null_never_touches_the_table() {
        let mut table = IndexArrays::new(IndexArrayMode::Prefixed);
        assert_eq!(table.make_ref(&[], true, true).unwrap(), IndexArrayRef::NULL);
        assert!(table.values().is_empty());

        // opting out stores a zero-length array
        let empty = table.make_ref(&[], false, true).unwrap();
        assert_eq!(empty, IndexArrayRef(0));
        assert_eq!(table.values(), &[0]);
        assert!(table.span(empty).unwrap().is_empty());
    }

    #[test]
    fn test_without_dedup_every_call_appends() {
        let mut table = IndexArrays::new(IndexArrayMode::Prefixed);
        let a = table.make_ref(&[9], true, false).unwrap();
        let b = table.make_ref(&[9], true, false).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_span_rejects_corrupt_references() {
        let mut table = IndexArrays::new(IndexArrayMode::Prefixed);
        table.load(&[5, 0, 0, 0, 1, 0, 0, 0]);

        assert!(matches!(
            table.span(IndexArrayRef(0)),
            Err(RdatError::Truncated { need: 5, .. })
        ));
        assert!(matches!(
            table.span(IndexArrayRef(2)),
            Err(RdatError::OffsetOutOfBounds { .. })
        ));
        assert!(table.span(IndexArrayRef::NULL).is_err());
    }
}
