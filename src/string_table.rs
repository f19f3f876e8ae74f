use log::trace;

use crate::err::{RdatError, Result, checked_u32, usize_to_u32};

/// Offset of a NUL-terminated string inside a [`StringTable`].
///
/// Only meaningful against the table it was produced by (or loaded into).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringRef(pub u32);

impl StringRef {
    /// The empty string every table starts with.
    pub const EMPTY: StringRef = StringRef(0);
}

/// One contiguous buffer of NUL-terminated strings, addressed by byte offset.
///
/// A fresh table is seeded with a single NUL, so offset 0 is always the empty string. The
/// buffer only ever grows.
#[derive(Debug, Clone)]
pub struct StringTable {
    blob: Vec<u8>,
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StringTable {
    pub fn new() -> Self {
        StringTable { blob: vec![0] }
    }

    /// Replaces the contents with a string buffer part payload.
    pub fn load(&mut self, data: &[u8]) {
        self.blob.clear();
        self.blob.extend_from_slice(data);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.blob
    }

    /// Returns the string starting at `r`.
    ///
    /// Fails if `r` is past the end of the table, if no NUL follows it, or if the bytes are not
    /// UTF-8.
    pub fn get(&self, r: StringRef) -> Result<&str> {
        let start = r.0 as usize;
        let tail = self
            .blob
            .get(start..)
            .filter(|tail| !tail.is_empty())
            .ok_or(RdatError::OffsetOutOfBounds {
                what: "string reference",
                offset: r.0,
                len: self.blob.len(),
            })?;

        let len = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or(RdatError::UnterminatedString { offset: r.0 })?;

        std::str::from_utf8(&tail[..len]).map_err(|_| RdatError::InvalidString { offset: r.0 })
    }

    /// Interns `s`, returning its offset.
    ///
    /// With `dedup`, existing entries are scanned front to back and the first exact match is
    /// returned. Otherwise (or when nothing matches) `s` and a NUL are appended.
    ///
    /// Strings containing a NUL are rejected, since they could not be read back whole.
    pub fn make_ref(&mut self, s: &str, dedup: bool) -> Result<StringRef> {
        if s.as_bytes().contains(&0) {
            return Err(RdatError::EmbeddedNul {
                value: s.to_string(),
            });
        }

        if dedup {
            if let Some(offset) = self.find(s.as_bytes()) {
                return Ok(StringRef(usize_to_u32(offset)));
            }
        }

        let offset = checked_u32(self.blob.len(), "string table offset")?;
        self.blob.extend_from_slice(s.as_bytes());
        self.blob.push(0);
        trace!("interned string {:?} at offset {}", s, offset);
        Ok(StringRef(offset))
    }

    fn find(&self, needle: &[u8]) -> Option<usize> {
        let mut offset = 0;
        while offset < self.blob.len() {
            let entry_len = self.blob[offset..].iter().position(|&b| b == 0)?;
            if &self.blob[offset..offset + entry_len] == needle {
                return Some(offset);
            }
            // skip the terminator to land on the next entry
            offset += entry_len + 1;
        }
        None
    }
}
