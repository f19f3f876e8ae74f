use byteorder::{LittleEndian, WriteBytesExt};
use log::debug;

use crate::err::{RdatError, Result, checked_u32};
use crate::utils::ByteCursor;

/// The only RDAT version this crate understands (1.0).
pub const RDAT_VERSION_1_0: u32 = 0x10;

/// The RDAT header: version tag, then the offset of every part from the start of the region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdatHeader {
    pub version: u32,
    pub part_offsets: Vec<u32>,
}

impl RdatHeader {
    /// Size in bytes of a header describing `part_count` parts.
    pub fn size_for(part_count: usize) -> usize {
        4 + 4 + 4 * part_count
    }

    /// Reads and validates the header at the start of `region`.
    ///
    /// A version mismatch fails before anything past the version tag is read.
    pub fn from_bytes(region: &[u8]) -> Result<RdatHeader> {
        let mut cursor = ByteCursor::new(region);

        let version = cursor.u32_named("RDAT version")?;
        if version != RDAT_VERSION_1_0 {
            return Err(RdatError::UnsupportedVersion {
                found: version,
                expected: RDAT_VERSION_1_0,
            });
        }

        let part_count = cursor.u32_named("RDAT part count")?;
        let part_offsets = cursor.u32_vec(part_count as usize, "RDAT part offsets")?;
        debug!("RDAT header - {} parts at {:?}", part_count, part_offsets);

        Ok(RdatHeader {
            version,
            part_offsets,
        })
    }

    /// Builds the header for already-baked `parts`, which are laid out back to back
    /// immediately after it.
    pub fn for_parts(parts: &[Vec<u8>]) -> Result<RdatHeader> {
        let mut offset = checked_u32(Self::size_for(parts.len()), "RDAT header size")?;
        let mut part_offsets = Vec::with_capacity(parts.len());
        for part in parts {
            part_offsets.push(offset);
            // parts are already 4-byte aligned
            offset = offset
                .checked_add(checked_u32(part.len(), "RDAT part size")?)
                .ok_or(RdatError::ValueOutOfRange {
                    what: "RDAT part offset",
                    value: u64::from(offset) + part.len() as u64,
                })?;
        }

        Ok(RdatHeader {
            version: RDAT_VERSION_1_0,
            part_offsets,
        })
    }

    pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        out.write_u32::<LittleEndian>(self.version)?;
        out.write_u32::<LittleEndian>(checked_u32(self.part_offsets.len(), "RDAT part count")?)?;
        for &offset in &self.part_offsets {
            out.write_u32::<LittleEndian>(offset)?;
        }
        Ok(())
    }
}
