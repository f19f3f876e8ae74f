//! Part framing: every section of an RDAT chunk is a `{kind, size}` header followed by a
//! 4-byte aligned payload. Table parts additionally start with a `{count, stride}` header.

use byteorder::{LittleEndian, WriteBytesExt};
use log::{debug, trace};

use crate::err::{RdatError, Result, checked_u32, usize_to_u32};
use crate::utils::ByteCursor;
use crate::utils::bytes::{align4, slice_r};

raw_enum! {
    pub enum PartKind {
        Invalid = 0,
        StringBuffer = 1,
        IndexArrays = 2,
        ResourceTable = 3,
        FunctionTable = 4,
        RawBytes = 5,
        SubobjectTable = 6,
    }
}

pub const PART_HEADER_LEN: usize = 8;
pub const TABLE_HEADER_LEN: usize = 8;

/// A fixed-size record stored in a table part.
pub trait TableRecord: Sized {
    /// Serialized size of one record, before stride alignment.
    const SIZE: usize;
    const STRIDE: usize = align4(Self::SIZE);

    /// Reads one record from exactly [`TableRecord::SIZE`] bytes.
    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self>;

    fn write(&self, out: &mut Vec<u8>) -> Result<()>;
}

/// A part located inside an RDAT region.
#[derive(Debug, Clone, Copy)]
pub struct Part<'a> {
    pub kind: PartKind,
    /// Offset of the part header from the start of the RDAT region.
    pub offset: u32,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    /// Reads the part header at `offset` and bounds-checks its payload against `region`.
    pub fn read(region: &'a [u8], offset: u32) -> Result<Part<'a>> {
        let mut cursor = ByteCursor::with_pos(region, offset as usize, "part offset")?;
        let kind = PartKind::from(cursor.u32_named("part kind")?);
        let size = cursor.u32_named("part size")?;
        let data = cursor.take_bytes(size as usize, "part payload")?;

        if size % 4 != 0 {
            return Err(RdatError::MisalignedPart { kind, offset, size });
        }

        trace!("{:?} part at offset {} ({} bytes)", kind, offset, size);
        Ok(Part { kind, offset, data })
    }

    /// Splits a table part payload into its `{count, stride}` header and record bytes.
    pub fn table(&self) -> Result<Table<'a>> {
        let mut cursor = ByteCursor::new(self.data);
        let count = cursor.u32_named("table count")?;
        let stride = cursor.u32_named("table stride")?;

        let len = (count as usize)
            .checked_mul(stride as usize)
            .ok_or(RdatError::Truncated {
                what: "table records",
                offset: self.offset,
                need: usize::MAX,
                have: cursor.remaining(),
            })?;
        let records = slice_r(self.data, TABLE_HEADER_LEN, len, "table records")?;

        Ok(Table {
            count,
            stride,
            records,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Table<'a> {
    pub count: u32,
    pub stride: u32,
    records: &'a [u8],
}

impl<'a> Table<'a> {
    /// Checks the table stride against `R` and reads every record.
    pub fn read_records<R: TableRecord>(&self, table: &'static str) -> Result<Vec<R>> {
        if self.stride as usize != R::STRIDE {
            return Err(RdatError::StrideMismatch {
                table,
                stride: self.stride,
                expected: usize_to_u32(R::STRIDE),
            });
        }
        self.read_records_unchecked()
    }

    /// Reads every record assuming the stride has already been matched to `R`.
    pub fn read_records_unchecked<R: TableRecord>(&self) -> Result<Vec<R>> {
        if (self.stride as usize) < R::SIZE {
            return Err(RdatError::StrideMismatch {
                table: "table",
                stride: self.stride,
                expected: usize_to_u32(R::STRIDE),
            });
        }

        let mut out = Vec::with_capacity(self.count as usize);
        for chunk in self.records.chunks_exact(self.stride as usize) {
            let mut cursor = ByteCursor::new(chunk);
            out.push(R::read(&mut cursor)?);
        }
        debug!("read {} records of {} bytes", out.len(), self.stride);
        Ok(out)
    }
}

fn write_part_header(out: &mut Vec<u8>, kind: PartKind, size: u32) -> Result<()> {
    out.write_u32::<LittleEndian>(kind.into())?;
    out.write_u32::<LittleEndian>(size)?;
    Ok(())
}

/// Frames a raw payload as a part. Empty payloads produce no part at all.
pub fn bake_blob_part(parts: &mut Vec<Vec<u8>>, kind: PartKind, data: &[u8]) -> Result<()> {
    if data.is_empty() {
        return Ok(());
    }

    let aligned = align4(data.len());
    let mut part = Vec::with_capacity(PART_HEADER_LEN + aligned);
    write_part_header(&mut part, kind, checked_u32(aligned, "part size")?)?;
    part.extend_from_slice(data);
    part.resize(PART_HEADER_LEN + aligned, 0);

    debug!("baked {:?} part ({} bytes)", kind, aligned);
    parts.push(part);
    Ok(())
}

/// Frames a homogeneous record array as a table part. Empty tables produce no part at all.
pub fn bake_table_part<R: TableRecord>(
    parts: &mut Vec<Vec<u8>>,
    kind: PartKind,
    records: &[R],
) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }

    let mut body = Vec::with_capacity(records.len() * R::STRIDE);
    for record in records {
        let start = body.len();
        record.write(&mut body)?;
        debug_assert_eq!(body.len() - start, R::SIZE);
        body.resize(start + R::STRIDE, 0);
    }
    let aligned = align4(body.len());
    body.resize(aligned, 0);

    let size = checked_u32(TABLE_HEADER_LEN + aligned, "part size")?;
    let mut part = Vec::with_capacity(PART_HEADER_LEN + size as usize);
    write_part_header(&mut part, kind, size)?;
    part.write_u32::<LittleEndian>(checked_u32(records.len(), "table count")?)?;
    part.write_u32::<LittleEndian>(checked_u32(R::STRIDE, "table stride")?)?;
    part.extend_from_slice(&body);

    debug!("baked {:?} table ({} records)", kind, records.len());
    parts.push(part);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair(u32, u16);

    impl TableRecord for Pair {
        const SIZE: usize = 6;

        fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
            Ok(Pair(cursor.u32_named("a")?, cursor.u16_named("b")?))
        }

        fn write(&self, out: &mut Vec<u8>) -> Result<()> {
            out.write_u32::<LittleEndian>(self.0)?;
            out.write_u16::<LittleEndian>(self.1)?;
            Ok(())
        }
    }

    #[test]
    fn test_blob_parts_are_padded_to_four_bytes() {
        for len in 1..=9usize {
            let mut parts = vec![];
            bake_blob_part(&mut parts, PartKind::StringBuffer, &vec![0x41; len]).unwrap();

            let part = Part::read(&parts[0], 0).unwrap();
            assert_eq!(part.kind, PartKind::StringBuffer);
            assert_eq!(part.data.len(), align4(len));
            assert_eq!(parts[0].len(), PART_HEADER_LEN + align4(len));
        }
    }

    #[test]
    fn test_empty_parts_are_omitted() {
        let mut parts = vec![];
        bake_blob_part(&mut parts, PartKind::RawBytes, &[]).unwrap();
        bake_table_part::<Pair>(&mut parts, PartKind::ResourceTable, &[]).unwrap();
        assert!(parts.is_empty());
    }

    #[test]
    fn test_table_part_uses_aligned_stride() {
        let mut parts = vec![];
        bake_table_part(
            &mut parts,
            PartKind::ResourceTable,
            &[Pair(1, 2), Pair(3, 4), Pair(5, 6)],
        )
        .unwrap();

        let part = Part::read(&parts[0], 0).unwrap();
        assert_eq!(part.data.len() % 4, 0);

        let table = part.table().unwrap();
        assert_eq!(table.count, 3);
        assert_eq!(table.stride, 8);

        let records: Vec<Pair> = table.read_records("pairs").unwrap();
        assert_eq!(records[2].0, 5);
        assert_eq!(records[2].1, 6);
    }

    #[test]
    fn test_part_read_is_bounds_checked() {
        // claims 16 payload bytes but only has 4
        let bytes = [1, 0, 0, 0, 16, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(
            Part::read(&bytes, 0),
            Err(RdatError::Truncated { .. })
        ));
        assert!(matches!(
            Part::read(&bytes, 64),
            Err(RdatError::OffsetOutOfBounds { .. })
        ));

        let misaligned = [1, 0, 0, 0, 3, 0, 0, 0, b'a', b'b', 0];
        assert!(matches!(
            Part::read(&misaligned, 0),
            Err(RdatError::MisalignedPart { size: 3, .. })
        ));
    }
}
