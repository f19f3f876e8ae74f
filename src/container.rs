//! Glue between the RDAT codec and the shader container that carries it.
//!
//! Locating chunks inside a container and rewriting its chunk directory belong to the container
//! parser. This module only needs the offset of the RDAT chunk data on the way in, and a
//! [`ChunkReplace`] implementation on the way out.

use std::fmt;

use log::debug;

use crate::decoder::decode_with_settings;
use crate::encoder::encode_with_settings;
use crate::err::{RdatError, Result};
use crate::model::RdatData;
use crate::settings::RdatSettings;

/// A four character chunk tag, stored little-endian in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub const fn from_u32(value: u32) -> FourCC {
        FourCC(value.to_le_bytes())
    }

    pub const fn as_u32(self) -> u32 {
        u32::from_le_bytes(self.0)
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

pub const FOURCC_RDAT: FourCC = FourCC(*b"RDAT");

/// A container whose chunks can be replaced (or inserted) wholesale.
pub trait ChunkReplace {
    /// Replaces the data of the chunk tagged `fourcc` with `bytes`, inserting the chunk if the
    /// container has none.
    fn replace_chunk(&mut self, fourcc: FourCC, bytes: &[u8]) -> Result<()>;
}

/// Decodes the RDAT chunk of `blob`.
///
/// `rdat_offset` is the offset of the chunk data inside `blob`, as found by the container
/// parser; `None` means the container has no RDAT chunk, which is not an error.
pub fn read_runtime_data(blob: &[u8], rdat_offset: Option<u32>) -> Result<Option<RdatData>> {
    read_runtime_data_with_settings(blob, rdat_offset, RdatSettings::default())
}

pub fn read_runtime_data_with_settings(
    blob: &[u8],
    rdat_offset: Option<u32>,
    settings: RdatSettings,
) -> Result<Option<RdatData>> {
    let Some(offset) = rdat_offset else {
        debug!("container has no RDAT chunk");
        return Ok(None);
    };

    let region = blob
        .get(offset as usize..)
        .filter(|region| !region.is_empty())
        .ok_or(RdatError::OffsetOutOfBounds {
            what: "RDAT chunk offset",
            offset,
            len: blob.len(),
        })?;

    debug!(
        "decoding RDAT chunk at offset {} ({} bytes to end of blob)",
        offset,
        region.len()
    );
    decode_with_settings(region, settings).map(Some)
}

/// Encodes `rdat` and stores it as the container's RDAT chunk.
pub fn write_runtime_data<C: ChunkReplace + ?Sized>(container: &mut C, rdat: &RdatData) -> Result<()> {
    write_runtime_data_with_settings(container, rdat, RdatSettings::default())
}

pub fn write_runtime_data_with_settings<C: ChunkReplace + ?Sized>(
    container: &mut C,
    rdat: &RdatData,
    settings: RdatSettings,
) -> Result<()> {
    let bytes = encode_with_settings(rdat, settings)?;
    debug!("replacing {} chunk ({} bytes)", FOURCC_RDAT, bytes.len());
    container.replace_chunk(FOURCC_RDAT, &bytes)
}

/// Whether the container carries pipeline state validation data.
///
/// Only presence is reported; the validation chunk itself is not parsed.
pub fn has_pipeline_validation(psv_offset: Option<u32>) -> bool {
    psv_offset.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::ResourceFlags;
    use crate::model::{ResourceClass, ResourceInfo, ResourceKind};
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Chunks(Vec<(FourCC, Vec<u8>)>);

    impl ChunkReplace for Chunks {
        fn replace_chunk(&mut self, fourcc: FourCC, bytes: &[u8]) -> Result<()> {
            match self.0.iter_mut().find(|(tag, _)| *tag == fourcc) {
                Some((_, data)) => *data = bytes.to_vec(),
                None => self.0.push((fourcc, bytes.to_vec())),
            }
            Ok(())
        }
    }

    fn sample() -> RdatData {
        RdatData {
            resource_info: vec![ResourceInfo {
                class: ResourceClass::Srv,
                kind: ResourceKind::Texture2D,
                linear_id: 0,
                space: 0,
                reg_start: 0,
                reg_end: 0,
                name: "tex".to_string(),
                flags: ResourceFlags::empty(),
            }],
            ..RdatData::default()
        }
    }

    #[test]
    fn test_fourcc_matches_the_container_byte_order() {
        assert_eq!(FOURCC_RDAT.as_u32(), 0x5441_4452);
        assert_eq!(FourCC::from_u32(0x5441_4452), FOURCC_RDAT);
        assert_eq!(FOURCC_RDAT.to_string(), "RDAT");
    }

    #[test]
    fn test_absent_chunk_is_not_an_error() {
        assert_eq!(read_runtime_data(&[], None).unwrap(), None);
    }

    #[test]
    fn test_offset_past_the_blob_is_rejected() {
        assert!(matches!(
            read_runtime_data(&[0u8; 8], Some(8)),
            Err(RdatError::OffsetOutOfBounds { offset: 8, .. })
        ));
    }

    #[test]
    fn test_write_then_read_through_a_container() {
        let rdat = sample();
        let mut chunks = Chunks::default();
        write_runtime_data(&mut chunks, &rdat).unwrap();
        write_runtime_data(&mut chunks, &rdat).unwrap();
        assert_eq!(chunks.0.len(), 1);

        // pretend the chunk sits behind a 32-byte container header
        let (tag, data) = &chunks.0[0];
        assert_eq!(*tag, FOURCC_RDAT);
        let mut blob = vec![0u8; 32];
        blob.extend_from_slice(data);

        assert_eq!(read_runtime_data(&blob, Some(32)).unwrap(), Some(rdat));
    }

    #[test]
    fn test_pipeline_validation_is_a_presence_check() {
        assert!(has_pipeline_validation(Some(0x40)));
        assert!(!has_pipeline_validation(None));
    }
}
