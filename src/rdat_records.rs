//! Fixed-layout records as they are stored in RDAT table parts.
//!
//! These hold raw table references; [`crate::decoder`] and [`crate::encoder`] translate them
//! to and from the model types.

use byteorder::{LittleEndian, WriteBytesExt};

use crate::err::Result;
use crate::index_arrays::IndexArrayRef;
use crate::rdat_part::TableRecord;
use crate::string_table::StringRef;
use crate::utils::ByteCursor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedResourceInfo {
    pub class: u32,
    pub kind: u32,
    pub linear_id: u32,
    pub space: u32,
    pub reg_start: u32,
    pub reg_end: u32,
    pub name: StringRef,
    pub flags: u32,
}

impl TableRecord for EncodedResourceInfo {
    const SIZE: usize = 32;

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        Ok(EncodedResourceInfo {
            class: cursor.u32_named("resource.class")?,
            kind: cursor.u32_named("resource.kind")?,
            linear_id: cursor.u32_named("resource.linear_id")?,
            space: cursor.u32_named("resource.space")?,
            reg_start: cursor.u32_named("resource.reg_start")?,
            reg_end: cursor.u32_named("resource.reg_end")?,
            name: StringRef(cursor.u32_named("resource.name")?),
            flags: cursor.u32_named("resource.flags")?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        for v in [
            self.class,
            self.kind,
            self.linear_id,
            self.space,
            self.reg_start,
            self.reg_end,
            self.name.0,
            self.flags,
        ] {
            out.write_u32::<LittleEndian>(v)?;
        }
        Ok(())
    }
}

/// Version 1 function record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFunctionInfo {
    pub name: StringRef,
    pub unmangled_name: StringRef,
    pub global_resources: IndexArrayRef,
    pub dependencies: IndexArrayRef,
    /// An 8-bit enum padded out to 32 bits.
    pub shader_type: u32,
    pub payload_bytes: u32,
    pub attrib_bytes: u32,
    /// `[low, high]` halves of the 64-bit feature flags. Stored as two words so the record
    /// stays 4-byte aligned.
    pub feature_flags: [u32; 2],
    pub shader_compat_mask: u32,
    pub min_shader_model: u16,
    pub min_type: u16,
}

impl TableRecord for EncodedFunctionInfo {
    const SIZE: usize = 44;

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        Ok(EncodedFunctionInfo {
            name: StringRef(cursor.u32_named("function.name")?),
            unmangled_name: StringRef(cursor.u32_named("function.unmangled_name")?),
            global_resources: IndexArrayRef(cursor.u32_named("function.global_resources")?),
            dependencies: IndexArrayRef(cursor.u32_named("function.dependencies")?),
            shader_type: cursor.u32_named("function.shader_type")?,
            payload_bytes: cursor.u32_named("function.payload_bytes")?,
            attrib_bytes: cursor.u32_named("function.attrib_bytes")?,
            feature_flags: [
                cursor.u32_named("function.feature_flags[0]")?,
                cursor.u32_named("function.feature_flags[1]")?,
            ],
            shader_compat_mask: cursor.u32_named("function.shader_compat_mask")?,
            min_shader_model: cursor.u16_named("function.min_shader_model")?,
            min_type: cursor.u16_named("function.min_type")?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        for v in [
            self.name.0,
            self.unmangled_name.0,
            self.global_resources.0,
            self.dependencies.0,
            self.shader_type,
            self.payload_bytes,
            self.attrib_bytes,
            self.feature_flags[0],
            self.feature_flags[1],
            self.shader_compat_mask,
        ] {
            out.write_u32::<LittleEndian>(v)?;
        }
        out.write_u16::<LittleEndian>(self.min_shader_model)?;
        out.write_u16::<LittleEndian>(self.min_type)?;
        Ok(())
    }
}

/// Version 2 function record: a v1 record followed by wave-size bounds, behaviour flags and
/// a reference to stage-specific info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFunctionInfo2 {
    pub info1: EncodedFunctionInfo,
    pub min_wave_count: u8,
    pub max_wave_count: u8,
    pub shader_behaviour_flags: u16,
    pub extra_info: IndexArrayRef,
}

impl TableRecord for EncodedFunctionInfo2 {
    const SIZE: usize = EncodedFunctionInfo::SIZE + 8;

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        Ok(EncodedFunctionInfo2 {
            info1: EncodedFunctionInfo::read(cursor)?,
            min_wave_count: cursor.u8_named("function.min_wave_count")?,
            max_wave_count: cursor.u8_named("function.max_wave_count")?,
            shader_behaviour_flags: cursor.u16_named("function.shader_behaviour_flags")?,
            extra_info: IndexArrayRef(cursor.u32_named("function.extra_info")?),
        })
    }

    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        self.info1.write(out)?;
        out.write_u8(self.min_wave_count)?;
        out.write_u8(self.max_wave_count)?;
        out.write_u16::<LittleEndian>(self.shader_behaviour_flags)?;
        out.write_u32::<LittleEndian>(self.extra_info.0)?;
        Ok(())
    }
}

// The function table version is detected from the stride alone.
const _: () = assert!(EncodedFunctionInfo::STRIDE != EncodedFunctionInfo2::STRIDE);

/// Subobject record. The payload is a 16-byte union whose meaning depends on `kind`:
///
/// | kind | words |
/// |---|---|
/// | state config | `flags` |
/// | global/local root signature | `bytes offset, bytes size` |
/// | exports association | `subobject name, exports array` |
/// | shader config | `max payload, max attributes` |
/// | pipeline config (0 and 1) | `max recursion depth, flags` |
/// | hit group | `type, any hit, closest hit, intersection` |
///
/// Unused words are zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSubobjectInfo {
    pub kind: u32,
    pub name: StringRef,
    pub payload: [u32; 4],
}

impl TableRecord for EncodedSubobjectInfo {
    const SIZE: usize = 24;

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let kind = cursor.u32_named("subobject.kind")?;
        let name = StringRef(cursor.u32_named("subobject.name")?);
        let words = cursor.u32_vec(4, "subobject.payload")?;
        Ok(EncodedSubobjectInfo {
            kind,
            name,
            payload: [words[0], words[1], words[2], words[3]],
        })
    }

    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        out.write_u32::<LittleEndian>(self.kind)?;
        out.write_u32::<LittleEndian>(self.name.0)?;
        for v in self.payload {
            out.write_u32::<LittleEndian>(v)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sizes() {
        assert_eq!(EncodedResourceInfo::STRIDE, 32);
        assert_eq!(EncodedFunctionInfo::STRIDE, 44);
        assert_eq!(EncodedFunctionInfo2::STRIDE, 52);
        assert_eq!(EncodedSubobjectInfo::STRIDE, 24);
    }

    #[test]
    fn test_function2_layout() {
        let record = EncodedFunctionInfo2 {
            info1: EncodedFunctionInfo {
                name: StringRef(1),
                unmangled_name: StringRef(6),
                global_resources: IndexArrayRef(0),
                dependencies: IndexArrayRef::NULL,
                shader_type: 0,
                payload_bytes: 0,
                attrib_bytes: 0,
                feature_flags: [0x10, 0x2],
                shader_compat_mask: 0x1,
                min_shader_model: 0x66,
                min_type: 0,
            },
            min_wave_count: 4,
            max_wave_count: 64,
            shader_behaviour_flags: 0x2,
            extra_info: IndexArrayRef::NULL,
        };

        let mut bytes = vec![];
        record.write(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 52);
        assert_eq!(&bytes[28..36], &[0x10, 0, 0, 0, 0x2, 0, 0, 0]);
        assert_eq!(&bytes[40..48], &[0x66, 0, 0, 0, 4, 64, 0x2, 0]);

        let mut cursor = ByteCursor::new(&bytes);
        assert_eq!(EncodedFunctionInfo2::read(&mut cursor).unwrap(), record);
    }
}
