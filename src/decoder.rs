//! Two-pass RDAT decoder.
//!
//! Records may reference string/index/byte tables that appear later in the chunk, so decoding
//! is split in two: the interning tables are loaded from every part first, then the structured
//! tables are decoded against the now-complete interning tables.

use log::{debug, trace, warn};

use crate::err::{RdatError, Result};
use crate::flags::{
    GlobalShaderFlags, RaytracingPipelineFlags, ResourceFlags, ShaderBehaviourFlags,
    StateObjectFlags,
};
use crate::index_arrays::{IndexArrayMode, IndexArrayRef, IndexArrays};
use crate::model::{
    ExportsAssociation, FunctionInfo, FunctionInfoVersion, HitGroup, RdatData, ResourceInfo,
    ResourceRef, RootSignature, RtPipeConfig, RtShaderConfig, StateConfig, SubobjectData,
    SubobjectInfo, SubobjectType,
};
use crate::raw_bytes::{BytesRef, RawBytes};
use crate::rdat_header::RdatHeader;
use crate::rdat_part::{Part, PartKind, Table, TableRecord};
use crate::rdat_records::{
    EncodedFunctionInfo, EncodedFunctionInfo2, EncodedResourceInfo, EncodedSubobjectInfo,
};
use crate::settings::RdatSettings;
use crate::string_table::{StringRef, StringTable};

/// Decodes an RDAT region with the default settings.
///
/// `region` starts at the RDAT header; part offsets are resolved relative to it.
pub fn decode(region: &[u8]) -> Result<RdatData> {
    decode_with_settings(region, RdatSettings::default())
}

pub fn decode_with_settings(region: &[u8], settings: RdatSettings) -> Result<RdatData> {
    let mut decoder = RdatDecoder::new(region, settings)?;
    decoder.load_tables();
    decoder.decode_tables()
}

/// Decoder state for one RDAT region. The interning tables it loads are never shared with any
/// other decode.
pub struct RdatDecoder<'a> {
    settings: RdatSettings,
    parts: Vec<Part<'a>>,
    strings: StringTable,
    index_arrays: IndexArrays,
    raw_bytes: RawBytes,
}

impl<'a> RdatDecoder<'a> {
    /// Reads the header and locates (and bounds-checks) every part.
    pub fn new(region: &'a [u8], settings: RdatSettings) -> Result<Self> {
        let header = RdatHeader::from_bytes(region)?;
        let parts = header
            .part_offsets
            .iter()
            .map(|&offset| Part::read(region, offset))
            .collect::<Result<Vec<_>>>()?;

        Ok(RdatDecoder {
            settings,
            parts,
            strings: StringTable::new(),
            index_arrays: IndexArrays::new(IndexArrayMode::Prefixed),
            raw_bytes: RawBytes::new(),
        })
    }

    /// First pass: load the interning tables, ignoring every other part.
    pub fn load_tables(&mut self) {
        for part in &self.parts {
            match part.kind {
                PartKind::StringBuffer => self.strings.load(part.data),
                PartKind::IndexArrays => self.index_arrays.load(part.data),
                PartKind::RawBytes => self.raw_bytes.load(part.data),
                _ => {}
            }
        }
        debug!(
            "loaded {} string bytes, {} index words, {} raw bytes",
            self.strings.as_bytes().len(),
            self.index_arrays.values().len(),
            self.raw_bytes.len()
        );
    }

    /// Second pass: decode the resource, function and subobject tables.
    pub fn decode_tables(&self) -> Result<RdatData> {
        let mut rdat = RdatData::default();

        for part in &self.parts {
            match part.kind {
                PartKind::StringBuffer | PartKind::IndexArrays | PartKind::RawBytes => {}
                PartKind::ResourceTable => {
                    let table = part.table()?;
                    for record in table.read_records::<EncodedResourceInfo>("resource table")? {
                        rdat.resource_info.push(self.decode_resource(&record)?);
                    }
                }
                PartKind::FunctionTable => {
                    let table = part.table()?;
                    self.decode_functions(&table, &mut rdat)?;
                }
                PartKind::SubobjectTable => {
                    let table = part.table()?;
                    for record in table.read_records::<EncodedSubobjectInfo>("subobject table")? {
                        rdat.subobjects_info.push(self.decode_subobject(&record)?);
                    }
                }
                PartKind::Invalid | PartKind::Unknown(_) => {
                    let kind = u32::from(part.kind);
                    if self.settings.is_strict() {
                        return Err(RdatError::UnknownPart { kind });
                    }
                    warn!("Unhandled RDAT part {}, will not round-trip", kind);
                }
            }
        }

        Ok(rdat)
    }

    fn string(&self, r: StringRef) -> Result<String> {
        self.strings.get(r).map(str::to_string)
    }

    fn string_array(&self, r: IndexArrayRef) -> Result<Vec<String>> {
        if r.is_null() {
            return Ok(Vec::new());
        }
        self.index_arrays
            .span(r)?
            .iter()
            .map(|&offset| self.string(StringRef(offset)))
            .collect()
    }

    fn decode_resource(&self, record: &EncodedResourceInfo) -> Result<ResourceInfo> {
        Ok(ResourceInfo {
            class: record.class.into(),
            kind: record.kind.into(),
            linear_id: record.linear_id,
            space: record.space,
            reg_start: record.reg_start,
            reg_end: record.reg_end,
            name: self.string(record.name)?,
            flags: ResourceFlags::from_bits_retain(record.flags),
        })
    }

    fn decode_functions(&self, table: &Table<'_>, rdat: &mut RdatData) -> Result<()> {
        let stride = table.stride as usize;
        let version = if stride == EncodedFunctionInfo::STRIDE {
            FunctionInfoVersion::V1
        } else if stride == EncodedFunctionInfo2::STRIDE {
            FunctionInfoVersion::V2
        } else {
            return Err(RdatError::UnknownFunctionStride {
                stride: table.stride,
                v1: EncodedFunctionInfo::STRIDE as u32,
                v2: EncodedFunctionInfo2::STRIDE as u32,
            });
        };
        debug!("function table is {:?} ({} records)", version, table.count);
        rdat.function_version = version;

        match version {
            FunctionInfoVersion::V1 => {
                for record in table.read_records_unchecked::<EncodedFunctionInfo>()? {
                    let func = self.decode_function(&record, &rdat.resource_info)?;
                    rdat.function_info.push(func);
                }
            }
            FunctionInfoVersion::V2 => {
                for record in table.read_records_unchecked::<EncodedFunctionInfo2>()? {
                    let mut func = self.decode_function(&record.info1, &rdat.resource_info)?;

                    if !record.extra_info.is_null() {
                        return Err(RdatError::UnsupportedExtraInfo {
                            function: func.name,
                            offset: record.extra_info.0,
                        });
                    }
                    func.min_wave_count = record.min_wave_count;
                    func.max_wave_count = record.max_wave_count;
                    func.shader_behaviour_flags =
                        ShaderBehaviourFlags::from_bits_retain(record.shader_behaviour_flags);
                    func.extra_info_ref = None;

                    rdat.function_info.push(func);
                }
            }
        }
        Ok(())
    }

    fn decode_function(
        &self,
        record: &EncodedFunctionInfo,
        resources: &[ResourceInfo],
    ) -> Result<FunctionInfo> {
        let name = self.string(record.name)?;
        trace!("decoding function `{}`", name);

        let mut global_resources = Vec::new();
        if !record.global_resources.is_null() {
            for &index in self.index_arrays.span(record.global_resources)? {
                let res = resources.get(index as usize).ok_or_else(|| {
                    RdatError::ResourceIndexOutOfRange {
                        function: name.clone(),
                        index,
                        count: resources.len(),
                    }
                })?;
                global_resources.push(ResourceRef::new(res.class, res.linear_id));
            }
        }

        Ok(FunctionInfo {
            unmangled_name: self.string(record.unmangled_name)?,
            global_resources,
            dependencies: self.string_array(record.dependencies)?,
            shader_type: record.shader_type.into(),
            payload_bytes: record.payload_bytes,
            attrib_bytes: record.attrib_bytes,
            feature_flags: GlobalShaderFlags::from_halves(
                record.feature_flags[0],
                record.feature_flags[1],
            ),
            shader_compat_mask: record.shader_compat_mask,
            min_shader_model: record.min_shader_model,
            min_type: record.min_type,
            name,
            ..FunctionInfo::default()
        })
    }

    fn decode_subobject(&self, record: &EncodedSubobjectInfo) -> Result<SubobjectInfo> {
        let name = self.string(record.name)?;
        let [w0, w1, w2, w3] = record.payload;

        let data = match SubobjectType::from(record.kind) {
            SubobjectType::StateConfig => SubobjectData::StateConfig(StateConfig {
                flags: StateObjectFlags::from_bits_retain(w0),
            }),
            SubobjectType::GlobalRootSignature => {
                SubobjectData::GlobalRootSignature(self.root_signature(w0, w1)?)
            }
            SubobjectType::LocalRootSignature => {
                SubobjectData::LocalRootSignature(self.root_signature(w0, w1)?)
            }
            SubobjectType::SubobjectToExportsAssociation => {
                SubobjectData::SubobjectToExportsAssociation(ExportsAssociation {
                    subobject: self.string(StringRef(w0))?,
                    exports: self.string_array(IndexArrayRef(w1))?,
                })
            }
            SubobjectType::RaytracingShaderConfig => {
                SubobjectData::RaytracingShaderConfig(RtShaderConfig {
                    max_payload_bytes: w0,
                    max_attrib_bytes: w1,
                })
            }
            SubobjectType::RaytracingPipelineConfig => {
                // the v0 config has no flags field, the word is padding from the union
                if w1 != 0 {
                    return Err(RdatError::InvalidPipelineConfigFlags { name, flags: w1 });
                }
                SubobjectData::RaytracingPipelineConfig(RtPipeConfig {
                    max_trace_recursion_depth: w0,
                    flags: RaytracingPipelineFlags::empty(),
                })
            }
            SubobjectType::RaytracingPipelineConfig1 => {
                SubobjectData::RaytracingPipelineConfig1(RtPipeConfig {
                    max_trace_recursion_depth: w0,
                    flags: RaytracingPipelineFlags::from_bits_retain(w1),
                })
            }
            SubobjectType::HitGroup => SubobjectData::HitGroup(HitGroup {
                hit_group_type: w0.into(),
                any_hit: self.string(StringRef(w1))?,
                closest_hit: self.string(StringRef(w2))?,
                intersection: self.string(StringRef(w3))?,
            }),
            SubobjectType::Unknown(kind) => {
                if self.settings.is_strict() {
                    return Err(RdatError::UnknownSubobject { name, kind });
                }
                warn!("Unhandled subobject type {} (`{}`)", kind, name);
                SubobjectData::Unknown(kind)
            }
        };

        Ok(SubobjectInfo { name, data })
    }

    fn root_signature(&self, offset: u32, size: u32) -> Result<RootSignature> {
        Ok(RootSignature {
            data: self.raw_bytes.get(BytesRef { offset, size })?,
        })
    }
}
