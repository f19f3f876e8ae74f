//! Ordered RDAT encoder.
//!
//! The interning order below decides every offset in the output, and it follows the compiler
//! exactly: resource names, then every function's dependency names, then each function's own
//! strings and arrays, then subobjects. Changing the order still yields a valid chunk, but not
//! a byte-identical one.

use log::{debug, trace, warn};

use crate::err::{RdatError, Result, checked_u32};
use crate::index_arrays::{IndexArrayMode, IndexArrayRef, IndexArrays};
use crate::model::{FunctionInfo, FunctionInfoVersion, RdatData, SubobjectData, SubobjectInfo};
use crate::raw_bytes::RawBytes;
use crate::rdat_header::RdatHeader;
use crate::rdat_part::{PartKind, bake_blob_part, bake_table_part};
use crate::rdat_records::{
    EncodedFunctionInfo, EncodedFunctionInfo2, EncodedResourceInfo, EncodedSubobjectInfo,
};
use crate::settings::RdatSettings;
use crate::string_table::StringTable;

/// Encodes `rdat` into a complete RDAT region with the default settings.
pub fn encode(rdat: &RdatData) -> Result<Vec<u8>> {
    encode_with_settings(rdat, RdatSettings::default())
}

pub fn encode_with_settings(rdat: &RdatData, settings: RdatSettings) -> Result<Vec<u8>> {
    RdatEncoder::new(settings).encode(rdat)
}

/// Interns the dependency names of every function into `strings`, in function order, and
/// returns the string offsets of each function's dependencies.
///
/// The compiler resolves all cross-function dependency names before it writes any function's
/// own name, so this has to run before the function records are built.
pub fn intern_dependencies(
    strings: &mut StringTable,
    functions: &[FunctionInfo],
    dedup: bool,
) -> Result<Vec<Vec<u32>>> {
    functions
        .iter()
        .map(|func| {
            func.dependencies
                .iter()
                .map(|dep| strings.make_ref(dep, dedup).map(|r| r.0))
                .collect()
        })
        .collect()
}

/// Encoder state for one RDAT region. Every call to [`encode`] builds fresh interning
/// tables.
pub struct RdatEncoder {
    settings: RdatSettings,
    strings: StringTable,
    index_arrays: IndexArrays,
    raw_bytes: RawBytes,
}

impl RdatEncoder {
    pub fn new(settings: RdatSettings) -> Self {
        RdatEncoder {
            settings,
            strings: StringTable::new(),
            index_arrays: IndexArrays::new(IndexArrayMode::Prefixed),
            raw_bytes: RawBytes::new(),
        }
    }

    /// Encodes `rdat`, consuming the encoder.
    pub fn encode(mut self, rdat: &RdatData) -> Result<Vec<u8>> {
        let dedup = self.settings.should_deduplicate();

        let resources = rdat
            .resource_info
            .iter()
            .map(|res| {
                Ok(EncodedResourceInfo {
                    class: res.class.into(),
                    kind: res.kind.into(),
                    linear_id: res.linear_id,
                    space: res.space,
                    reg_start: res.reg_start,
                    reg_end: res.reg_end,
                    name: self.strings.make_ref(&res.name, dedup)?,
                    flags: res.flags.bits(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let dependencies = intern_dependencies(&mut self.strings, &rdat.function_info, dedup)?;

        let mut functions = Vec::new();
        let mut functions2 = Vec::new();
        for (func, deps) in rdat.function_info.iter().zip(&dependencies) {
            let info1 = self.encode_function(rdat, func, deps)?;
            match rdat.function_version {
                FunctionInfoVersion::V1 => functions.push(info1),
                FunctionInfoVersion::V2 => {
                    if let Some(value) = func.extra_info_ref {
                        return Err(RdatError::UnexpectedExtraInfo {
                            function: func.name.clone(),
                            value,
                        });
                    }
                    functions2.push(EncodedFunctionInfo2 {
                        info1,
                        min_wave_count: func.min_wave_count,
                        max_wave_count: func.max_wave_count,
                        shader_behaviour_flags: func.shader_behaviour_flags.bits(),
                        extra_info: IndexArrayRef::NULL,
                    });
                }
            }
        }

        let subobjects = rdat
            .subobjects_info
            .iter()
            .map(|sub| self.encode_subobject(sub))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "encoding {} resources, {} {:?} functions, {} subobjects",
            resources.len(),
            rdat.function_info.len(),
            rdat.function_version,
            subobjects.len()
        );

        let mut parts = Vec::new();
        bake_blob_part(&mut parts, PartKind::StringBuffer, self.strings.as_bytes())?;
        bake_table_part(&mut parts, PartKind::ResourceTable, &resources)?;
        if !functions.is_empty() {
            bake_table_part(&mut parts, PartKind::FunctionTable, &functions)?;
        } else {
            bake_table_part(&mut parts, PartKind::FunctionTable, &functions2)?;
        }
        bake_blob_part(
            &mut parts,
            PartKind::IndexArrays,
            &self.index_arrays.to_bytes(),
        )?;
        bake_blob_part(&mut parts, PartKind::RawBytes, &self.raw_bytes.into_bytes())?;
        bake_table_part(&mut parts, PartKind::SubobjectTable, &subobjects)?;

        let header = RdatHeader::for_parts(&parts)?;
        let total = RdatHeader::size_for(parts.len()) + parts.iter().map(Vec::len).sum::<usize>();
        let mut out = Vec::with_capacity(total);
        header.write(&mut out)?;
        for part in &parts {
            out.extend_from_slice(part);
        }

        debug!("encoded RDAT region of {} bytes in {} parts", out.len(), parts.len());
        Ok(out)
    }

    fn encode_function(
        &mut self,
        rdat: &RdatData,
        func: &FunctionInfo,
        deps: &[u32],
    ) -> Result<EncodedFunctionInfo> {
        let dedup = self.settings.should_deduplicate();
        trace!("encoding function `{}`", func.name);

        let name = self.strings.make_ref(&func.name, dedup)?;
        let unmangled_name = self.strings.make_ref(&func.unmangled_name, dedup)?;

        let mut resource_indices = Vec::with_capacity(func.global_resources.len());
        for res in &func.global_resources {
            let index = rdat
                .resource_index(*res)
                .ok_or_else(|| RdatError::UnresolvedResource {
                    function: func.name.clone(),
                    class: res.class,
                    linear_id: res.linear_id,
                })?;
            resource_indices.push(checked_u32(index, "resource index")?);
        }
        let global_resources = self.index_arrays.make_ref(&resource_indices, true, dedup)?;
        let dependencies = self.index_arrays.make_ref(deps, true, dedup)?;

        let (low, high) = func.feature_flags.to_halves();

        Ok(EncodedFunctionInfo {
            name,
            unmangled_name,
            global_resources,
            dependencies,
            shader_type: func.shader_type.into(),
            payload_bytes: func.payload_bytes,
            attrib_bytes: func.attrib_bytes,
            feature_flags: [low, high],
            shader_compat_mask: func.shader_compat_mask,
            min_shader_model: func.min_shader_model,
            min_type: func.min_type,
        })
    }

    fn encode_subobject(&mut self, sub: &SubobjectInfo) -> Result<EncodedSubobjectInfo> {
        let dedup = self.settings.should_deduplicate();
        let name = self.strings.make_ref(&sub.name, dedup)?;

        let payload = match &sub.data {
            SubobjectData::StateConfig(config) => [config.flags.bits(), 0, 0, 0],
            SubobjectData::GlobalRootSignature(rs) | SubobjectData::LocalRootSignature(rs) => {
                let bytes = self.raw_bytes.make_ref(&rs.data)?;
                [bytes.offset, bytes.size, 0, 0]
            }
            SubobjectData::SubobjectToExportsAssociation(assoc) => {
                let subobject = self.strings.make_ref(&assoc.subobject, dedup)?;
                let exports = assoc
                    .exports
                    .iter()
                    .map(|export| self.strings.make_ref(export, dedup).map(|r| r.0))
                    .collect::<Result<Vec<_>>>()?;
                let exports = self.index_arrays.make_ref(&exports, false, dedup)?;
                [subobject.0, exports.0, 0, 0]
            }
            SubobjectData::RaytracingShaderConfig(config) => {
                [config.max_payload_bytes, config.max_attrib_bytes, 0, 0]
            }
            SubobjectData::RaytracingPipelineConfig(config) => {
                if !config.flags.is_empty() {
                    return Err(RdatError::InvalidPipelineConfigFlags {
                        name: sub.name.clone(),
                        flags: config.flags.bits(),
                    });
                }
                [config.max_trace_recursion_depth, 0, 0, 0]
            }
            SubobjectData::RaytracingPipelineConfig1(config) => {
                [config.max_trace_recursion_depth, config.flags.bits(), 0, 0]
            }
            SubobjectData::HitGroup(group) => {
                let any_hit = self.strings.make_ref(&group.any_hit, dedup)?;
                let closest_hit = self.strings.make_ref(&group.closest_hit, dedup)?;
                let intersection = self.strings.make_ref(&group.intersection, dedup)?;
                [
                    group.hit_group_type.into(),
                    any_hit.0,
                    closest_hit.0,
                    intersection.0,
                ]
            }
            SubobjectData::Unknown(kind) => {
                if self.settings.is_strict() {
                    return Err(RdatError::UnknownSubobject {
                        name: sub.name.clone(),
                        kind: *kind,
                    });
                }
                warn!("Unhandled subobject type {} (`{}`)", kind, sub.name);
                [0; 4]
            }
        };

        Ok(EncodedSubobjectInfo {
            kind: sub.subobject_type().into(),
            name,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::string_table::StringRef;
    use pretty_assertions::assert_eq;

    fn function(name: &str, deps: &[&str]) -> FunctionInfo {
        FunctionInfo {
            name: name.to_string(),
            unmangled_name: name.to_string(),
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
            ..FunctionInfo::default()
        }
    }

    #[test]
    fn test_dependencies_are_interned_in_function_order() {
        let functions = vec![function("a", &["x", "y"]), function("b", &["y", "z"])];
        let mut strings = StringTable::new();

        let offsets = intern_dependencies(&mut strings, &functions, true).unwrap();

        assert_eq!(strings.as_bytes(), b"\0x\0y\0z\0");
        assert_eq!(offsets, vec![vec![1, 3], vec![3, 5]]);
        assert_eq!(strings.get(StringRef(5)).unwrap(), "z");
    }

    #[test]
    fn test_dependencies_without_dedup_keep_their_own_copies() {
        let functions = vec![function("a", &["x"]), function("b", &["x"])];
        let mut strings = StringTable::new();

        let offsets = intern_dependencies(&mut strings, &functions, false).unwrap();

        assert_eq!(offsets, vec![vec![1], vec![3]]);
    }
}
