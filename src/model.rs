//! The decoded, offset-free form of an RDAT chunk.
//!
//! Nothing in here refers to a string/index/byte table: every reference has been resolved
//! into an owned value, so an [`RdatData`] can be freely edited and re-encoded.

use serde::{Deserialize, Serialize};

use crate::flags::{
    GlobalShaderFlags, RaytracingPipelineFlags, ResourceFlags, ShaderBehaviourFlags,
    StateObjectFlags,
};

raw_enum! {
    /// Binding namespace of a resource.
    pub enum ResourceClass {
        Srv = 0,
        Uav = 1,
        CBuffer = 2,
        Sampler = 3,
        Invalid = 4,
    }
}

raw_enum! {
    pub enum ResourceKind {
        Invalid = 0,
        Texture1D = 1,
        Texture2D = 2,
        Texture2DMs = 3,
        Texture3D = 4,
        TextureCube = 5,
        Texture1DArray = 6,
        Texture2DArray = 7,
        Texture2DMsArray = 8,
        TextureCubeArray = 9,
        TypedBuffer = 10,
        RawBuffer = 11,
        StructuredBuffer = 12,
        CBuffer = 13,
        Sampler = 14,
        TBuffer = 15,
        RtAccelerationStructure = 16,
        FeedbackTexture2D = 17,
        FeedbackTexture2DArray = 18,
    }
}

raw_enum! {
    pub enum ShaderType {
        Pixel = 0,
        Vertex = 1,
        Geometry = 2,
        Hull = 3,
        Domain = 4,
        Compute = 5,
        Library = 6,
        RayGeneration = 7,
        Intersection = 8,
        AnyHit = 9,
        ClosestHit = 10,
        Miss = 11,
        Callable = 12,
        Mesh = 13,
        Amplification = 14,
        Node = 15,
    }
}

raw_enum! {
    pub enum HitGroupType {
        Triangle = 0,
        ProceduralPrimitive = 1,
    }
}

raw_enum! {
    /// The numeric type tag stored in a subobject record.
    pub enum SubobjectType {
        StateConfig = 0,
        GlobalRootSignature = 1,
        LocalRootSignature = 2,
        SubobjectToExportsAssociation = 8,
        RaytracingShaderConfig = 9,
        RaytracingPipelineConfig = 10,
        HitGroup = 11,
        RaytracingPipelineConfig1 = 12,
    }
}

/// Which function record layout a function table uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FunctionInfoVersion {
    V1,
    #[default]
    V2,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInfo {
    pub class: ResourceClass,
    pub kind: ResourceKind,
    pub linear_id: u32,
    pub space: u32,
    pub reg_start: u32,
    pub reg_end: u32,
    pub name: String,
    pub flags: ResourceFlags,
}

impl ResourceInfo {
    /// Whether this resource is the one identified by `(class, linear_id)`.
    pub fn is(&self, class: ResourceClass, linear_id: u32) -> bool {
        u32::from(self.class) == u32::from(class) && self.linear_id == linear_id
    }
}

/// Cross-reference from a function to a declared resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    pub class: ResourceClass,
    pub linear_id: u32,
}

impl ResourceRef {
    pub fn new(class: ResourceClass, linear_id: u32) -> Self {
        ResourceRef { class, linear_id }
    }
}

/// Function metadata. The trailing wave/behaviour/extra-info fields are only stored by
/// [`FunctionInfoVersion::V2`] tables; a v1 table decodes them as their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    pub unmangled_name: String,
    pub global_resources: Vec<ResourceRef>,
    pub dependencies: Vec<String>,
    pub shader_type: ShaderType,
    pub payload_bytes: u32,
    pub attrib_bytes: u32,
    pub feature_flags: GlobalShaderFlags,
    /// Bitmask (by [`ShaderType`] value) of the stages this function may be used with.
    pub shader_compat_mask: u32,
    pub min_shader_model: u16,
    pub min_type: u16,
    pub min_wave_count: u8,
    pub max_wave_count: u8,
    pub shader_behaviour_flags: ShaderBehaviourFlags,
    /// Index into a stage-specific info table. No producer emits this yet, so it must be `None`.
    pub extra_info_ref: Option<u32>,
}

impl Default for FunctionInfo {
    fn default() -> Self {
        FunctionInfo {
            name: String::new(),
            unmangled_name: String::new(),
            global_resources: Vec::new(),
            dependencies: Vec::new(),
            shader_type: ShaderType::Library,
            payload_bytes: 0,
            attrib_bytes: 0,
            feature_flags: GlobalShaderFlags::empty(),
            shader_compat_mask: 0,
            min_shader_model: 0,
            min_type: 0,
            min_wave_count: 0,
            max_wave_count: 0,
            shader_behaviour_flags: ShaderBehaviourFlags::empty(),
            extra_info_ref: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateConfig {
    pub flags: StateObjectFlags,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RootSignature {
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExportsAssociation {
    pub subobject: String,
    pub exports: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RtShaderConfig {
    pub max_payload_bytes: u32,
    pub max_attrib_bytes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RtPipeConfig {
    pub max_trace_recursion_depth: u32,
    pub flags: RaytracingPipelineFlags,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitGroup {
    pub hit_group_type: HitGroupType,
    pub any_hit: String,
    pub closest_hit: String,
    pub intersection: String,
}

/// The payload of a subobject, one variant per subobject type.
///
/// Types that share a payload layout on the wire (the two root signatures, the two pipeline
/// configs) are still distinct variants, so the type tag can never disagree with the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubobjectData {
    StateConfig(StateConfig),
    GlobalRootSignature(RootSignature),
    LocalRootSignature(RootSignature),
    SubobjectToExportsAssociation(ExportsAssociation),
    RaytracingShaderConfig(RtShaderConfig),
    RaytracingPipelineConfig(RtPipeConfig),
    RaytracingPipelineConfig1(RtPipeConfig),
    HitGroup(HitGroup),
    /// A type this crate cannot decode; only the raw type tag is kept.
    Unknown(u32),
}

impl SubobjectData {
    pub fn subobject_type(&self) -> SubobjectType {
        match self {
            SubobjectData::StateConfig(_) => SubobjectType::StateConfig,
            SubobjectData::GlobalRootSignature(_) => SubobjectType::GlobalRootSignature,
            SubobjectData::LocalRootSignature(_) => SubobjectType::LocalRootSignature,
            SubobjectData::SubobjectToExportsAssociation(_) => {
                SubobjectType::SubobjectToExportsAssociation
            }
            SubobjectData::RaytracingShaderConfig(_) => SubobjectType::RaytracingShaderConfig,
            SubobjectData::RaytracingPipelineConfig(_) => SubobjectType::RaytracingPipelineConfig,
            SubobjectData::RaytracingPipelineConfig1(_) => {
                SubobjectType::RaytracingPipelineConfig1
            }
            SubobjectData::HitGroup(_) => SubobjectType::HitGroup,
            SubobjectData::Unknown(raw) => SubobjectType::from(*raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubobjectInfo {
    pub name: String,
    pub data: SubobjectData,
}

impl SubobjectInfo {
    pub fn subobject_type(&self) -> SubobjectType {
        self.data.subobject_type()
    }
}

/// The root of a decoded RDAT chunk.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RdatData {
    pub resource_info: Vec<ResourceInfo>,
    pub function_version: FunctionInfoVersion,
    pub function_info: Vec<FunctionInfo>,
    pub subobjects_info: Vec<SubobjectInfo>,
}

impl RdatData {
    /// Position of the resource identified by `(class, linear_id)` in [`RdatData::resource_info`].
    pub fn resource_index(&self, resource: ResourceRef) -> Option<usize> {
        self.resource_info
            .iter()
            .position(|r| r.is(resource.class, resource.linear_id))
    }

    pub fn is_empty(&self) -> bool {
        self.resource_info.is_empty()
            && self.function_info.is_empty()
            && self.subobjects_info.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_enums_preserve_unknown_values() {
        assert_eq!(ResourceClass::from(2), ResourceClass::CBuffer);
        assert_eq!(ResourceClass::from(77), ResourceClass::Unknown(77));
        assert_eq!(u32::from(ResourceClass::Unknown(77)), 77);
        assert_eq!(u32::from(SubobjectType::RaytracingPipelineConfig1), 12);
    }

    #[test]
    fn test_unknown_subobject_reports_its_raw_type() {
        let sub = SubobjectInfo {
            name: "mystery".to_string(),
            data: SubobjectData::Unknown(99),
        };
        assert_eq!(sub.subobject_type(), SubobjectType::Unknown(99));
    }

    #[test]
    fn test_resource_index_matches_class_and_linear_id() {
        let mut rdat = RdatData::default();
        for (class, id) in [(ResourceClass::Srv, 0), (ResourceClass::CBuffer, 0)] {
            rdat.resource_info.push(ResourceInfo {
                class,
                kind: ResourceKind::Texture2D,
                linear_id: id,
                space: 0,
                reg_start: 0,
                reg_end: 0,
                name: String::new(),
                flags: ResourceFlags::empty(),
            });
        }

        assert_eq!(
            rdat.resource_index(ResourceRef::new(ResourceClass::CBuffer, 0)),
            Some(1)
        );
        assert_eq!(
            rdat.resource_index(ResourceRef::new(ResourceClass::Uav, 0)),
            None
        );
        // a raw class value still names the known class
        assert_eq!(
            rdat.resource_index(ResourceRef::new(ResourceClass::Unknown(2), 0)),
            Some(1)
        );
    }

    #[test]
    fn test_unknown_with_a_known_value_deserializes_as_the_known_variant() {
        let class: ResourceClass = serde_json::from_str(r#"{"Unknown":2}"#).unwrap();
        assert_eq!(class, ResourceClass::CBuffer);

        let class: ResourceClass = serde_json::from_str(r#"{"Unknown":77}"#).unwrap();
        assert_eq!(class, ResourceClass::Unknown(77));

        let class: ResourceClass = serde_json::from_str(r#""Srv""#).unwrap();
        assert_eq!(class, ResourceClass::Srv);
    }
}
