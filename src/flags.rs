//! Bit-flag fields carried by RDAT records.
//!
//! All flag types are built with `from_bits_retain` on decode, so bits this crate has no name
//! for survive a decode/encode round trip.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ResourceFlags: u32 {
        const GLOBALLY_COHERENT = 0x1;
        const HAS_COUNTER = 0x2;
        const RASTERIZER_ORDERED_VIEW = 0x4;
        const DYNAMIC_INDEXING = 0x8;
        const ATOMICS_64_USE = 0x10;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ShaderBehaviourFlags: u16 {
        const NODE_PROGRAM_ENTRY = 0x1;
        const OUTPUT_POSITION_PRESENT = 0x2;
        const DEPTH_OUTPUT = 0x4;
        const SAMPLE_FREQUENCY = 0x8;
        const USES_VIEW_ID = 0x10;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct StateObjectFlags: u32 {
        const LOCAL_DEPENDENCIES_ON_EXTERNAL_DEFINITIONS = 0x1;
        const EXTERNAL_DEPENDENCIES_ON_LOCAL_DEFINITIONS = 0x2;
        const ALLOW_STATE_OBJECT_ADDITIONS = 0x4;
    }
}

bitflags! {
    /// Flags of a raytracing pipeline config. The v0 config must always carry none.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct RaytracingPipelineFlags: u32 {
        const SKIP_TRIANGLES = 0x100;
        const SKIP_PROCEDURAL_PRIMITIVES = 0x200;
    }
}

bitflags! {
    /// Shader feature flags required by a function (64 bits, stored as two 32-bit halves).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct GlobalShaderFlags: u64 {
        const DOUBLES = 0x1;
        const COMPUTE_SHADERS_PLUS_RAW_AND_STRUCTURED_BUFFERS = 0x2;
        const UAVS_AT_EVERY_STAGE = 0x4;
        const UAVS_64 = 0x8;
        const MINIMUM_PRECISION = 0x10;
        const DOUBLE_EXTENSIONS_11_1 = 0x20;
        const SHADER_EXTENSIONS_11_1 = 0x40;
        const LEVEL9_COMPARISON_FILTERING = 0x80;
        const TILED_RESOURCES = 0x100;
        const STENCIL_REF = 0x200;
        const INNER_COVERAGE = 0x400;
        const TYPED_UAV_LOAD_ADDITIONAL_FORMATS = 0x800;
        const ROVS = 0x1000;
        const VIEWPORT_AND_RT_ARRAY_INDEX_FROM_ANY_SHADER = 0x2000;
        const WAVE_OPS = 0x4000;
        const INT64_OPS = 0x8000;
        const VIEW_ID = 0x1_0000;
        const BARYCENTRICS = 0x2_0000;
        const NATIVE_LOW_PRECISION = 0x4_0000;
        const SHADING_RATE = 0x8_0000;
        const RAYTRACING_TIER_1_1 = 0x10_0000;
        const SAMPLER_FEEDBACK = 0x20_0000;
        const ATOMIC_INT64_ON_TYPED_RESOURCE = 0x40_0000;
        const ATOMIC_INT64_ON_GROUP_SHARED = 0x80_0000;
        const DERIVATIVES_IN_MESH_AND_AMP_SHADERS = 0x100_0000;
        const RESOURCE_DESCRIPTOR_HEAP_INDEXING = 0x200_0000;
        const SAMPLER_DESCRIPTOR_HEAP_INDEXING = 0x400_0000;
        const ATOMIC_INT64_ON_HEAP_RESOURCE = 0x1000_0000;
    }
}

impl GlobalShaderFlags {
    /// Splits the flags into the `(low, high)` 32-bit halves stored on the wire.
    pub fn to_halves(self) -> (u32, u32) {
        let bits = self.bits();
        ((bits & 0xffff_ffff) as u32, (bits >> 32) as u32)
    }

    pub fn from_halves(low: u32, high: u32) -> Self {
        Self::from_bits_retain(u64::from(low) | (u64::from(high) << 32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_flags_split_into_halves() {
        let flags = GlobalShaderFlags::from_bits_retain(0x0000_0001_8000_4001);
        assert_eq!(flags.to_halves(), (0x8000_4001, 0x1));
        assert_eq!(GlobalShaderFlags::from_halves(0x8000_4001, 0x1), flags);
    }

    #[test]
    fn test_unnamed_bits_are_retained() {
        let flags = ResourceFlags::from_bits_retain(0x8000_0002);
        assert!(flags.contains(ResourceFlags::HAS_COUNTER));
        assert_eq!(flags.bits(), 0x8000_0002);
    }
}
