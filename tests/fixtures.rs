#![allow(dead_code)]
use dxil_rdat::rdat_header::RdatHeader;
use dxil_rdat::rdat_part::Part;
use dxil_rdat::{
    FunctionInfo, FunctionInfoVersion, RdatData, ResourceClass, ResourceFlags, ResourceInfo,
    ResourceKind, ResourceRef, ShaderType,
};

use std::sync::Once;

static LOGGER_INIT: Once = Once::new();

// Rust runs the tests concurrently, so unless we synchronize logging access
// it will crash when attempting to run `cargo test` with some logging facilities.
pub fn ensure_env_logger_initialized() {
    use std::io::Write;

    LOGGER_INIT.call_once(|| {
        let mut builder = env_logger::Builder::from_default_env();
        builder
            .format(|buf, record| writeln!(buf, "[{}] - {}", record.level(), record.args()))
            .is_test(true)
            .init();
    });
}

pub fn resource(class: ResourceClass, kind: ResourceKind, linear_id: u32, name: &str) -> ResourceInfo {
    ResourceInfo {
        class,
        kind,
        linear_id,
        space: 0,
        reg_start: linear_id,
        reg_end: linear_id,
        name: name.to_string(),
        flags: ResourceFlags::empty(),
    }
}

pub fn function(name: &str, unmangled_name: &str) -> FunctionInfo {
    FunctionInfo {
        name: name.to_string(),
        unmangled_name: unmangled_name.to_string(),
        ..FunctionInfo::default()
    }
}

/// A pixel shader `main` reading one constant buffer.
pub fn single_cbuffer_pixel_shader() -> RdatData {
    RdatData {
        resource_info: vec![resource(
            ResourceClass::CBuffer,
            ResourceKind::CBuffer,
            0,
            "CB0",
        )],
        function_version: FunctionInfoVersion::V2,
        function_info: vec![FunctionInfo {
            global_resources: vec![ResourceRef::new(ResourceClass::CBuffer, 0)],
            shader_type: ShaderType::Pixel,
            shader_compat_mask: 1,
            min_shader_model: 0x60,
            ..function("main", "\x01?main@@YAXXZ")
        }],
        subobjects_info: vec![],
    }
}

/// Assembles a region from already-baked parts.
pub fn region(parts: &[Vec<u8>]) -> Vec<u8> {
    let mut out = vec![];
    RdatHeader::for_parts(parts)
        .unwrap()
        .write(&mut out)
        .unwrap();
    for part in parts {
        out.extend_from_slice(part);
    }
    out
}

/// Every part of an encoded region, in file order.
pub fn parts_of(bytes: &[u8]) -> Vec<Part<'_>> {
    RdatHeader::from_bytes(bytes)
        .unwrap()
        .part_offsets
        .iter()
        .map(|&offset| Part::read(bytes, offset).unwrap())
        .collect()
}

pub fn patch_u32(bytes: &mut [u8], at: usize, value: u32) {
    bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

pub fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
