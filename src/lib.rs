#![forbid(unsafe_code)]
//! A codec for the RDAT (runtime data) chunk of DXIL shader containers.
//!
//! RDAT is a compact, offset-addressed binary format: a small header pointing at a list of
//! parts, some of which are interning tables (strings, `u32` index arrays, raw bytes) and some
//! of which are fixed-stride record tables (resources, functions, subobjects) that refer into
//! the interning tables by offset.
//!
//! [`decode`] turns such a region into an owned [`RdatData`], and [`encode`] turns an
//! [`RdatData`] back into a region. With the default [`RdatSettings`], decoding a
//! compiler-produced chunk and encoding the result reproduces it byte for byte.
//!
//! ```rust
//! use dxil_rdat::{RdatData, ResourceClass, ResourceInfo, ResourceKind, ResourceFlags};
//!
//! let rdat = RdatData {
//!     resource_info: vec![ResourceInfo {
//!         class: ResourceClass::CBuffer,
//!         kind: ResourceKind::CBuffer,
//!         linear_id: 0,
//!         space: 0,
//!         reg_start: 0,
//!         reg_end: 0,
//!         name: "CB0".to_string(),
//!         flags: ResourceFlags::empty(),
//!     }],
//!     ..RdatData::default()
//! };
//!
//! let bytes = dxil_rdat::encode(&rdat).unwrap();
//! assert_eq!(dxil_rdat::decode(&bytes).unwrap(), rdat);
//! ```

#[macro_use]
mod macros;

pub mod container;
pub mod decoder;
pub mod encoder;
pub mod err;
pub mod flags;
pub mod index_arrays;
pub mod model;
pub mod raw_bytes;
pub mod rdat_header;
pub mod rdat_part;
pub mod rdat_records;
pub mod settings;
pub mod string_table;

mod utils;

pub use container::{
    ChunkReplace, FOURCC_RDAT, FourCC, has_pipeline_validation, read_runtime_data,
    read_runtime_data_with_settings, write_runtime_data, write_runtime_data_with_settings,
};
pub use decoder::{RdatDecoder, decode, decode_with_settings};
pub use encoder::{RdatEncoder, encode, encode_with_settings, intern_dependencies};
pub use err::{RdatError, Result};
pub use flags::{
    GlobalShaderFlags, RaytracingPipelineFlags, ResourceFlags, ShaderBehaviourFlags,
    StateObjectFlags,
};
pub use index_arrays::{IndexArrayMode, IndexArrayRef, IndexArrays};
pub use model::{
    ExportsAssociation, FunctionInfo, FunctionInfoVersion, HitGroup, HitGroupType, RdatData,
    ResourceClass, ResourceInfo, ResourceKind, ResourceRef, RootSignature, RtPipeConfig,
    RtShaderConfig, ShaderType, StateConfig, SubobjectData, SubobjectInfo, SubobjectType,
};
pub use raw_bytes::{BytesRef, RawBytes};
pub use rdat_part::PartKind;
pub use settings::RdatSettings;
pub use string_table::{StringRef, StringTable};

#[cfg(test)]
static LOGGER_INIT: std::sync::Once = std::sync::Once::new();

// Tests run concurrently, so the logger is only ever installed once.
#[cfg(test)]
pub(crate) fn ensure_env_logger_initialized() {
    use std::io::Write;

    LOGGER_INIT.call_once(|| {
        let mut builder = env_logger::Builder::from_default_env();
        builder
            .format(|buf, record| writeln!(buf, "[{}] - {}", record.level(), record.args()))
            .is_test(true)
            .init();
    });
}
