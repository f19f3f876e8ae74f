use thiserror::Error;

use crate::rdat_part::PartKind;

pub type Result<T> = std::result::Result<T, RdatError>;

#[derive(Debug, Error)]
pub enum RdatError {
    #[error("unsupported RDAT version 0x{found:x}, expected 0x{expected:x}")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("buffer too small for {what} at offset {offset} (need {need} bytes, have {have})")]
    Truncated {
        what: &'static str,
        offset: u32,
        need: usize,
        have: usize,
    },

    #[error("offset {offset} out of bounds for {what} (len={len})")]
    OffsetOutOfBounds {
        what: &'static str,
        offset: u32,
        len: usize,
    },

    #[error("{kind:?} part at offset {offset} has size {size}, which is not 4-byte aligned")]
    MisalignedPart {
        kind: PartKind,
        offset: u32,
        size: u32,
    },

    #[error("{table} has stride {stride}, expected {expected}")]
    StrideMismatch {
        table: &'static str,
        stride: u32,
        expected: u32,
    },

    #[error("function table has stride {stride}, which matches neither v1 ({v1}) nor v2 ({v2})")]
    UnknownFunctionStride { stride: u32, v1: u32, v2: u32 },

    #[error("string at offset {offset} is not NUL-terminated")]
    UnterminatedString { offset: u32 },

    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidString { offset: u32 },

    #[error("function `{function}` references resource index {index}, but only {count} resources are declared")]
    ResourceIndexOutOfRange {
        function: String,
        index: u32,
        count: usize,
    },

    #[error("function `{function}` carries extra info at offset {offset}, which cannot be decoded")]
    UnsupportedExtraInfo { function: String, offset: u32 },

    #[error("subobject `{name}`: raytracing pipeline config (v0) must not carry flags, found 0x{flags:x}")]
    InvalidPipelineConfigFlags { name: String, flags: u32 },

    #[error("unknown RDAT part kind {kind}")]
    UnknownPart { kind: u32 },

    #[error("subobject `{name}` has unknown type {kind}")]
    UnknownSubobject { name: String, kind: u32 },

    #[error("function `{function}` references resource ({class:?}, {linear_id}) which is not declared")]
    UnresolvedResource {
        function: String,
        class: crate::model::ResourceClass,
        linear_id: u32,
    },

    #[error("function `{function}` carries extra info {value:#x}, which cannot be encoded")]
    UnexpectedExtraInfo { function: String, value: u32 },

    #[error("string {value:?} contains a NUL byte and cannot be stored in the string table")]
    EmbeddedNul { value: String },

    #[error("value {value} does not fit in {what}")]
    ValueOutOfRange { what: &'static str, value: u64 },

    #[error("failed to replace container chunk `{fourcc}`: {message}")]
    ChunkReplace { fourcc: String, message: String },

    #[error("an I/O error has occurred: {0}")]
    Io(#[from] std::io::Error),
}

pub(crate) fn usize_to_u32(v: usize) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX)
}

/// Narrows a buffer length or offset to the `u32` used on the wire.
pub(crate) fn checked_u32(v: usize, what: &'static str) -> Result<u32> {
    u32::try_from(v).map_err(|_| RdatError::ValueOutOfRange {
        what,
        value: v as u64,
    })
}
