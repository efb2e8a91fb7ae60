//! Element precisions understood by the tensor protocol.

use serde::Serialize;
use std::fmt;

/// Element type of a tensor crossing the node boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Fp16,
    Fp32,
    Fp64,
    /// Fixed-stride array of NUL-terminated strings, one byte per element.
    CStringArray,
}

impl Precision {
    /// Width of one element in bytes.
    #[inline]
    pub fn element_size(self) -> usize {
        match self {
            Precision::Bool | Precision::I8 | Precision::U8 | Precision::CStringArray => 1,
            Precision::I16 | Precision::U16 | Precision::Fp16 => 2,
            Precision::I32 | Precision::U32 | Precision::Fp32 => 4,
            Precision::I64 | Precision::U64 | Precision::Fp64 => 8,
        }
    }

    /// Short name used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Precision::Bool => "BOOL",
            Precision::I8 => "I8",
            Precision::I16 => "I16",
            Precision::I32 => "I32",
            Precision::I64 => "I64",
            Precision::U8 => "U8",
            Precision::U16 => "U16",
            Precision::U32 => "U32",
            Precision::U64 => "U64",
            Precision::Fp16 => "FP16",
            Precision::Fp32 => "FP32",
            Precision::Fp64 => "FP64",
            Precision::CStringArray => "C_STRING_ARRAY",
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
