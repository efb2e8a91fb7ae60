//! Static input/output schema reported by a node.

use super::Precision;
use compact_str::CompactString;
use serde::Serialize;

/// Dimension size meaning "unconstrained at this position".
pub const DYNAMIC_DIM: i64 = -1;

/// Expected name, rank and precision of one node input or output.
///
/// Rank and precision are always concrete; individual dimensions may be
/// [`DYNAMIC_DIM`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TensorInfo {
    pub name: CompactString,
    pub precision: Precision,
    pub dims: Vec<i64>,
}

impl TensorInfo {
    /// Schema entry with every dimension unconstrained.
    pub fn dynamic(name: &str, precision: Precision, rank: usize) -> Self {
        Self {
            name: CompactString::new(name),
            precision,
            dims: vec![DYNAMIC_DIM; rank],
        }
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }
}
