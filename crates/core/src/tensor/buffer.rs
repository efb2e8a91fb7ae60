//! Owned output tensors.

use super::string_array::pack_string_rows;
use super::{Precision, TensorView};
use crate::error::{NodeError, Result};
use compact_str::CompactString;

/// Tensor allocated by a node and handed to the host.
///
/// The shape and payload live and die together; there is no separate
/// release for the dims buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    name: CompactString,
    precision: Precision,
    dims: Vec<u64>,
    data: Vec<u8>,
}

impl Tensor {
    /// Build an `I64` tensor from values laid out row-major in `dims`.
    pub fn from_i64(name: &str, dims: Vec<u64>, values: &[i64]) -> Result<Self> {
        let expected = dims
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d as usize));
        if expected != Some(values.len()) {
            return Err(NodeError::Validation(format!(
                "{} shape {:?} does not hold {} values",
                name,
                dims,
                values.len()
            )));
        }

        let bytes: &[u8] = bytemuck::cast_slice(values);
        let mut data = Vec::new();
        data.try_reserve_exact(bytes.len())?;
        data.extend_from_slice(bytes);

        Ok(Self {
            name: CompactString::new(name),
            precision: Precision::I64,
            dims,
            data,
        })
    }

    /// Build a 2-D `CStringArray` tensor with stride `max_len + 1`.
    pub fn string_array<S: AsRef<[u8]>>(name: &str, rows: &[S]) -> Result<Self> {
        let (dims, data) = pack_string_rows(rows)?;
        Ok(Self {
            name: CompactString::new(name),
            precision: Precision::CStringArray,
            dims: dims.to_vec(),
            data,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn precision(&self) -> Precision {
        self.precision
    }

    #[inline]
    pub fn dims(&self) -> &[u64] {
        &self.dims
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Borrow this tensor as if it were a host input.
    pub fn view(&self) -> TensorView<'_> {
        TensorView::new(&self.name, self.precision, &self.dims, &self.data)
    }
}

/// Output set returned by one `execute` call.
///
/// Ownership passes to the caller and comes back through the node's
/// `release`, which consumes it.
#[derive(Debug, Default)]
pub struct NodeOutputs {
    tensors: Vec<Tensor>,
}

impl NodeOutputs {
    pub fn new(tensors: Vec<Tensor>) -> Self {
        Self { tensors }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Find an output by name.
    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.tensors.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tensor> + '_ {
        self.tensors.iter()
    }

    /// Byte size of all payloads, used for diagnostics.
    pub fn total_bytes(&self) -> usize {
        self.tensors.iter().map(|t| t.data.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_i64() {
        let tensor = Tensor::from_i64("tokens", vec![2, 2], &[1, 2, 3, 0]).unwrap();
        assert_eq!(tensor.precision(), Precision::I64);
        assert_eq!(tensor.data().len(), 32);
        assert_eq!(tensor.view().to_i64_vec().unwrap(), vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_from_i64_shape_mismatch() {
        assert!(Tensor::from_i64("tokens", vec![2, 3], &[1, 2]).is_err());
    }

    #[test]
    fn test_string_array() {
        let tensor = Tensor::string_array("texts", &["ab", "c"]).unwrap();
        assert_eq!(tensor.dims(), &[2, 3]);
        assert_eq!(tensor.data(), b"ab\0c\0\0");
    }

    #[test]
    fn test_outputs_lookup() {
        let outputs = NodeOutputs::new(vec![
            Tensor::from_i64("tokens", vec![1, 1], &[5]).unwrap(),
            Tensor::from_i64("attention", vec![1, 1], &[1]).unwrap(),
        ]);
        assert_eq!(outputs.len(), 2);
        assert!(outputs.get("attention").is_some());
        assert!(outputs.get("texts").is_none());
        assert_eq!(outputs.total_bytes(), 16);
    }
}
