//! Borrowed view of a tensor handed in by the host.

use super::Precision;
use crate::error::{NodeError, Result};
use bytemuck::Pod;
use std::mem;

/// Read-only tensor supplied by the host for the duration of one call.
///
/// The node never takes ownership of input buffers; validation happens on the
/// view before any output is allocated.
#[derive(Debug, Clone, Copy)]
pub struct TensorView<'a> {
    pub name: &'a str,
    pub precision: Precision,
    pub dims: &'a [u64],
    pub data: &'a [u8],
}

impl<'a> TensorView<'a> {
    pub fn new(name: &'a str, precision: Precision, dims: &'a [u64], data: &'a [u8]) -> Self {
        Self {
            name,
            precision,
            dims,
            data,
        }
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Size of dimension `axis` as `usize`.
    pub fn dim(&self, axis: usize) -> Result<usize> {
        let raw = self.dims.get(axis).copied().ok_or_else(|| {
            NodeError::Validation(format!("{} has no dimension {}", self.name, axis))
        })?;
        usize::try_from(raw).map_err(|_| {
            NodeError::Validation(format!(
                "{} dimension {} ({}) does not fit in memory",
                self.name, axis, raw
            ))
        })
    }

    /// Total number of elements, or `None` on overflow.
    pub fn num_elements(&self) -> Option<usize> {
        self.dims.iter().try_fold(1usize, |acc, &d| {
            usize::try_from(d).ok().and_then(|d| acc.checked_mul(d))
        })
    }

    pub fn expect_precision(&self, precision: Precision) -> Result<()> {
        if self.precision != precision {
            return Err(NodeError::Validation(format!(
                "{} input is not {} (got {})",
                self.name, precision, self.precision
            )));
        }
        Ok(())
    }

    pub fn expect_rank(&self, rank: usize) -> Result<()> {
        if self.rank() != rank {
            return Err(NodeError::Validation(format!(
                "{} shape must have {} dimensions (got {})",
                self.name,
                rank,
                self.rank()
            )));
        }
        Ok(())
    }

    pub fn expect_positive_dims(&self) -> Result<()> {
        for (axis, &d) in self.dims.iter().enumerate() {
            if d == 0 {
                return Err(NodeError::Validation(format!(
                    "{} dimension {} must be larger than 0",
                    self.name,
                    axis + 1
                )));
            }
        }
        Ok(())
    }

    /// Check that the payload holds exactly `product(dims) * element_size` bytes.
    pub fn expect_byte_len(&self) -> Result<()> {
        let expected = self
            .num_elements()
            .and_then(|n| n.checked_mul(self.precision.element_size()))
            .ok_or_else(|| {
                NodeError::Validation(format!("{} shape {:?} overflows", self.name, self.dims))
            })?;

        if self.data.len() != expected {
            return Err(NodeError::Validation(format!(
                "{} holds {} bytes, shape {:?} of {} requires {}",
                self.name,
                self.data.len(),
                self.dims,
                self.precision,
                expected
            )));
        }
        Ok(())
    }

    /// Run every structural check in the order the host reports them.
    pub fn validate(&self, precision: Precision, rank: usize) -> Result<()> {
        self.expect_precision(precision)?;
        self.expect_rank(rank)?;
        self.expect_positive_dims()?;
        self.expect_byte_len()
    }

    /// Copy `len` elements starting at element `start` out of the payload.
    ///
    /// Host buffers carry no alignment guarantee, so elements are read one by
    /// one. The destination is reserved fallibly.
    fn read_elements<T: Pod>(&self, start: usize, len: usize) -> Result<Vec<T>> {
        let size = mem::size_of::<T>();
        let bytes = start
            .checked_add(len)
            .and_then(|end| Some(start.checked_mul(size)?..end.checked_mul(size)?))
            .and_then(|range| self.data.get(range))
            .ok_or_else(|| {
                NodeError::Validation(format!(
                    "{} has no elements {}..{}",
                    self.name,
                    start,
                    start.saturating_add(len)
                ))
            })?;

        let mut values = Vec::new();
        values.try_reserve_exact(len)?;
        values.extend(bytes.chunks_exact(size).map(bytemuck::pod_read_unaligned::<T>));
        Ok(values)
    }

    /// Read `len` native-endian `f32` values starting at element `start`.
    pub fn read_f32_range(&self, start: usize, len: usize) -> Result<Vec<f32>> {
        self.expect_precision(Precision::Fp32)?;
        self.read_elements(start, len)
    }

    /// Read `len` native-endian `i64` values starting at element `start`.
    pub fn read_i64_range(&self, start: usize, len: usize) -> Result<Vec<i64>> {
        self.expect_precision(Precision::I64)?;
        self.read_elements(start, len)
    }

    /// Copy the whole payload out as native-endian `f32`.
    pub fn to_f32_vec(&self) -> Result<Vec<f32>> {
        self.read_f32_range(0, self.data.len() / mem::size_of::<f32>())
    }

    /// Copy the whole payload out as native-endian `i64`.
    pub fn to_i64_vec(&self) -> Result<Vec<i64>> {
        self.read_i64_range(0, self.data.len() / mem::size_of::<i64>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f32_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_ne_bytes()).collect()
    }

    #[test]
    fn test_validate_ok() {
        let data = f32_bytes(&[1.0, 2.0, 3.0, 1.5]);
        let view = TensorView::new("logits", Precision::Fp32, &[1, 1, 4], &data);
        assert!(view.validate(Precision::Fp32, 3).is_ok());
        assert_eq!(view.to_f32_vec().unwrap(), vec![1.0, 2.0, 3.0, 1.5]);
    }

    #[test]
    fn test_validate_wrong_precision() {
        let data = [0u8; 16];
        let view = TensorView::new("logits", Precision::I32, &[1, 1, 4], &data);
        let err = view.validate(Precision::Fp32, 3).unwrap_err();
        assert!(matches!(err, NodeError::Validation(_)));
        assert!(err.to_string().contains("not FP32"));
    }

    #[test]
    fn test_validate_zero_dim() {
        let data: [u8; 0] = [];
        let view = TensorView::new("texts", Precision::U8, &[0, 8], &data);
        let err = view.validate(Precision::U8, 2).unwrap_err();
        assert!(err.to_string().contains("dimension 1"));
    }

    #[test]
    fn test_validate_byte_len_mismatch() {
        let data = [0u8; 7];
        let view = TensorView::new("input_ids", Precision::I64, &[1, 1], &data);
        assert!(view.validate(Precision::I64, 2).is_err());
    }

    #[test]
    fn test_unaligned_read() {
        let mut raw = vec![0u8];
        raw.extend_from_slice(&7i64.to_ne_bytes());
        raw.extend_from_slice(&(-3i64).to_ne_bytes());
        let view = TensorView::new("input_ids", Precision::I64, &[1, 2], &raw[1..]);
        assert_eq!(view.to_i64_vec().unwrap(), vec![7, -3]);
    }

    #[test]
    fn test_read_range_unaligned() {
        let mut raw = vec![0u8];
        for v in [0.5f32, 1.5, 2.5, 3.5] {
            raw.extend_from_slice(&v.to_ne_bytes());
        }
        let view = TensorView::new("logits", Precision::Fp32, &[1, 2, 2], &raw[1..]);
        assert_eq!(view.read_f32_range(2, 2).unwrap(), vec![2.5, 3.5]);
        assert_eq!(view.read_f32_range(0, 0).unwrap(), Vec::<f32>::new());
    }

    #[test]
    fn test_read_range_out_of_bounds() {
        let data = [0u8; 16];
        let view = TensorView::new("logits", Precision::Fp32, &[1, 1, 4], &data);
        assert!(matches!(
            view.read_f32_range(3, 2),
            Err(NodeError::Validation(_))
        ));
        assert!(view.read_f32_range(usize::MAX, 2).is_err());
        assert!(view.read_i64_range(0, 1).is_err());
    }

    #[test]
    fn test_dim_out_of_range() {
        let data = [0u8; 4];
        let view = TensorView::new("texts", Precision::U8, &[2, 2], &data);
        assert_eq!(view.dim(1).unwrap(), 2);
        assert!(view.dim(2).is_err());
    }
}
