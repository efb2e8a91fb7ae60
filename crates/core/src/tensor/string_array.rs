//! Fixed-stride arrays of NUL-terminated strings.
//!
//! A `[rows, stride]` buffer holds one string per row. Each row ends at its
//! first NUL byte; a row without NUL uses the full stride.

use super::{Precision, TensorView};
use crate::error::{NodeError, Result};

/// Split a 2-D byte tensor into its NUL-terminated rows.
///
/// Accepts both `U8` and `CStringArray` precisions.
pub fn read_string_rows<'a>(view: &TensorView<'a>) -> Result<Vec<&'a [u8]>> {
    if !matches!(view.precision, Precision::U8 | Precision::CStringArray) {
        return Err(NodeError::Validation(format!(
            "{} input is not U8 (got {})",
            view.name, view.precision
        )));
    }
    view.expect_rank(2)?;
    view.expect_positive_dims()?;
    view.expect_byte_len()?;

    let stride = view.dim(1)?;
    let data: &'a [u8] = view.data;
    Ok(data
        .chunks_exact(stride)
        .map(|row| {
            let end = row.iter().position(|&b| b == 0).unwrap_or(row.len());
            &row[..end]
        })
        .collect())
}

/// Pack rows into a `[rows, max_len + 1]` buffer padded with NUL.
///
/// Returns the dims and the payload. Every row is NUL-terminated at its own
/// length.
pub fn pack_string_rows<S: AsRef<[u8]>>(rows: &[S]) -> Result<([u64; 2], Vec<u8>)> {
    let max_len = rows.iter().map(|r| r.as_ref().len()).max().unwrap_or(0);
    let stride = max_len + 1;
    let total = rows.len().checked_mul(stride).ok_or_else(|| {
        NodeError::Allocation(format!("{} rows of {} bytes overflow", rows.len(), stride))
    })?;

    let mut data = Vec::new();
    data.try_reserve_exact(total)?;
    for row in rows {
        let row = row.as_ref();
        data.extend_from_slice(row);
        data.resize(data.len() + stride - row.len(), 0);
    }

    Ok(([rows.len() as u64, stride as u64], data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_rows() {
        let data = b"abc\0\0hi\0\0\0full!";
        let view = TensorView::new("texts", Precision::U8, &[3, 5], data);
        let rows = read_string_rows(&view).unwrap();
        assert_eq!(rows, vec![&b"abc"[..], &b"hi"[..], &b"full!"[..]]);
    }

    #[test]
    fn test_read_rows_rejects_wrong_precision() {
        let data = [0u8; 8];
        let view = TensorView::new("texts", Precision::I64, &[1, 1], &data);
        assert!(read_string_rows(&view).is_err());
    }

    #[test]
    fn test_pack_rows() {
        let (dims, data) = pack_string_rows(&["Hello world\"", "Hello!"]).unwrap();
        assert_eq!(dims, [2, 13]);
        assert_eq!(data.len(), 26);
        assert_eq!(&data[..13], b"Hello world\"\0");
        assert_eq!(&data[13..19], b"Hello!");
        assert!(data[19..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_pack_empty_strings() {
        let (dims, data) = pack_string_rows(&["", ""]).unwrap();
        assert_eq!(dims, [2, 1]);
        assert_eq!(data, vec![0, 0]);
    }
}
