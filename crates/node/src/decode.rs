//! Greedy decode step over a batch of logits.
//!
//! For every batch row: find where the valid context ends, take the argmax of
//! the logits at that position, append it to the row's token history and turn
//! the history back into text. Nothing survives between calls.

use bpenode_core::{NodeError, Precision, Result, TensorView};
use bpenode_tokenizer::Detokenizer;
use tracing::trace;

/// Where a row's valid context ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextEnd {
    /// Sequence position whose logits pick the next token
    pub position: usize,
    /// Number of leading ids that form the history
    pub history_len: usize,
}

/// Scan an attention mask row; the first zero ends the valid context.
///
/// Without a zero the whole row is valid. A row starting with zero has no
/// history and reads logits at position 0.
pub fn locate_context_end(mask: &[i64]) -> ContextEnd {
    match mask.iter().position(|&m| m == 0) {
        None => ContextEnd {
            position: mask.len().saturating_sub(1),
            history_len: mask.len(),
        },
        Some(0) => ContextEnd {
            position: 0,
            history_len: 0,
        },
        Some(first_zero) => ContextEnd {
            position: first_zero - 1,
            history_len: first_zero,
        },
    }
}

/// Index of the largest value; ties go to the lowest index.
pub fn argmax(values: &[f32]) -> usize {
    let mut max_idx = 0;
    let mut max_val = f32::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if v > max_val {
            max_val = v;
            max_idx = i;
        }
    }
    max_idx
}

#[derive(Debug, Clone, Copy)]
struct Context<'a> {
    ids: TensorView<'a>,
    mask: TensorView<'a>,
}

/// Validated decode inputs, borrowing the host buffers.
///
/// Only the rows a decode step touches are read: one mask and id row per
/// batch element and one `vocab`-wide logits row at its context end.
#[derive(Debug)]
pub struct DecodeBatch<'a> {
    batch: usize,
    seq: usize,
    vocab: usize,
    logits: TensorView<'a>,
    context: Option<Context<'a>>,
}

impl<'a> DecodeBatch<'a> {
    /// Validate shapes.
    ///
    /// `input_ids` and `attention_mask` come together or not at all; both
    /// must be `[batch, seq]` matching the first two dims of `logits`.
    pub fn from_inputs(
        logits: Option<TensorView<'a>>,
        input_ids: Option<TensorView<'a>>,
        attention_mask: Option<TensorView<'a>>,
    ) -> Result<Self> {
        let logits =
            logits.ok_or_else(|| NodeError::Validation("Missing logits input".to_string()))?;
        logits.validate(Precision::Fp32, 3)?;
        let (batch, seq, vocab) = (logits.dim(0)?, logits.dim(1)?, logits.dim(2)?);

        let context = match (input_ids, attention_mask) {
            (None, None) => None,
            (Some(ids), Some(mask)) => {
                for view in [&ids, &mask] {
                    view.validate(Precision::I64, 2)?;
                    if view.dim(0)? != batch || view.dim(1)? != seq {
                        return Err(NodeError::Validation(format!(
                            "{} shape {:?} does not match logits [{}, {}]",
                            view.name, view.dims, batch, seq
                        )));
                    }
                }
                Some(Context { ids, mask })
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(NodeError::Validation(
                    "input_ids and attention_mask must be provided together".to_string(),
                ))
            }
        };

        Ok(Self {
            batch,
            seq,
            vocab,
            logits,
            context,
        })
    }

    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch
    }

    /// Context boundary of one row.
    pub fn context_end(&self, row: usize) -> Result<ContextEnd> {
        match &self.context {
            Some(ctx) => {
                let mask = ctx.mask.read_i64_range(row * self.seq, self.seq)?;
                Ok(locate_context_end(&mask))
            }
            None => Ok(ContextEnd {
                position: self.seq - 1,
                history_len: 0,
            }),
        }
    }

    /// History of `row` extended with its greedy next token.
    pub fn next_sequence(&self, row: usize) -> Result<Vec<i64>> {
        let end = self.context_end(row)?;
        let logits = self
            .logits
            .read_f32_range((row * self.seq + end.position) * self.vocab, self.vocab)?;
        let next = argmax(&logits) as i64;
        trace!(row, position = end.position, next, "argmax");

        let mut sequence = match &self.context {
            Some(ctx) => ctx.ids.read_i64_range(row * self.seq, end.history_len)?,
            None => Vec::new(),
        };
        sequence.try_reserve_exact(1)?;
        sequence.push(next);
        Ok(sequence)
    }

    /// Run one decode step for every row.
    pub fn decode(
        &self,
        model: &Detokenizer,
        max_bytes: usize,
        skip_special: bool,
    ) -> Result<Vec<String>> {
        (0..self.batch)
            .map(|row| model.detokenize(&self.next_sequence(row)?, max_bytes, skip_special))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_first_max_wins() {
        assert_eq!(argmax(&[9.4, 0.2, -0.82, -0.74]), 0);
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), 1);
        assert_eq!(argmax(&[1.0, 2.0, 3.0, 1.5]), 2);
        assert_eq!(argmax(&[f32::NEG_INFINITY, f32::NEG_INFINITY]), 0);
    }

    #[test]
    fn test_context_end() {
        assert_eq!(
            locate_context_end(&[1, 1, 1, 0]),
            ContextEnd {
                position: 2,
                history_len: 3
            }
        );
        assert_eq!(
            locate_context_end(&[1, 1, 1, 1]),
            ContextEnd {
                position: 3,
                history_len: 4
            }
        );
        assert_eq!(
            locate_context_end(&[0, 1, 1]),
            ContextEnd {
                position: 0,
                history_len: 0
            }
        );
        // Only the first zero counts
        assert_eq!(locate_context_end(&[1, 0, 1, 0]).position, 0);
    }

    fn bytes<T: bytemuck::Pod>(values: &[T]) -> Vec<u8> {
        bytemuck::cast_slice(values).to_vec()
    }

    #[test]
    fn test_next_sequence_uses_mask_position() {
        let logits = bytes(&[
            0.0f32, 0.0, 9.0, 0.0, // position 0
            0.0, 0.0, 0.0, 9.0, // position 1
            9.0, 0.0, 0.0, 0.0, // position 2
            0.0, 9.0, 0.0, 0.0, // position 3 (padding)
        ]);
        let ids = bytes(&[10i64, 11, 12, 0]);
        let mask = bytes(&[1i64, 1, 1, 0]);
        let (ldims, cdims) = ([1u64, 4, 4], [1u64, 4]);

        let batch = DecodeBatch::from_inputs(
            Some(TensorView::new("logits", Precision::Fp32, &ldims, &logits)),
            Some(TensorView::new("input_ids", Precision::I64, &cdims, &ids)),
            Some(TensorView::new("attention_mask", Precision::I64, &cdims, &mask)),
        )
        .unwrap();

        assert_eq!(batch.next_sequence(0).unwrap(), vec![10, 11, 12, 0]);
    }

    #[test]
    fn test_logits_only_reads_last_position() {
        let logits = bytes(&[5.0f32, 0.0, 0.0, 1.0, 0.0, 7.0]);
        let dims = [1u64, 2, 3];
        let batch = DecodeBatch::from_inputs(
            Some(TensorView::new("logits", Precision::Fp32, &dims, &logits)),
            None,
            None,
        )
        .unwrap();

        assert_eq!(batch.batch_size(), 1);
        assert_eq!(batch.next_sequence(0).unwrap(), vec![2]);
    }

    #[test]
    fn test_rows_read_from_unaligned_buffers() {
        // Two rows, three positions, two classes, shifted off alignment
        let mut logits = vec![0u8];
        logits.extend(bytes(&[
            1.0f32, 0.0, 0.0, 1.0, 0.0, 1.0, // row 0
            0.0, 1.0, 1.0, 0.0, 1.0, 0.0, // row 1
        ]));
        let mut ids = vec![0u8];
        ids.extend(bytes(&[4i64, 5, 6, 7, 8, 9]));
        let mut mask = vec![0u8];
        mask.extend(bytes(&[1i64, 1, 1, 1, 0, 0]));
        let (ldims, cdims) = ([2u64, 3, 2], [2u64, 3]);

        let batch = DecodeBatch::from_inputs(
            Some(TensorView::new("logits", Precision::Fp32, &ldims, &logits[1..])),
            Some(TensorView::new("input_ids", Precision::I64, &cdims, &ids[1..])),
            Some(TensorView::new("attention_mask", Precision::I64, &cdims, &mask[1..])),
        )
        .unwrap();

        assert_eq!(
            batch.context_end(1).unwrap(),
            ContextEnd {
                position: 0,
                history_len: 1
            }
        );
        assert_eq!(batch.next_sequence(0).unwrap(), vec![4, 5, 6, 1]);
        assert_eq!(batch.next_sequence(1).unwrap(), vec![7, 1]);
    }

    #[test]
    fn test_validation_errors() {
        let logits = bytes(&[0.0f32; 8]);
        let ids = bytes(&[1i64; 2]);
        let ldims = [2u64, 1, 4];

        let logits_view = TensorView::new("logits", Precision::Fp32, &ldims, &logits);

        // Missing logits
        assert!(DecodeBatch::from_inputs(None, None, None).is_err());

        // Wrong precision
        let fp16 = TensorView::new("logits", Precision::Fp16, &ldims, &logits);
        assert!(DecodeBatch::from_inputs(Some(fp16), None, None).is_err());

        // Wrong rank
        let flat_dims = [8u64];
        let flat = TensorView::new("logits", Precision::Fp32, &flat_dims, &logits);
        assert!(DecodeBatch::from_inputs(Some(flat), None, None).is_err());

        // Zero dimension
        let zero_dims = [0u64, 1, 4];
        let zero = TensorView::new("logits", Precision::Fp32, &zero_dims, &[]);
        assert!(DecodeBatch::from_inputs(Some(zero), None, None).is_err());

        // Ids without mask
        let cdims = [2u64, 1];
        let ids_view = TensorView::new("input_ids", Precision::I64, &cdims, &ids);
        assert!(DecodeBatch::from_inputs(Some(logits_view), Some(ids_view), None).is_err());

        // Batch mismatch
        let small_dims = [1u64, 2];
        let small = TensorView::new("input_ids", Precision::I64, &small_dims, &ids);
        let mask = TensorView::new("attention_mask", Precision::I64, &small_dims, &ids);
        let err = DecodeBatch::from_inputs(Some(logits_view), Some(small), Some(mask)).unwrap_err();
        assert!(matches!(err, NodeError::Validation(_)));
    }
}
