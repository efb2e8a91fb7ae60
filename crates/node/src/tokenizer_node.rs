//! Text -> token ids node.
//!
//! Input `texts` is a `[batch, width]` U8 tensor of NUL-terminated rows.
//! Outputs `tokens` and `attention` are `[batch, longest]` I64 tensors,
//! right-padded with 0; attention is 1 on real tokens.

use crate::node::{collect_inputs, CustomNode};
use bpenode_core::tensor::read_string_rows;
use bpenode_core::{
    NodeError, NodeOutputs, NodeParams, Precision, Result, Tensor, TensorInfo, TensorView,
};
use bpenode_tokenizer::{Tokenizer, TokenizerConfig};
use std::path::Path;
use std::time::Instant;
use tracing::debug;

pub const TEXTS: &str = "texts";
pub const TOKENS: &str = "tokens";
pub const ATTENTION: &str = "attention";

/// BPE tokenizer node.
#[derive(Debug)]
pub struct TokenizerNode {
    tokenizer: Tokenizer,
}

impl TokenizerNode {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    fn encode_rows(&self, rows: &[&[u8]], max_ids: usize) -> Result<Vec<Vec<u32>>> {
        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                let text = std::str::from_utf8(row).map_err(|err| {
                    NodeError::Validation(format!("texts row {} is not valid UTF-8: {}", i, err))
                })?;
                let mut ids = self.tokenizer.encode(text)?.ids;
                ids.truncate(max_ids);
                Ok(ids)
            })
            .collect()
    }
}

impl CustomNode for TokenizerNode {
    const NAME: &'static str = "tokenizer";

    fn initialize(params: &NodeParams<'_>) -> Result<Self> {
        let model_path = params.get_required_string("model_path")?;
        let config = TokenizerConfig::from_params(params)?;
        let tokenizer = Tokenizer::load(Path::new(model_path), config)?;
        Ok(Self::new(tokenizer))
    }

    fn execute(&self, inputs: &[TensorView<'_>], params: &NodeParams<'_>) -> Result<NodeOutputs> {
        let start = Instant::now();
        let max_ids = params.get_positive_parameter("max_ids_arr_length")?;

        let [texts] = collect_inputs(inputs, [TEXTS])?;
        let texts = texts.ok_or_else(|| NodeError::Validation("Missing texts input".to_string()))?;
        texts.expect_precision(Precision::U8)?;
        let rows = read_string_rows(&texts)?;

        let ids = self.encode_rows(&rows, max_ids)?;
        let width = ids.iter().map(Vec::len).max().unwrap_or(0);
        let total = ids.len().checked_mul(width).ok_or_else(|| {
            NodeError::Allocation(format!("{} rows of {} tokens overflow", ids.len(), width))
        })?;

        let mut tokens: Vec<i64> = Vec::new();
        tokens.try_reserve_exact(total)?;
        let mut attention: Vec<i64> = Vec::new();
        attention.try_reserve_exact(total)?;

        for row in &ids {
            tokens.extend(row.iter().map(|&id| i64::from(id)));
            tokens.resize(tokens.len() + width - row.len(), 0);
            attention.resize(attention.len() + row.len(), 1);
            attention.resize(attention.len() + width - row.len(), 0);
        }

        let dims = vec![ids.len() as u64, width as u64];
        let outputs = NodeOutputs::new(vec![
            Tensor::from_i64(TOKENS, dims.clone(), &tokens)?,
            Tensor::from_i64(ATTENTION, dims, &attention)?,
        ]);

        debug!(
            batch = ids.len(),
            width,
            output_bytes = outputs.total_bytes(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "tokenized"
        );
        Ok(outputs)
    }

    fn inputs_info(&self, _params: &NodeParams<'_>) -> Vec<TensorInfo> {
        vec![TensorInfo::dynamic(TEXTS, Precision::U8, 2)]
    }

    fn outputs_info(&self, _params: &NodeParams<'_>) -> Vec<TensorInfo> {
        vec![
            TensorInfo::dynamic(TOKENS, Precision::I64, 2),
            TensorInfo::dynamic(ATTENTION, Precision::I64, 2),
        ]
    }
}
