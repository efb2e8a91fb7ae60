//! Logits -> text node.
//!
//! Inputs: `logits` FP32 `[batch, seq, vocab]`, and optionally `input_ids`
//! with `attention_mask`, both I64 `[batch, seq]`. Output `texts` is a
//! `[batch, longest + 1]` string array.

use crate::decode::DecodeBatch;
use crate::node::{collect_inputs, CustomNode};
use bpenode_core::{NodeOutputs, NodeParams, Precision, Result, Tensor, TensorInfo, TensorView};
use bpenode_tokenizer::Detokenizer;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

pub const LOGITS: &str = "logits";
pub const INPUT_IDS: &str = "input_ids";
pub const ATTENTION_MASK: &str = "attention_mask";
pub const TEXTS: &str = "texts";

/// Per-call settings of the detokenizer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetokenizeConfig {
    /// Upper bound on the byte length of each output string
    pub max_buffer_length: usize,
    pub skip_special_tokens: bool,
}

impl DetokenizeConfig {
    pub fn from_params(params: &NodeParams<'_>) -> Result<Self> {
        Ok(Self {
            max_buffer_length: params.get_positive_parameter("max_buffer_length")?,
            skip_special_tokens: params.get_bool_parameter("skip_special_tokens", false)?,
        })
    }
}

/// Greedy decode + detokenize node.
#[derive(Debug)]
pub struct DetokenizerNode {
    model: Detokenizer,
}

impl DetokenizerNode {
    pub fn new(model: Detokenizer) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &Detokenizer {
        &self.model
    }
}

impl CustomNode for DetokenizerNode {
    const NAME: &'static str = "detokenizer";

    fn initialize(params: &NodeParams<'_>) -> Result<Self> {
        let model_path = params.get_required_string("model_path")?;
        Ok(Self::new(Detokenizer::load(Path::new(model_path))?))
    }

    fn execute(&self, inputs: &[TensorView<'_>], params: &NodeParams<'_>) -> Result<NodeOutputs> {
        let start = Instant::now();
        let config = DetokenizeConfig::from_params(params)?;

        let [logits, input_ids, attention_mask] =
            collect_inputs(inputs, [LOGITS, INPUT_IDS, ATTENTION_MASK])?;
        let batch = DecodeBatch::from_inputs(logits, input_ids, attention_mask)?;

        let texts = batch.decode(
            &self.model,
            config.max_buffer_length,
            config.skip_special_tokens,
        )?;
        let outputs = NodeOutputs::new(vec![Tensor::string_array(TEXTS, &texts)?]);

        debug!(
            model_id = self.model.id(),
            batch = batch.batch_size(),
            output_bytes = outputs.total_bytes(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "detokenized"
        );
        Ok(outputs)
    }

    fn inputs_info(&self, _params: &NodeParams<'_>) -> Vec<TensorInfo> {
        vec![
            TensorInfo::dynamic(LOGITS, Precision::Fp32, 3),
            TensorInfo::dynamic(INPUT_IDS, Precision::I64, 2),
            TensorInfo::dynamic(ATTENTION_MASK, Precision::I64, 2),
        ]
    }

    fn outputs_info(&self, _params: &NodeParams<'_>) -> Vec<TensorInfo> {
        vec![TensorInfo::dynamic(TEXTS, Precision::CStringArray, 2)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::NodeHandle;
    use bpenode_core::tensor::read_string_rows;
    use bpenode_core::NodeParam;

    const GPT2_VOCAB: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../testdata/gpt2/vocab.json");

    fn node() -> NodeHandle<DetokenizerNode> {
        NodeHandle::initialize(&[NodeParam::new("model_path", GPT2_VOCAB)]).unwrap()
    }

    fn bytes<T: bytemuck::Pod>(values: &[T]) -> Vec<u8> {
        bytemuck::cast_slice(values).to_vec()
    }

    fn texts(outputs: &NodeOutputs) -> Vec<String> {
        let tensor = outputs.get(TEXTS).unwrap();
        assert_eq!(tensor.precision(), Precision::CStringArray);
        read_string_rows(&tensor.view())
            .unwrap()
            .into_iter()
            .map(|row| String::from_utf8(row.to_vec()).unwrap())
            .collect()
    }

    struct Request {
        logits: Vec<u8>,
        logits_dims: [u64; 3],
        ids: Vec<u8>,
        mask: Vec<u8>,
        context_dims: [u64; 2],
    }

    impl Request {
        fn new(logits: &[f32], logits_dims: [u64; 3], ids: &[i64], mask: &[i64]) -> Self {
            Self {
                logits: bytes(logits),
                logits_dims,
                ids: bytes(ids),
                mask: bytes(mask),
                context_dims: [logits_dims[0], logits_dims[1]],
            }
        }

        fn inputs(&self) -> Vec<TensorView<'_>> {
            vec![
                TensorView::new(LOGITS, Precision::Fp32, &self.logits_dims, &self.logits),
                TensorView::new(INPUT_IDS, Precision::I64, &self.context_dims, &self.ids),
                TensorView::new(ATTENTION_MASK, Precision::I64, &self.context_dims, &self.mask),
            ]
        }
    }

    fn params() -> [NodeParam<'static>; 1] {
        [NodeParam::new("max_buffer_length", "1024")]
    }

    #[test]
    fn test_single_step() {
        let node = node();
        let request = Request::new(&[1.0, 2.0, 3.0, 1.5], [1, 1, 4], &[18435], &[1]);

        let outputs = node.execute(&request.inputs(), &params()).unwrap();
        assert_eq!(texts(&outputs), vec!["Hello#"]);
        assert_eq!(outputs.get(TEXTS).unwrap().dims(), &[1, 7]);
        assert_eq!(node.release(outputs), 0);
    }

    #[test]
    fn test_logits_only() {
        let node = node();
        let logits = bytes(&[1.0f32, 2.0, 3.0, 1.5]);
        let dims = [1u64, 1, 4];
        let inputs = [TensorView::new(LOGITS, Precision::Fp32, &dims, &logits)];

        let outputs = node.execute(&inputs, &params()).unwrap();
        assert_eq!(texts(&outputs), vec!["#"]);
    }

    #[test]
    fn test_batch_of_two() {
        let node = node();
        #[rustfmt::skip]
        let logits = [
            9.0, 0.0, 0.0, 0.0,   0.0, 5.0, 1.0, 1.0,
            9.0, 0.0, 0.0, 0.0,   0.0, 1.0, 5.0, 1.0,
        ];
        let request = Request::new(&logits, [2, 2, 4], &[18435, 995, 18435, 995], &[1, 1, 1, 1]);

        let outputs = node.execute(&request.inputs(), &params()).unwrap();
        assert_eq!(texts(&outputs), vec!["Hello world\"", "Hello world#"]);

        // Stride is the longest string plus its terminator
        let tensor = outputs.get(TEXTS).unwrap();
        assert_eq!(tensor.dims(), &[2, 13]);
        assert_eq!(tensor.data()[12], 0);
        assert_eq!(tensor.data()[25], 0);
    }

    #[test]
    fn test_mask_selects_position() {
        let node = node();
        #[rustfmt::skip]
        let logits = [
            9.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 9.0,
        ];
        let request = Request::new(&logits, [1, 2, 4], &[18435, 995], &[1, 0]);

        let outputs = node.execute(&request.inputs(), &params()).unwrap();
        assert_eq!(texts(&outputs), vec!["Hello!"]);
    }

    #[test]
    fn test_multibyte_history() {
        let node = node();
        let mut logits = vec![0.0f32; 31677];
        logits[31676] = 1.0;
        let ids = [23294, 241, 22174, 28618, 2515];
        let request = Request::new(&logits, [1, 1, 31677], &ids[4..], &[1]);
        let outputs = node.execute(&request.inputs(), &params()).unwrap();
        assert_eq!(texts(&outputs), vec!["ちは"]);
    }

    #[test]
    fn test_max_buffer_length() {
        let node = node();
        let request = Request::new(&[1.0, 2.0, 3.0, 1.5], [1, 1, 4], &[18435], &[1]);
        let params = [NodeParam::new("max_buffer_length", "3")];

        let outputs = node.execute(&request.inputs(), &params).unwrap();
        assert_eq!(texts(&outputs), vec!["Hel"]);
    }

    #[test]
    fn test_invalid_requests() {
        let node = node();
        let request = Request::new(&[1.0, 2.0, 3.0, 1.5], [1, 1, 4], &[18435], &[1]);
        let inputs = request.inputs();

        // Missing or non-positive max_buffer_length
        assert_eq!(node.execute(&inputs, &[]).unwrap_err(), 1);
        let zero = [NodeParam::new("max_buffer_length", "0")];
        assert_eq!(node.execute(&inputs, &zero).unwrap_err(), 1);

        // Ids without mask, unknown input name
        assert_eq!(node.execute(&inputs[..2], &params()).unwrap_err(), 3);
        let renamed = [
            inputs[0],
            TensorView::new("tokens", Precision::I64, &request.context_dims, &request.ids),
        ];
        assert_eq!(node.execute(&renamed, &params()).unwrap_err(), 3);

        // Batch mismatch between logits and context
        let ids = bytes(&[18435i64, 995]);
        let wide = [2u64, 1];
        let mismatched = [
            inputs[0],
            TensorView::new(INPUT_IDS, Precision::I64, &wide, &ids),
            TensorView::new(ATTENTION_MASK, Precision::I64, &wide, &ids),
        ];
        assert_eq!(node.execute(&mismatched, &params()).unwrap_err(), 3);
    }

    #[test]
    fn test_unknown_argmax_id() {
        let node = node();
        let request = Request::new(&[0.0, 0.0, 0.0, 0.0, 1.0], [1, 1, 5], &[18435], &[1]);
        assert_eq!(node.execute(&request.inputs(), &params()).unwrap_err(), 4);
    }

    #[test]
    fn test_initialize_errors() {
        assert_eq!(NodeHandle::<DetokenizerNode>::initialize(&[]).unwrap_err(), 1);

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("vocab.json").to_string_lossy().into_owned();
        let params = [NodeParam::new("model_path", &missing)];
        assert_eq!(
            NodeHandle::<DetokenizerNode>::initialize(&params).unwrap_err(),
            2
        );
    }

    #[test]
    fn test_schema() {
        let node = node();
        let inputs = node.inputs_info(&[]);
        assert_eq!(inputs.len(), 3);
        assert_eq!(inputs[0], TensorInfo::dynamic(LOGITS, Precision::Fp32, 3));
        assert!(inputs[1..].iter().all(|i| i.precision == Precision::I64 && i.rank() == 2));

        let outputs = node.outputs_info(&[]);
        assert_eq!(outputs, vec![TensorInfo::dynamic(TEXTS, Precision::CStringArray, 2)]);

        assert_eq!(node.deinitialize(), 0);
    }

    #[test]
    fn test_config_from_params() {
        let raw = [
            NodeParam::new("max_buffer_length", "256"),
            NodeParam::new("skip_special_tokens", "yes"),
        ];
        let config = DetokenizeConfig::from_params(&NodeParams::new(&raw)).unwrap();
        assert_eq!(config.max_buffer_length, 256);
        assert!(config.skip_special_tokens);
    }
}
