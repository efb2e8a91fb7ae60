//! Lifecycle contract shared by every node.
//!
//! A node instance is created by `initialize`, serves any number of
//! `execute` calls through `&self`, and is torn down by `deinitialize`.
//! Outputs handed out by `execute` come back exactly once through `release`.

use bpenode_core::{NodeError, NodeOutputs, NodeParams, Result, TensorInfo, TensorView};

pub trait CustomNode: Sized {
    /// Short name used in log lines.
    const NAME: &'static str;

    /// Load the node state. Failures leave no instance behind.
    fn initialize(params: &NodeParams<'_>) -> Result<Self>;

    /// Process one request.
    ///
    /// Inputs are validated before any output is allocated.
    fn execute(&self, inputs: &[TensorView<'_>], params: &NodeParams<'_>) -> Result<NodeOutputs>;

    /// Expected inputs, independent of any request.
    fn inputs_info(&self, params: &NodeParams<'_>) -> Vec<TensorInfo>;

    /// Produced outputs, independent of any request.
    fn outputs_info(&self, params: &NodeParams<'_>) -> Vec<TensorInfo>;

    /// Take back an output set returned by `execute`.
    fn release(&self, outputs: NodeOutputs) {
        drop(outputs);
    }

    fn deinitialize(self) {}
}

/// Pick the inputs named in `names` out of `inputs`, in that order.
///
/// An input whose name is not listed, or that appears twice, fails the call.
pub(crate) fn collect_inputs<'a, const N: usize>(
    inputs: &[TensorView<'a>],
    names: [&str; N],
) -> Result<[Option<TensorView<'a>>; N]> {
    let mut found: [Option<TensorView<'a>>; N] = [None; N];

    for input in inputs {
        let slot = names
            .iter()
            .position(|&name| name == input.name)
            .ok_or_else(|| NodeError::Validation(format!("Unrecognized input: {}", input.name)))?;

        if found[slot].replace(*input).is_some() {
            return Err(NodeError::Validation(format!(
                "Duplicate input: {}",
                input.name
            )));
        }
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpenode_core::Precision;

    #[test]
    fn test_collect_inputs_by_name() {
        let data = [0u8; 8];
        let dims = [1u64, 1];
        let inputs = [
            TensorView::new("attention_mask", Precision::I64, &dims, &data),
            TensorView::new("logits", Precision::Fp32, &dims, &data[..4]),
        ];

        let [logits, ids, mask] =
            collect_inputs(&inputs, ["logits", "input_ids", "attention_mask"]).unwrap();
        assert_eq!(logits.map(|v| v.precision), Some(Precision::Fp32));
        assert!(ids.is_none());
        assert_eq!(mask.map(|v| v.name), Some("attention_mask"));
    }

    #[test]
    fn test_collect_inputs_rejects_unknown_and_duplicates() {
        let data = [0u8; 1];
        let dims = [1u64, 1];
        let unknown = [TensorView::new("text", Precision::U8, &dims, &data)];
        assert!(matches!(
            collect_inputs(&unknown, ["texts"]),
            Err(NodeError::Validation(_))
        ));

        let twice = [
            TensorView::new("texts", Precision::U8, &dims, &data),
            TensorView::new("texts", Precision::U8, &dims, &data),
        ];
        assert!(collect_inputs(&twice, ["texts"]).is_err());
    }
}
