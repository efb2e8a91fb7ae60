//! Status-code boundary towards the host.
//!
//! The host only sees integers: 0 for success, [`NodeError::status_code`]
//! otherwise. Every error is logged here, once, before it is flattened.

use crate::node::CustomNode;
use bpenode_core::{NodeError, NodeOutputs, NodeParam, NodeParams, Result, TensorInfo, TensorView};
use tracing::error;

/// Status returned for a successful call.
pub const STATUS_OK: i32 = 0;

/// Flatten a node result into the host's status convention.
pub fn into_status<T>(node: &str, operation: &str, result: Result<T>) -> std::result::Result<T, i32> {
    result.map_err(|err: NodeError| {
        let code = err.status_code();
        error!(node, operation, code, "{}", err);
        code
    })
}

/// Owned node instance as seen by the host.
///
/// Replaces an opaque instance pointer: `initialize` returns the handle,
/// every other entry point borrows or consumes it.
#[derive(Debug)]
pub struct NodeHandle<N: CustomNode> {
    node: N,
}

impl<N: CustomNode> NodeHandle<N> {
    pub fn initialize(params: &[NodeParam<'_>]) -> std::result::Result<Self, i32> {
        let node = into_status(N::NAME, "initialize", N::initialize(&NodeParams::new(params)))?;
        Ok(Self { node })
    }

    pub fn execute(
        &self,
        inputs: &[TensorView<'_>],
        params: &[NodeParam<'_>],
    ) -> std::result::Result<NodeOutputs, i32> {
        into_status(
            N::NAME,
            "execute",
            self.node.execute(inputs, &NodeParams::new(params)),
        )
    }

    pub fn inputs_info(&self, params: &[NodeParam<'_>]) -> Vec<TensorInfo> {
        self.node.inputs_info(&NodeParams::new(params))
    }

    pub fn outputs_info(&self, params: &[NodeParam<'_>]) -> Vec<TensorInfo> {
        self.node.outputs_info(&NodeParams::new(params))
    }

    pub fn release(&self, outputs: NodeOutputs) -> i32 {
        self.node.release(outputs);
        STATUS_OK
    }

    pub fn deinitialize(self) -> i32 {
        self.node.deinitialize();
        STATUS_OK
    }

    /// Borrow the node itself.
    pub fn node(&self) -> &N {
        &self.node
    }
}
