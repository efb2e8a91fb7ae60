//! Info command implementation.

use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, ValueEnum)]
pub enum NodeKind {
    Tokenizer,
    Detokenizer,
}

/// Info command arguments.
#[derive(Parser)]
pub struct InfoCommand {
    /// Which node to describe
    #[arg(short, long, value_enum)]
    pub node: NodeKind,

    /// Model path passed to the node's initialize
    #[arg(short, long)]
    pub model: String,
}

use super::status;
use anyhow::Result as AnyhowResult;
use bpenode_core::{NodeParam, TensorInfo};
use bpenode_node::{CustomNode, DetokenizerNode, NodeHandle, TokenizerNode};
use tracing::debug;

fn schema<N: CustomNode>(params: &[NodeParam<'_>]) -> AnyhowResult<(Vec<TensorInfo>, Vec<TensorInfo>)> {
    let node = status("initialize", NodeHandle::<N>::initialize(params))?;
    debug!(node = N::NAME, "reading schema");
    let schema = (node.inputs_info(params), node.outputs_info(params));
    node.deinitialize();
    Ok(schema)
}

pub fn run(cmd: InfoCommand) -> AnyhowResult<()> {
    let params = [NodeParam::new("model_path", &cmd.model)];
    let (inputs, outputs) = match cmd.node {
        NodeKind::Tokenizer => schema::<TokenizerNode>(&params)?,
        NodeKind::Detokenizer => schema::<DetokenizerNode>(&params)?,
    };

    let report = serde_json::json!({
        "inputs": inputs,
        "outputs": outputs,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
