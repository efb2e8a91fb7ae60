//! Encode command implementation.

use clap::Parser;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    /// Model directory (vocab.json + merges.txt) or vocab.json path
    #[arg(short, long)]
    pub model: String,

    /// Texts to encode, one batch row each ("-" reads lines from stdin)
    #[arg(short, long, required = true, num_args = 1..)]
    pub text: Vec<String>,

    /// Sentinel style: gpt, clip or auto
    #[arg(long, default_value = "auto")]
    pub style: String,

    /// Lowercase and collapse whitespace before encoding
    #[arg(long, default_value_t = false)]
    pub lowercase: bool,

    /// Maximum number of ids per row
    #[arg(long, default_value_t = 77)]
    pub max_ids: usize,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<String>,
}

use super::status;
use anyhow::Result as AnyhowResult;
use bpenode_core::tensor::pack_string_rows;
use bpenode_core::{NodeOutputs, NodeParam, Precision, TensorView};
use bpenode_node::{NodeHandle, TokenizerNode};
use std::io::BufRead;
use tracing::{debug, info};

fn read_rows(texts: Vec<String>) -> AnyhowResult<Vec<String>> {
    if texts.len() == 1 && texts[0] == "-" {
        let stdin = std::io::stdin();
        return Ok(stdin.lock().lines().collect::<std::io::Result<Vec<_>>>()?);
    }
    Ok(texts)
}

fn format_rows(outputs: &NodeOutputs, name: &str) -> AnyhowResult<Vec<String>> {
    let tensor = outputs
        .get(name)
        .ok_or_else(|| anyhow::anyhow!("missing {} output", name))?;
    let values = tensor.view().to_i64_vec()?;
    let width = tensor.dims().get(1).copied().unwrap_or(0) as usize;

    if width == 0 {
        return Ok(vec![String::new(); tensor.dims().first().copied().unwrap_or(0) as usize]);
    }
    Ok(values
        .chunks(width)
        .map(|row| {
            row.iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect())
}

pub fn run(cmd: EncodeCommand) -> AnyhowResult<()> {
    let max_ids = cmd.max_ids.to_string();
    let lowercase = cmd.lowercase.to_string();
    let init_params = [
        NodeParam::new("model_path", &cmd.model),
        NodeParam::new("style", &cmd.style),
        NodeParam::new("lowercase", &lowercase),
    ];
    let node = status("initialize", NodeHandle::<TokenizerNode>::initialize(&init_params))?;
    info!(model = %cmd.model, style = %node.node().tokenizer().style(), "tokenizer node ready");

    let rows = read_rows(cmd.text)?;
    let (dims, data) = pack_string_rows(&rows)?;
    debug!(?dims, "packed texts");
    let inputs = [TensorView::new("texts", Precision::U8, &dims, &data)];
    let outputs = status(
        "execute",
        node.execute(&inputs, &[NodeParam::new("max_ids_arr_length", &max_ids)]),
    )?;

    let tokens = format_rows(&outputs, "tokens")?;
    let attention = format_rows(&outputs, "attention")?;
    node.release(outputs);

    let mut output = String::new();
    for (ids, mask) in tokens.iter().zip(&attention) {
        output.push_str(&format!("tokens:    {}\nattention: {}\n", ids, mask));
    }

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &output)?;
            println!("Encoded {} rows to {}", rows.len(), path);
        }
        None => {
            print!("{}", output);
        }
    }

    node.deinitialize();
    Ok(())
}
