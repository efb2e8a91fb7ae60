//! Detokenize command implementation.

use clap::Parser;

/// Detokenize command arguments.
#[derive(Parser)]
pub struct DetokenizeCommand {
    /// Path to vocab.json, or a directory holding it
    #[arg(short, long)]
    pub model: String,

    /// Token IDs to detokenize (comma-separated)
    #[arg(short, long)]
    pub ids: String,

    /// Maximum output length in bytes
    #[arg(long, default_value_t = 1024)]
    pub max_bytes: usize,

    /// Skip special tokens during detokenization
    #[arg(short, long, default_value_t = false)]
    pub skip_special: bool,
}

use anyhow::Result as AnyhowResult;
use bpenode_tokenizer::Detokenizer;
use std::path::Path;
use tracing::debug;

pub fn run(cmd: DetokenizeCommand) -> AnyhowResult<()> {
    let model = Detokenizer::load(Path::new(&cmd.model))?;

    let ids: Vec<i64> = cmd
        .ids
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().parse::<i64>())
        .collect::<Result<Vec<_>, _>>()?;

    debug!(model_id = model.id(), count = ids.len(), "detokenizing ids");
    let text = model.detokenize(&ids, cmd.max_bytes, cmd.skip_special)?;
    println!("{}", text);

    Ok(())
}
