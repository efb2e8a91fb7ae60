//! CLI commands for the bpenode tool.

pub mod benchmark;
pub mod detokenize;
pub mod encode;
pub mod info;

pub use benchmark::BenchmarkCommand;
pub use detokenize::DetokenizeCommand;
pub use encode::EncodeCommand;
pub use info::InfoCommand;

use anyhow::anyhow;

/// Turn a host status code into an error carrying the failed step.
pub(crate) fn status<T>(step: &str, result: Result<T, i32>) -> anyhow::Result<T> {
    result.map_err(|code| anyhow!("{} failed with status {}", step, code))
}
