//! Bpenode CLI - drive the tokenizer and detokenizer nodes from a shell.
//!
//! This is the main entry point for the `bpenode` command-line tool.

mod commands;

use clap::{Parser, Subcommand};
use commands::{BenchmarkCommand, DetokenizeCommand, EncodeCommand, InfoCommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bpenode")]
#[command(about = "BPE tokenization and detokenization nodes", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode texts to token IDs through the tokenizer node
    Encode(EncodeCommand),
    /// Turn token IDs back into text
    Detokenize(DetokenizeCommand),
    /// Print a node's input and output schema as JSON
    Info(InfoCommand),
    /// Benchmark encoding performance
    Benchmark(BenchmarkCommand),
}

fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbose: u8) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Encode(cmd) => commands::encode::run(cmd)?,
        Commands::Detokenize(cmd) => commands::detokenize::run(cmd)?,
        Commands::Info(cmd) => commands::info::run(cmd)?,
        Commands::Benchmark(cmd) => commands::benchmark::run(cmd)?,
    }

    Ok(())
}
