//! Benchmark command implementation.

use clap::Parser;

/// Benchmark command arguments.
#[derive(Parser)]
pub struct BenchmarkCommand {
    /// Model directory (vocab.json + merges.txt) or vocab.json path
    #[arg(short, long)]
    pub model: String,

    /// Path to input text file for benchmarking
    #[arg(short, long)]
    pub input: String,

    /// Number of iterations to run
    #[arg(short = 'n', long, default_value_t = 100)]
    pub iterations: usize,

    /// Segment cache capacity (0 disables the cache)
    #[arg(long, default_value_t = 1000)]
    pub cache_capacity: usize,

    /// Lowercase and collapse whitespace before encoding
    #[arg(long, default_value_t = false)]
    pub lowercase: bool,
}

use anyhow::Result as AnyhowResult;
use bpenode_tokenizer::Tokenizer;
use std::fs;
use std::time::Instant;
use tracing::info;

pub fn run(cmd: BenchmarkCommand) -> AnyhowResult<()> {
    let tokenizer = Tokenizer::builder()
        .model_path(&cmd.model)
        .cache_capacity(cmd.cache_capacity)
        .lowercase(cmd.lowercase)
        .build()?;

    let text = fs::read_to_string(&cmd.input)?;
    let iterations = cmd.iterations.max(1);

    println!("Benchmarking encoding...");
    println!("  Text length: {} bytes", text.len());
    println!("  Iterations: {}", iterations);
    println!("  Style: {}", tokenizer.style());
    println!();

    // Warmup, also surfaces lookup errors before timing
    let tokens = tokenizer.encode(&text)?.len();

    let start = Instant::now();
    for _ in 0..iterations {
        tokenizer.encode(&text)?;
    }
    let elapsed = start.elapsed();
    info!(iterations, elapsed_ms = elapsed.as_millis() as u64, "benchmark finished");

    let avg_time_ms = elapsed.as_secs_f64() * 1000.0 / iterations as f64;
    let throughput = (tokens * iterations) as f64 / elapsed.as_secs_f64().max(f64::EPSILON);

    println!("Results:");
    println!("  Tokens per run: {}", tokens);
    println!("  Total time: {:.2}s", elapsed.as_secs_f64());
    println!("  Average time: {:.3}ms", avg_time_ms);
    println!("  Throughput: {:.0} tokens/s", throughput);
    if let Some(hit_rate) = tokenizer.cache_stats().hit_rate {
        println!("  Cache hit rate: {:.1}%", hit_rate * 100.0);
    }

    Ok(())
}
