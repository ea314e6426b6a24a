// src/cli/commands.rs
use crate::types::AlgorithmType;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Hashcash Miner CLI - parallel proof-of-work nonce search
#[derive(Parser, Debug)]
#[command(name = "hashcash-miner")]
#[command(version, about, long_about = None)]
pub struct Commands {
    /// Increase log verbosity (-v debug, -vv every attempted nonce)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// The action to perform (mine, run benchmarks, or generate config)
    #[command(subcommand)]
    pub action: Action,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Build the block header and race the workers for a valid nonce
    Mine(MineOptions),

    /// Measure digest throughput
    Benchmark(BenchmarkOptions),

    /// Generate configuration file template
    Config(ConfigOptions),
}

/// Options for a mining run; each overrides the configuration file
#[derive(Parser, Debug)]
pub struct MineOptions {
    /// Number of leading zero hex characters required
    #[arg(allow_negative_numbers = true)]
    pub difficulty: Option<i64>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of workers
    #[arg(short, long, env = "HASHCASH_WORKERS")]
    pub workers: Option<usize>,

    /// Digest algorithm
    #[arg(short, long)]
    pub algorithm: Option<AlgorithmType>,

    /// Payload location (http(s) URL, file:// URL or path)
    #[arg(short, long)]
    pub payload: Option<String>,

    /// Give up after this many seconds
    #[arg(short, long)]
    pub deadline: Option<u64>,

    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Options for running digest benchmarks
#[derive(Parser, Debug)]
pub struct BenchmarkOptions {
    /// Algorithm to benchmark
    #[arg(short, long, default_value_t = AlgorithmType::Sha256)]
    pub algorithm: AlgorithmType,

    /// Duration of benchmark in seconds
    #[arg(short, long, default_value_t = 10)]
    pub duration: u64,

    /// Number of threads to use
    #[arg(short, long, default_value_t = num_cpus::get())]
    pub threads: usize,
}

/// Options for generating configuration files
#[derive(Parser, Debug)]
pub struct ConfigOptions {
    /// Output file path
    #[arg(short, long, default_value = "config.toml")]
    pub output: PathBuf,
}
