// src/cli.rs

//! CLI argument parsing using `clap` for the demo binary.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `dagrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dagrun",
    version,
    about = "Run the example computation graph with live status output.",
    long_about = None
)]
pub struct CliArgs {
    /// Status reporter tick interval in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 100)]
    pub interval_ms: u64,

    /// Maximum number of concurrently running nodes (default: unbounded).
    #[arg(long, value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// Disable the live status board.
    #[arg(long)]
    pub no_status: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DAGRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
