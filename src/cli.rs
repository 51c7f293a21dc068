// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `multiserv`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "multiserv",
    version,
    about = "Launch and supervise a set of server processes from one console.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (JSON).
    ///
    /// Default: `servers.json` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "servers.json")]
    pub config: String,

    /// Delay in seconds between consecutive autorun launches.
    ///
    /// Overrides `staggerSecs` from the config file when provided.
    #[arg(long, value_name = "SECS")]
    pub stagger_secs: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MULTISERV_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate the config, print the servers, but don't launch anything.
    #[arg(long)]
    pub dry_run: bool,
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
