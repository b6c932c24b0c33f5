// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `terrapolice`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "terrapolice",
    version,
    about = "Run `terraform plan` across many directories and report drift.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (`.json` or `.toml`).
    #[arg(short = 'f', long, value_name = "PATH", default_value = "terrapolice.json")]
    pub config: String,

    /// Send a notification for every classified init/plan outcome.
    #[arg(short = 'n', long)]
    pub notify: bool,

    /// Override the configured number of concurrent workers.
    #[arg(short = 'c', long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TERRAPOLICE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the resolved directories, but don't run the tool.
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
