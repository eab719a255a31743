// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every flag here is optional: with no arguments the watcher uses the
//! built-in layout under `~/Documents/Orchestrate`. Flags override values
//! from the `--config` file, which in turn override the defaults.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `taskbridge`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "taskbridge",
    version,
    about = "Watch a shared task queue file and run each queued task through a coding assistant.",
    long_about = None
)]
pub struct CliArgs {
    /// Optional TOML config file with `[watcher]` and `[executor]` sections.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Working directory holding the queue and results files.
    #[arg(long, value_name = "DIR")]
    pub dir: Option<String>,

    /// Queue file (relative paths resolve against `--dir`).
    #[arg(long, value_name = "PATH")]
    pub queue_file: Option<String>,

    /// Results file used to seed already-processed task ids.
    #[arg(long, value_name = "PATH")]
    pub results_file: Option<String>,

    /// Explicit path to the assistant executable (skips discovery).
    #[arg(long, value_name = "PATH")]
    pub program: Option<String>,

    /// Poll the queue file every N milliseconds (0 disables polling).
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Disable OS file-watch notifications and rely on polling only.
    #[arg(long)]
    pub no_fs_events: bool,

    /// Dispatch whatever is queued right now, wait for it to finish, and exit.
    #[arg(long)]
    pub once: bool,

    /// Resolve settings and show which tasks would run, without running them.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKBRIDGE_LOG` or a default level will be used.
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
