// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `jobscreen`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "jobscreen",
    version,
    about = "Supervise long-running named jobs in detached screen sessions.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `jobscreen.toml` in the current working directory.
    #[arg(long, global = true, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `JOBSCREEN_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: JobCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum JobCommand {
    /// Start all or the given jobs.
    Start {
        /// Job names; all jobs when omitted.
        names: Vec<String>,
    },
    /// Send Ctrl-C to all or the given jobs.
    Stop { names: Vec<String> },
    /// Forcefully terminate all or the given jobs.
    Kill { names: Vec<String> },
    /// Gracefully stop, then start, all or the given jobs.
    Restart { names: Vec<String> },
    /// Show whether jobs are running.
    Status { names: Vec<String> },
    /// Print the log of all or the given jobs.
    Log { names: Vec<String> },
    /// Attach the terminal to a job's session (detach with Ctrl-A D).
    Attach { name: String },
    /// Run a job in the foreground; this is what job sessions execute.
    #[command(hide = true)]
    Run { name: String },
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

impl LogLevel {
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
