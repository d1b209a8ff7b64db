// src/logging.rs

//! Logging on `tracing` + `tracing-subscriber`.
//!
//! `--log-level` wins when given. Otherwise `JOBSCREEN_LOG` is read as
//! `EnvFilter` directives, so `jobscreen::supervisor=debug,warn` narrows
//! output to one module. Without either, `info`.
//!
//! Logs go to stderr: stdout carries status lines and job logs, and inside
//! a session it is the job's own terminal.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "JOBSCREEN_LOG";

const DEFAULT_DIRECTIVES: &str = "info";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let from_env = std::env::var(LOG_ENV_VAR).ok();

    fmt()
        .with_env_filter(log_filter(cli_level, from_env.as_deref()))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("initialising logging: {e}"))
}

/// Filter for the given CLI level and `JOBSCREEN_LOG` value.
///
/// Directives that do not parse are ignored in favour of the default.
pub fn log_filter(cli_level: Option<LogLevel>, env_directives: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(level.as_directive());
    }

    env_directives
        .map(str::trim)
        .filter(|directives| !directives.is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}
