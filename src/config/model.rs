// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Configuration exactly as read from a TOML file.
///
/// ```toml
/// [config]
/// environment = "prod"
/// restart_delay = "3s"
///
/// [job.worker]
/// command = ["php", "bin/console", "messenger:consume"]
/// restart = true
/// ```
///
/// `[config].include` lists further files holding only `[job.<name>]`
/// tables (see [`JobsFile`]).
///
/// All sections are optional and have reasonable defaults. Use
/// `ConfigFile::try_from` to get a validated [`ConfigFile`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Global behaviour config from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All jobs from `[job.<name>]`, keyed by job name.
    #[serde(default)]
    pub job: BTreeMap<String, JobConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Deployment environment, forwarded to every job as `APP_ENV`.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Directory jobs run in and logs live under.
    ///
    /// Relative paths are resolved against the config file's directory;
    /// when omitted, the config file's directory itself is used.
    #[serde(default)]
    pub base_dir: Option<PathBuf>,

    /// Name or path of the `screen` executable.
    #[serde(default = "default_screen_binary")]
    pub screen_binary: String,

    /// Upper bound for every short-lived `screen` invocation (`"5s"`).
    #[serde(default = "default_spawn_timeout")]
    pub spawn_timeout: String,

    /// How long a graceful stop waits before escalating to kill.
    #[serde(default = "default_stop_timeout")]
    pub stop_timeout: String,

    /// Poll interval while waiting for a graceful stop.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    /// Delay before a crashed job with `restart = true` is started again.
    #[serde(default = "default_restart_delay")]
    pub restart_delay: String,

    /// Extra job files, relative to the config file's directory.
    #[serde(default)]
    pub include: Vec<PathBuf>,
}

fn default_environment() -> String {
    "prod".to_string()
}

fn default_screen_binary() -> String {
    "screen".to_string()
}

fn default_spawn_timeout() -> String {
    "5s".to_string()
}

fn default_stop_timeout() -> String {
    "5s".to_string()
}

fn default_poll_interval() -> String {
    "100ms".to_string()
}

fn default_restart_delay() -> String {
    "3s".to_string()
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            base_dir: None,
            screen_binary: default_screen_binary(),
            spawn_timeout: default_spawn_timeout(),
            stop_timeout: default_stop_timeout(),
            poll_interval: default_poll_interval(),
            restart_delay: default_restart_delay(),
            include: Vec::new(),
        }
    }
}

/// A file of job definitions pulled in through `[config].include`.
///
/// Job names must not repeat across the main config and its includes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobsFile {
    #[serde(default)]
    pub job: BTreeMap<String, JobConfig>,
}

/// `[job.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    /// Argv tokens. The first one may be an interpreter placeholder such as
    /// `"php"`.
    pub command: Vec<String>,

    /// Restart the job after it ends on its own (crash or completion).
    #[serde(default)]
    pub restart: bool,
}

/// Durations from `[config]`, parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub spawn_timeout: Duration,
    pub stop_timeout: Duration,
    pub poll_interval: Duration,
    pub restart_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            spawn_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(100),
            restart_delay: Duration::from_secs(3),
        }
    }
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (see `validate.rs`), so
/// holding one means every job command is non-empty and every duration
/// parses.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub job: BTreeMap<String, JobConfig>,
    pub timings: Timings,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        job: BTreeMap<String, JobConfig>,
        timings: Timings,
    ) -> Self {
        Self {
            config,
            job,
            timings,
        }
    }
}
