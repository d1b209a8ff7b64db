#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use jobscreen::config::{ConfigFile, ConfigSection, JobConfig, RawConfigFile};
use jobscreen::invocation::SelfInvocation;
use jobscreen::job::Definition;
use jobscreen::registry::StaticRegistry;
use jobscreen::session::SessionService;
use jobscreen::supervisor::{Supervisor, SupervisorSettings};

/// Program path the fixtures pretend to be running as.
pub const FAKE_PROGRAM: &str = "/opt/jobscreen/bin/jobscreen";

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                job: BTreeMap::new(),
            },
        }
    }

    pub fn with_job(mut self, name: &str, job: JobConfig) -> Self {
        self.config.job.insert(name.to_string(), job);
        self
    }

    pub fn with_environment(mut self, environment: &str) -> Self {
        self.config.config.environment = environment.to_string();
        self
    }

    pub fn with_stop_timeout(mut self, timeout: &str) -> Self {
        self.config.config.stop_timeout = timeout.to_string();
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `JobConfig`.
pub struct JobConfigBuilder {
    job: JobConfig,
}

impl JobConfigBuilder {
    /// Whitespace-split `cmd` into tokens.
    pub fn new(cmd: &str) -> Self {
        Self {
            job: JobConfig {
                command: cmd.split_whitespace().map(str::to_string).collect(),
                restart: false,
            },
        }
    }

    pub fn restart(mut self, restart: bool) -> Self {
        self.job.restart = restart;
        self
    }

    pub fn build(self) -> JobConfig {
        self.job
    }
}

/// Definition from a whitespace-separated command line.
pub fn definition(name: &str, cmd: &str, restart: bool) -> Definition {
    Definition::new(
        name,
        cmd.split_whitespace().map(str::to_string).collect(),
        restart,
    )
    .expect("valid test definition")
}

pub fn test_invocation(base_dir: &Path) -> SelfInvocation {
    SelfInvocation::new(
        FAKE_PROGRAM,
        vec![
            "--config".to_string(),
            base_dir.join("jobscreen.toml").to_string_lossy().into_owned(),
        ],
    )
}

/// Settings with short timings so escalation paths finish quickly.
pub fn test_settings(base_dir: &Path) -> SupervisorSettings {
    SupervisorSettings {
        base_dir: base_dir.to_path_buf(),
        environment: "test".to_string(),
        invocation: test_invocation(base_dir),
        stop_timeout: Duration::from_millis(200),
        poll_interval: Duration::from_millis(10),
    }
}

/// Supervisor over `sessions` managing `definitions`, rooted at `base_dir`.
pub fn supervisor<S: SessionService>(
    sessions: S,
    definitions: Vec<Definition>,
    base_dir: &Path,
) -> Supervisor<S> {
    let registry =
        StaticRegistry::from_definitions(definitions).expect("unique test definitions");
    Supervisor::new(sessions, Arc::new(registry), test_settings(base_dir))
}
