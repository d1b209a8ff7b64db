// src/config/validate.rs

use crate::config::duration::parse_duration;
use crate::config::model::{ConfigFile, RawConfigFile, Timings};
use crate::errors::{JobscreenError, Result};
use crate::job::Definition;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::JobscreenError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_jobs(&raw)?;
        let timings = parse_timings(&raw)?;
        validate_global_config(&raw, &timings)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.job, timings))
    }
}

fn validate_jobs(cfg: &RawConfigFile) -> Result<()> {
    // Building a definition runs the same checks the registry relies on
    // (non-empty name without whitespace, non-empty command tokens).
    for (name, job) in cfg.job.iter() {
        Definition::new(name.as_str(), job.command.clone(), job.restart)?;
    }
    Ok(())
}

fn parse_timings(cfg: &RawConfigFile) -> Result<Timings> {
    let field = |key: &str, value: &str| {
        parse_duration(value).map_err(|e| {
            JobscreenError::ConfigError(format!("[config].{key}: {e}"))
        })
    };

    Ok(Timings {
        spawn_timeout: field("spawn_timeout", &cfg.config.spawn_timeout)?,
        stop_timeout: field("stop_timeout", &cfg.config.stop_timeout)?,
        poll_interval: field("poll_interval", &cfg.config.poll_interval)?,
        restart_delay: field("restart_delay", &cfg.config.restart_delay)?,
    })
}

fn validate_global_config(cfg: &RawConfigFile, timings: &Timings) -> Result<()> {
    if timings.poll_interval.is_zero() {
        return Err(JobscreenError::ConfigError(
            "[config].poll_interval must be > 0".to_string(),
        ));
    }

    if timings.spawn_timeout.is_zero() {
        return Err(JobscreenError::ConfigError(
            "[config].spawn_timeout must be > 0".to_string(),
        ));
    }

    if cfg.config.environment.trim().is_empty() {
        return Err(JobscreenError::ConfigError(
            "[config].environment must not be empty".to_string(),
        ));
    }

    if cfg.config.screen_binary.trim().is_empty() {
        return Err(JobscreenError::ConfigError(
            "[config].screen_binary must not be empty".to_string(),
        ));
    }

    Ok(())
}
