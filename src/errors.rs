// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Only fatal conditions live here. Expected outcomes of talking to the
//! session service (a spawn that timed out, a signal that could not be
//! delivered) are reported as plain `bool`s by the supervisor instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobscreenError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Duplicate job name: {0}")]
    DuplicateJob(String),

    #[error("No '{0}' interpreter found on PATH")]
    InterpreterNotFound(String),

    #[error("attach requires an interactive terminal")]
    NotInteractive,

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, JobscreenError>;
