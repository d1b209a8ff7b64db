// src/config/mod.rs

//! Configuration loading and validation for jobscreen.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate jobs and global settings (`validate.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{
    default_config_path, include_paths, load_and_validate, load_from_path, load_jobs_file,
    resolve_base_dir,
};
pub use model::{ConfigFile, ConfigSection, JobConfig, JobsFile, RawConfigFile, Timings};
