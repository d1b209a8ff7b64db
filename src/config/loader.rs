// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, JobsFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks job names and commands, and parses durations.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Default config location: `jobscreen.toml` in the current directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("jobscreen.toml")
}

/// Load a file listed in `[config].include`.
pub fn load_jobs_file(path: impl AsRef<Path>) -> Result<JobsFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    Ok(toml::from_str(&contents)?)
}

/// `[config].include` entries, relative ones joined onto the config file's
/// directory.
pub fn include_paths(config_path: &Path, cfg: &ConfigFile) -> Vec<PathBuf> {
    let config_dir = config_dir(config_path);
    cfg.config
        .include
        .iter()
        .map(|path| {
            if path.is_absolute() {
                path.clone()
            } else {
                config_dir.join(path)
            }
        })
        .collect()
}

fn config_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Resolve the directory jobs run in.
///
/// - An absolute `base_dir` is used as is.
/// - A relative `base_dir` is joined onto the config file's directory.
/// - Without `base_dir`, the config file's directory is used; a bare file
///   name like `jobscreen.toml` falls back to the current directory.
///
/// The result is canonicalized when possible, since it feeds into every
/// fingerprint and must not depend on how the tool was invoked.
pub fn resolve_base_dir(config_path: &Path, cfg: &ConfigFile) -> PathBuf {
    let config_dir = config_dir(config_path);

    let base = match cfg.config.base_dir.as_deref() {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => config_dir.join(dir),
        None => config_dir,
    };

    fs::canonicalize(&base).unwrap_or(base)
}
