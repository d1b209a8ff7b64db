// src/invocation.rs

//! How jobscreen re-invokes itself.
//!
//! Sessions run `jobscreen ... run <name>` and delayed restarts run
//! `jobscreen ... start <name>`; both need the same program path and global
//! flags (notably `--config`) as the process that scheduled them.

use std::path::{Path, PathBuf};

use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfInvocation {
    program: PathBuf,
    global_args: Vec<String>,
}

impl SelfInvocation {
    pub fn new(program: impl Into<PathBuf>, global_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            global_args,
        }
    }

    /// The running executable, pointed at `config_path`.
    pub fn current(config_path: &Path) -> Result<Self> {
        let program = std::env::current_exe()?;
        let config = std::fs::canonicalize(config_path).unwrap_or_else(|_| config_path.to_path_buf());
        Ok(Self::new(
            program,
            vec!["--config".to_string(), config.to_string_lossy().into_owned()],
        ))
    }

    /// Full argv for `<program> <global args> <subcommand> <job>`.
    pub fn argv(&self, subcommand: &str, job: &str) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.global_args.len() + 3);
        argv.push(self.program.to_string_lossy().into_owned());
        argv.extend(self.global_args.iter().cloned());
        argv.push(subcommand.to_string());
        argv.push(job.to_string());
        argv
    }

    /// Same as [`SelfInvocation::argv`], quoted into one `sh` command line.
    pub fn shell_line(&self, subcommand: &str, job: &str) -> String {
        self.argv(subcommand, job)
            .iter()
            .map(|arg| shell_quote(arg))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub fn shell_quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || "-_.:/%+=,@".contains(ch))
    {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\"'\"'"))
    }
}
