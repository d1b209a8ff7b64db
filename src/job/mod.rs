// src/job/mod.rs

//! Job definitions: what a named, supervised command looks like.
//!
//! A [`Definition`] is immutable once built. Its command is classified once,
//! at construction time, into a [`CommandSpec`]: either literal argv tokens
//! or a runtime interpreter placeholder that the runner resolves to an
//! absolute path right before spawning.

pub mod fingerprint;
pub mod interpreter;

use std::fmt;

use crate::errors::{JobscreenError, Result};

pub use fingerprint::{fingerprint, Fingerprint};
pub use interpreter::{find_in_path, Interpreter};

/// How a job's argv is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSpec {
    /// Tokens are passed to the OS verbatim.
    Literal(Vec<String>),
    /// First token was an interpreter placeholder (e.g. `php`); the
    /// remaining tokens are its arguments.
    RuntimeInterpreter {
        interpreter: Interpreter,
        args: Vec<String>,
    },
}

impl CommandSpec {
    /// Classify raw tokens.
    ///
    /// Fails if there are no tokens or any token is empty.
    pub fn parse(tokens: Vec<String>) -> Result<Self> {
        if tokens.is_empty() {
            return Err(JobscreenError::ConfigError(
                "command must contain at least one token".to_string(),
            ));
        }
        if let Some(idx) = tokens.iter().position(|t| t.is_empty()) {
            return Err(JobscreenError::ConfigError(format!(
                "command token #{idx} is empty"
            )));
        }

        match Interpreter::from_placeholder(&tokens[0]) {
            Some(interpreter) => Ok(CommandSpec::RuntimeInterpreter {
                interpreter,
                args: tokens[1..].to_vec(),
            }),
            None => Ok(CommandSpec::Literal(tokens)),
        }
    }

    /// The tokens as originally configured (placeholder not substituted).
    ///
    /// This is what the fingerprint is computed over, so a session keeps its
    /// identity regardless of where the interpreter happens to live.
    pub fn tokens(&self) -> Vec<String> {
        match self {
            CommandSpec::Literal(tokens) => tokens.clone(),
            CommandSpec::RuntimeInterpreter { interpreter, args } => {
                let mut tokens = Vec::with_capacity(args.len() + 1);
                tokens.push(interpreter.placeholder().to_string());
                tokens.extend(args.iter().cloned());
                tokens
            }
        }
    }

    /// Produce the argv to spawn, substituting the interpreter's absolute
    /// path where needed.
    pub fn resolve(&self) -> Result<Vec<String>> {
        match self {
            CommandSpec::Literal(tokens) => Ok(tokens.clone()),
            CommandSpec::RuntimeInterpreter { interpreter, args } => {
                let binary = interpreter.locate()?;
                let mut argv = Vec::with_capacity(args.len() + 1);
                argv.push(binary.to_string_lossy().into_owned());
                argv.extend(args.iter().cloned());
                Ok(argv)
            }
        }
    }
}

/// A named command under supervision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    name: String,
    command: CommandSpec,
    restart: bool,
}

impl Definition {
    /// Build a definition from raw command tokens.
    pub fn new(name: impl Into<String>, command: Vec<String>, restart: bool) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        let command = CommandSpec::parse(command).map_err(|e| match e {
            JobscreenError::ConfigError(msg) => {
                JobscreenError::ConfigError(format!("job '{name}': {msg}"))
            }
            other => other,
        })?;

        Ok(Self {
            name,
            command,
            restart,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn command(&self) -> &CommandSpec {
        &self.command
    }

    /// Whether the job should be restarted after it ends on its own.
    pub fn restart_enabled(&self) -> bool {
        self.restart
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.command.tokens().join(" "))
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(JobscreenError::ConfigError(
            "job name must not be empty".to_string(),
        ));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(JobscreenError::ConfigError(format!(
            "job name '{name}' must not contain whitespace"
        )));
    }
    Ok(())
}
