// src/job/interpreter.rs

use std::path::PathBuf;

use tracing::debug;

use crate::errors::{JobscreenError, Result};

/// Language runtimes that may appear as a bare placeholder in the first
/// command token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interpreter {
    Php,
    Python,
    Node,
    Ruby,
}

impl Interpreter {
    pub fn from_placeholder(token: &str) -> Option<Self> {
        match token {
            "php" => Some(Interpreter::Php),
            "python" => Some(Interpreter::Python),
            "node" => Some(Interpreter::Node),
            "ruby" => Some(Interpreter::Ruby),
            _ => None,
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Interpreter::Php => "php",
            Interpreter::Python => "python",
            Interpreter::Node => "node",
            Interpreter::Ruby => "ruby",
        }
    }

    /// Executable names to look for, in order of preference.
    fn candidates(self) -> &'static [&'static str] {
        match self {
            Interpreter::Php => &["php"],
            Interpreter::Python => &["python3", "python"],
            Interpreter::Node => &["node", "nodejs"],
            Interpreter::Ruby => &["ruby"],
        }
    }

    /// Absolute path of the first matching interpreter on `PATH`.
    pub fn locate(self) -> Result<PathBuf> {
        for candidate in self.candidates() {
            if let Some(path) = find_in_path(candidate) {
                debug!(interpreter = self.placeholder(), path = ?path, "resolved interpreter");
                return Ok(path);
            }
        }
        Err(JobscreenError::InterpreterNotFound(
            self.placeholder().to_string(),
        ))
    }
}

/// Search `PATH` for an executable file called `binary`.
pub fn find_in_path(binary: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for segment in std::env::split_paths(&path_var) {
        let candidate = segment.join(binary);
        if is_executable(&candidate) {
            return Some(candidate);
        }
    }

    None
}

#[cfg(unix)]
fn is_executable(path: &std::path::Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &std::path::Path) -> bool {
    path.is_file()
}
