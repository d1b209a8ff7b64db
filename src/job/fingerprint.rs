// src/job/fingerprint.rs

use std::fmt;
use std::path::Path;

use blake3::Hasher;

use crate::job::Definition;

/// Stable identifier binding a job definition to a session and a log file.
///
/// 64 lowercase hex characters (256-bit BLAKE3 digest).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fingerprint of a resolved definition under `base_dir`.
    pub fn of(base_dir: &Path, definition: &Definition) -> Self {
        fingerprint(base_dir, definition.name(), &definition.command().tokens())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Compute the fingerprint over (base directory, name, command tokens).
///
/// Every field is followed by a NUL byte, which cannot occur inside a path
/// component or argv token, so `["ab", "c"]` and `["a", "bc"]` hash apart.
pub fn fingerprint<S: AsRef<str>>(base_dir: &Path, name: &str, command: &[S]) -> Fingerprint {
    let mut hasher = Hasher::new();

    hasher.update(base_dir.as_os_str().as_encoded_bytes());
    hasher.update(&[0]);
    hasher.update(name.as_bytes());
    hasher.update(&[0]);
    for token in command {
        hasher.update(token.as_ref().as_bytes());
        hasher.update(&[0]);
    }

    Fingerprint(hasher.finalize().to_hex().to_string())
}
