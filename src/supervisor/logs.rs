// src/supervisor/logs.rs

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::job::Fingerprint;

/// Directory under the base directory that holds one log per fingerprint.
pub const LOG_DIR: &str = "logs";

/// `<base_dir>/logs/<fingerprint>.log`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLayout {
    dir: PathBuf,
}

impl LogLayout {
    pub fn new(base_dir: &Path) -> Self {
        Self {
            dir: base_dir.join(LOG_DIR),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.dir.join(format!("{fingerprint}.log"))
    }

    /// Ensure the directory exists and leave an empty log behind.
    pub async fn prepare(&self, fingerprint: &Fingerprint) -> std::io::Result<PathBuf> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(fingerprint);
        fs::File::create(&path).await?;
        debug!(path = ?path, "truncated log file");
        Ok(path)
    }

    /// Whole log contents; `None` if missing or empty.
    pub async fn read(&self, fingerprint: &Fingerprint) -> std::io::Result<Option<String>> {
        let path = self.path_for(fingerprint);
        match fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}
