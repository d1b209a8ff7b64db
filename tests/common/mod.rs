#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub use jobscreen_test_utils::builders;
pub use jobscreen_test_utils::fake_sessions::{FakeSessions, SessionCall};
pub use jobscreen_test_utils::recorders::{RecordingListener, RecordingScheduler};
pub use jobscreen_test_utils::{init_tracing, with_timeout};

/// Write `contents` to `<dir>/jobscreen.toml` and return its path.
pub fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("jobscreen.toml");
    fs::write(&path, contents).expect("write test config");
    path
}
