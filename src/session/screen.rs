// src/session/screen.rs

//! GNU `screen` backed session service.

use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{BoxFuture, SessionEntry, SessionService, SpawnRequest};

/// Drives the `screen` executable.
///
/// Every invocation except `attach` is bounded by `timeout`; a call that
/// runs longer is killed and counts as failed.
#[derive(Debug, Clone)]
pub struct ScreenSessions {
    binary: PathBuf,
    timeout: Duration,
}

impl ScreenSessions {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Run to completion within the timeout; `None` if it could not be
    /// spawned or timed out.
    async fn run_bounded(&self, mut cmd: Command, what: &str) -> Option<Output> {
        match timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => {
                debug!(
                    op = what,
                    exit_code = output.status.code().unwrap_or(-1),
                    stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                    "screen call finished"
                );
                Some(output)
            }
            Ok(Err(e)) => {
                warn!(op = what, binary = ?self.binary, error = %e, "failed to run screen");
                None
            }
            Err(_) => {
                warn!(op = what, timeout = ?self.timeout, "screen call timed out");
                None
            }
        }
    }

    async fn run_checked(&self, cmd: Command, what: &str) -> bool {
        self.run_bounded(cmd, what)
            .await
            .is_some_and(|output| output.status.success())
    }
}

impl SessionService for ScreenSessions {
    fn create_detached<'a>(&'a self, request: &'a SpawnRequest) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let mut cmd = self.command();
            cmd.arg("-dmS")
                .arg(&request.session)
                .args(&request.argv)
                .current_dir(&request.cwd)
                .envs(request.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            self.run_checked(cmd, "create").await
        })
    }

    fn list_sessions(&self) -> BoxFuture<'_, Option<String>> {
        Box::pin(async move {
            let mut cmd = self.command();
            cmd.arg("-ls");
            // `screen -ls` exits non-zero even when it lists sessions, so
            // only the text matters.
            self.run_bounded(cmd, "list")
                .await
                .map(|output| String::from_utf8_lossy(&output.stdout).into_owned())
        })
    }

    fn send_keys<'a>(&'a self, session: &'a str, keys: &'a str) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let mut cmd = self.command();
            cmd.args(["-S", session, "-X", "stuff", keys]);
            self.run_checked(cmd, "stuff").await
        })
    }

    fn send_signal<'a>(&'a self, session: &'a SessionEntry, signal: Signal) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let Ok(raw) = i32::try_from(session.pid) else {
                warn!(pid = session.pid, "session pid out of range");
                return false;
            };
            match kill(Pid::from_raw(raw), signal) {
                Ok(()) => true,
                // Already gone.
                Err(Errno::ESRCH) => true,
                Err(e) => {
                    warn!(pid = session.pid, ?signal, error = %e, "failed to signal session");
                    false
                }
            }
        })
    }

    fn terminate_session<'a>(&'a self, session: &'a str) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let mut cmd = self.command();
            cmd.args(["-S", session, "-X", "quit"]);
            self.run_checked(cmd, "quit").await
        })
    }

    fn wipe(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            let mut cmd = self.command();
            cmd.arg("-wipe");
            // Exit status mirrors the listing, not the cleanup; finishing in
            // time is what counts.
            self.run_bounded(cmd, "wipe").await.is_some()
        })
    }

    fn attach<'a>(&'a self, session: &'a str) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let status = Command::new(&self.binary)
                .args(["-r", session])
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .await;
            match status {
                Ok(status) => status.success(),
                Err(e) => {
                    warn!(session, error = %e, "failed to attach to session");
                    false
                }
            }
        })
    }
}
