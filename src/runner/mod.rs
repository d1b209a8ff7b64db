// src/runner/mod.rs

//! In-session entrypoint (`jobscreen run <name>`).
//!
//! The runner is what actually lives inside a job's session. It spawns the
//! job's command, mirrors its output to the session terminal and the log
//! file, forwards signals, and reports the run through lifecycle events:
//!
//! - `Started` once the process is spawned,
//! - `SignalReceived` for every relayed signal,
//! - `Failed` if spawning or waiting errors,
//! - `Stopped` exactly once at the end, even after a failure.
//!
//! Interpreter resolution happens before any of this; if the placeholder
//! cannot be resolved the runner returns an error and emits nothing.

pub mod relay;
pub mod signals;

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::fs::{File, OpenOptions};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::errors::Result;
use crate::events::{ChildHandle, EventBus, LifecycleEvent, UNKNOWN_EXIT_CODE};
use crate::job::Definition;
use crate::supervisor::ENVIRONMENT_VAR;

use relay::relay;
use signals::RelaySignals;

/// How long output relays may keep draining after the job exits (a
/// backgrounded grandchild can hold the pipes open indefinitely).
const RELAY_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Working directory of the job.
    pub base_dir: PathBuf,
    /// Value of `APP_ENV` for the job.
    pub environment: String,
    /// Log file the job's output is appended to.
    pub log_path: PathBuf,
}

#[derive(Debug)]
pub struct Runner {
    definition: Definition,
    settings: RunnerSettings,
    bus: EventBus,
    child: ChildHandle,
}

impl Runner {
    pub fn new(definition: Definition, settings: RunnerSettings, bus: EventBus) -> Self {
        Self {
            definition,
            settings,
            bus,
            child: ChildHandle::default(),
        }
    }

    /// Run the job to completion and return its exit code.
    pub async fn run(mut self) -> Result<i32> {
        let argv = self.definition.command().resolve()?;

        let exit_code = match self.supervise(&argv).await {
            Ok(code) => code,
            Err(e) => {
                error!(job = self.definition.name(), error = %e, "job run failed");
                self.emit(LifecycleEvent::Failed {
                    definition: self.definition.clone(),
                    child: self.child,
                    error: e.to_string(),
                });
                UNKNOWN_EXIT_CODE
            }
        };

        self.emit(LifecycleEvent::Stopped {
            definition: self.definition.clone(),
            child: self.child,
            exit_code,
        });

        Ok(exit_code)
    }

    fn emit(&mut self, event: LifecycleEvent) {
        self.bus.dispatch(&event);
    }

    async fn supervise(&mut self, argv: &[String]) -> Result<i32> {
        let name = self.definition.name().to_string();
        let (program, args) = argv
            .split_first()
            .context("resolved command is empty")?;

        let mut signals = RelaySignals::install().context("installing signal handlers")?;

        let stdout_log = open_log(&self.settings.log_path).await?;
        let stderr_log = open_log(&self.settings.log_path).await?;

        info!(job = %name, command = %argv.join(" "), "spawning job process");

        let mut child = Command::new(program)
            .args(args)
            .current_dir(&self.settings.base_dir)
            .env(ENVIRONMENT_VAR, &self.settings.environment)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawning process for job '{name}'"))?;

        self.child.pid = child.id();
        self.emit(LifecycleEvent::Started {
            definition: self.definition.clone(),
            child: self.child,
        });

        let relays = spawn_relays(&mut child, stdout_log, stderr_log);

        // Signals interleave with the wait; the wait future is dropped and
        // re-created on each turn, which is cancel-safe for `Child::wait`.
        let status = loop {
            tokio::select! {
                status = child.wait() => {
                    break status.with_context(|| format!("waiting for process of job '{name}'"))?;
                }
                signal = signals.recv() => {
                    self.emit(LifecycleEvent::SignalReceived {
                        definition: self.definition.clone(),
                        child: self.child,
                        signal,
                    });
                    forward_signal(&mut child, signal);
                }
            }
        };

        drain_relays(relays).await;

        let code = status.code().unwrap_or(UNKNOWN_EXIT_CODE);
        info!(job = %name, exit_code = code, success = status.success(), "job process exited");
        Ok(code)
    }
}

async fn open_log(path: &std::path::Path) -> Result<File> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("opening log file {:?}", path))?;
    Ok(file)
}

fn spawn_relays(child: &mut Child, stdout_log: File, stderr_log: File) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::with_capacity(2);

    if let Some(stdout) = child.stdout.take() {
        handles.push(tokio::spawn(async move {
            if let Err(e) = relay(stdout, tokio::io::stdout(), stdout_log, "stdout").await {
                warn!(error = %e, "stdout relay failed");
            }
        }));
    }

    if let Some(stderr) = child.stderr.take() {
        handles.push(tokio::spawn(async move {
            if let Err(e) = relay(stderr, tokio::io::stderr(), stderr_log, "stderr").await {
                warn!(error = %e, "stderr relay failed");
            }
        }));
    }

    handles
}

async fn drain_relays(relays: Vec<JoinHandle<()>>) {
    for handle in relays {
        let abort = handle.abort_handle();
        if timeout(RELAY_DRAIN_TIMEOUT, handle).await.is_err() {
            warn!("output relay still open after job exit; abandoning it");
            abort.abort();
        }
    }
}

/// Pass `signal` on to the job if it is still running. Never waits.
fn forward_signal(child: &mut Child, signal: Signal) {
    match child.try_wait() {
        Ok(None) => {}
        Ok(Some(_)) | Err(_) => {
            debug!(?signal, "job already exited; not forwarding signal");
            return;
        }
    }

    let Some(pid) = child.id().and_then(|pid| i32::try_from(pid).ok()) else {
        return;
    };

    match kill(Pid::from_raw(pid), signal) {
        Ok(()) => debug!(pid, ?signal, "forwarded signal to job"),
        Err(e) => warn!(pid, ?signal, error = %e, "failed to forward signal to job"),
    }
}
