// src/events/restart.rs

//! Automatic restarts for jobs with `restart = true`.
//!
//! A job that ends on its own (completion or crash) is started again after a
//! delay. A job that ends because an operator signalled it is not: the
//! signal is remembered in the [`SignalLedger`] when it arrives, and the
//! following `Stopped` event consumes that record instead of restarting.
//! One operator stop therefore suppresses exactly one restart.
//!
//! The ledger lives as long as the runner process. Nothing is persisted, so
//! suppression is best-effort across host restarts.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use nix::sys::signal::Signal;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::invocation::{shell_quote, SelfInvocation};
use crate::job::Definition;

use super::{LifecycleEvent, Listener};

/// Last signal received per job name.
///
/// Cloning shares the same map.
#[derive(Debug, Clone, Default)]
pub struct SignalLedger {
    signals: Arc<Mutex<HashMap<String, Signal>>>,
}

impl SignalLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Signal>> {
        self.signals.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record(&self, job: &str, signal: Signal) {
        self.lock().insert(job.to_string(), signal);
    }

    /// Remove and return the record for `job`.
    pub fn take(&self, job: &str) -> Option<Signal> {
        self.lock().remove(job)
    }

    pub fn get(&self, job: &str) -> Option<Signal> {
        self.lock().get(job).copied()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Launches a delayed `start` for a job, detached from the caller.
pub trait RestartScheduler: Send + Sync {
    /// `true` if the helper was launched.
    fn schedule(&self, definition: &Definition, delay: Duration) -> bool;
}

/// Restart listener.
pub struct RestartPolicy {
    ledger: SignalLedger,
    scheduler: Box<dyn RestartScheduler>,
    delay: Duration,
}

impl std::fmt::Debug for RestartPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestartPolicy")
            .field("ledger", &self.ledger)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl RestartPolicy {
    pub fn new(ledger: SignalLedger, scheduler: Box<dyn RestartScheduler>, delay: Duration) -> Self {
        Self {
            ledger,
            scheduler,
            delay,
        }
    }

    pub fn ledger(&self) -> &SignalLedger {
        &self.ledger
    }

    fn on_stopped(&mut self, definition: &Definition) {
        if !definition.restart_enabled() {
            return;
        }

        match self.ledger.take(definition.name()) {
            Some(signal) => {
                info!(
                    job = definition.name(),
                    ?signal,
                    "job was stopped by a signal; not restarting"
                );
            }
            None => {
                info!(
                    job = definition.name(),
                    delay = ?self.delay,
                    "job ended on its own; scheduling restart"
                );
                if !self.scheduler.schedule(definition, self.delay) {
                    warn!(job = definition.name(), "failed to schedule restart");
                }
            }
        }
    }
}

impl Listener for RestartPolicy {
    fn on_event(&mut self, event: &LifecycleEvent) {
        match event {
            LifecycleEvent::SignalReceived {
                definition, signal, ..
            } => {
                debug!(job = definition.name(), ?signal, "recording signal");
                self.ledger.record(definition.name(), *signal);
            }
            LifecycleEvent::Stopped { definition, .. } => self.on_stopped(definition),
            LifecycleEvent::Started { .. } | LifecycleEvent::Failed { .. } => {}
        }
    }
}

/// Production scheduler.
///
/// Runs `screen -dm sh -c 'sleep <delay>; exec jobscreen ... start <name>'`
/// in its own process group, so the helper outlives the runner and the
/// session the runner lives in.
#[derive(Debug, Clone)]
pub struct DetachedRestart {
    screen_binary: PathBuf,
    invocation: SelfInvocation,
    base_dir: PathBuf,
}

impl DetachedRestart {
    pub fn new(screen_binary: impl Into<PathBuf>, invocation: SelfInvocation, base_dir: PathBuf) -> Self {
        Self {
            screen_binary: screen_binary.into(),
            invocation,
            base_dir,
        }
    }

    /// The `sh -c` script the helper session runs.
    pub fn script(&self, definition: &Definition, delay: Duration) -> String {
        format!(
            "sleep {}; exec {}",
            delay.as_secs_f64(),
            self.invocation.shell_line("start", definition.name())
        )
    }
}

impl RestartScheduler for DetachedRestart {
    fn schedule(&self, definition: &Definition, delay: Duration) -> bool {
        let script = self.script(definition, delay);
        debug!(job = definition.name(), script = %shell_quote(&script), "launching restart helper");

        let spawned = Command::new(&self.screen_binary)
            .arg("-dm")
            .args(["sh", "-c", script.as_str()])
            .current_dir(&self.base_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .process_group(0)
            .spawn();

        match spawned {
            // Not awaited: `screen -dm` daemonizes and the client exits on
            // its own.
            Ok(_child) => true,
            Err(e) => {
                warn!(job = definition.name(), error = %e, "failed to spawn restart helper");
                false
            }
        }
    }
}
