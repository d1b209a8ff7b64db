// src/events/mod.rs

//! Lifecycle events emitted by the in-session runner.
//!
//! Events are delivered through an [`EventBus`] to [`Listener`]s, one at a
//! time and in subscription order. Built-in listeners:
//!
//! - [`LogListener`]: writes every event to the tracing log.
//! - [`RestartPolicy`]: restarts jobs that ended on their own.

pub mod bus;
pub mod log;
pub mod restart;

use nix::sys::signal::Signal;

use crate::job::Definition;

pub use bus::{EventBus, Listener};
pub use log::LogListener;
pub use restart::{DetachedRestart, RestartPolicy, RestartScheduler, SignalLedger};

/// The spawned job process, as far as events are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChildHandle {
    /// `None` if the process never started.
    pub pid: Option<u32>,
}

/// Exit code reported when the real one is not available (spawn failure,
/// killed by a signal).
pub const UNKNOWN_EXIT_CODE: i32 = -1;

#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    /// The job process was spawned.
    Started {
        definition: Definition,
        child: ChildHandle,
    },
    /// Spawning or waiting on the job process failed.
    Failed {
        definition: Definition,
        child: ChildHandle,
        error: String,
    },
    /// The run is over. Emitted exactly once per run.
    Stopped {
        definition: Definition,
        child: ChildHandle,
        exit_code: i32,
    },
    /// The runner received an OS signal.
    SignalReceived {
        definition: Definition,
        child: ChildHandle,
        signal: Signal,
    },
}

impl LifecycleEvent {
    pub fn definition(&self) -> &Definition {
        match self {
            LifecycleEvent::Started { definition, .. }
            | LifecycleEvent::Failed { definition, .. }
            | LifecycleEvent::Stopped { definition, .. }
            | LifecycleEvent::SignalReceived { definition, .. } => definition,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LifecycleEvent::Started { .. } => "started",
            LifecycleEvent::Failed { .. } => "failed",
            LifecycleEvent::Stopped { .. } => "stopped",
            LifecycleEvent::SignalReceived { .. } => "signal_received",
        }
    }
}
