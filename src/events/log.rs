// src/events/log.rs

use tracing::{error, info, warn};

use super::{LifecycleEvent, Listener};

/// Logs every lifecycle event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogListener;

impl Listener for LogListener {
    fn on_event(&mut self, event: &LifecycleEvent) {
        match event {
            LifecycleEvent::Started { definition, child } => {
                info!(job = definition.name(), pid = ?child.pid, "job process started");
            }
            LifecycleEvent::Failed {
                definition,
                child,
                error,
            } => {
                error!(job = definition.name(), pid = ?child.pid, %error, "job process failed");
            }
            LifecycleEvent::Stopped {
                definition,
                child,
                exit_code,
            } => {
                info!(job = definition.name(), pid = ?child.pid, exit_code, "job process stopped");
            }
            LifecycleEvent::SignalReceived {
                definition,
                child,
                signal,
            } => {
                warn!(job = definition.name(), pid = ?child.pid, ?signal, "runner received signal");
            }
        }
    }
}
