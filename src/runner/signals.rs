// src/runner/signals.rs

//! OS signals the runner listens for and forwards to the job.
//!
//! SIGKILL and SIGSTOP cannot be caught and are not part of the set.

use nix::sys::signal::Signal;
use tokio::signal::unix::{signal, SignalKind};

/// Signals relayed to the job process.
pub const RELAYED_SIGNALS: [Signal; 5] = [
    Signal::SIGINT,
    Signal::SIGTERM,
    Signal::SIGQUIT,
    Signal::SIGABRT,
    Signal::SIGTSTP,
];

/// Listeners for every signal in [`RELAYED_SIGNALS`].
#[derive(Debug)]
pub struct RelaySignals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    quit: tokio::signal::unix::Signal,
    abort: tokio::signal::unix::Signal,
    terminal_stop: tokio::signal::unix::Signal,
}

impl RelaySignals {
    /// Install the handlers. Must be called from within a Tokio runtime.
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            quit: signal(SignalKind::quit())?,
            abort: signal(SignalKind::from_raw(Signal::SIGABRT as i32))?,
            terminal_stop: signal(SignalKind::from_raw(Signal::SIGTSTP as i32))?,
        })
    }

    /// Wait for the next signal from the set.
    pub async fn recv(&mut self) -> Signal {
        tokio::select! {
            Some(()) = self.interrupt.recv() => Signal::SIGINT,
            Some(()) = self.terminate.recv() => Signal::SIGTERM,
            Some(()) = self.quit.recv() => Signal::SIGQUIT,
            Some(()) = self.abort.recv() => Signal::SIGABRT,
            Some(()) = self.terminal_stop.recv() => Signal::SIGTSTP,
            // Only reachable once the runtime's signal driver is gone.
            else => std::future::pending::<Signal>().await,
        }
    }
}
