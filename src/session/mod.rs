// src/session/mod.rs

//! Pluggable session service abstraction.
//!
//! The supervisor never manages job processes itself. It talks to a
//! [`SessionService`], which runs commands in named, detached sessions that
//! outlive the caller and can later be listed, signalled and re-attached.
//!
//! - [`ScreenSessions`] is the production implementation on top of GNU
//!   `screen`.
//! - Tests provide their own implementation that keeps sessions in memory.
//!
//! Every method reports an expected outcome (`bool`, optional listing text)
//! rather than an error: a `screen` call that fails or runs past its timeout
//! is a normal, reportable result.

pub mod screen;

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::LazyLock;

use nix::sys::signal::Signal;
use regex::Regex;

pub use screen::ScreenSessions;

/// Boxed future returned by [`SessionService`] methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Byte sequence a terminal sends for Ctrl-C.
pub const INTERRUPT_KEYS: &str = "\u{3}";

/// Request to create a detached session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    /// Session name (a job fingerprint, or a helper name).
    pub session: String,
    /// Program and arguments to run inside the session.
    pub argv: Vec<String>,
    /// Working directory of the session.
    pub cwd: PathBuf,
    /// Extra environment variables on top of the inherited environment.
    pub env: Vec<(String, String)>,
}

/// One row of a session listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEntry {
    /// OS pid of the session's leader process.
    pub pid: u32,
    /// Session name.
    pub name: String,
}

/// Control surface of a terminal multiplexer.
pub trait SessionService: Send + Sync {
    /// Start `request.argv` in a new detached session named `request.session`.
    fn create_detached<'a>(&'a self, request: &'a SpawnRequest) -> BoxFuture<'a, bool>;

    /// Raw listing text of all active sessions; `None` when the listing
    /// itself could not be obtained.
    fn list_sessions(&self) -> BoxFuture<'_, Option<String>>;

    /// Type `keys` into the session's terminal.
    fn send_keys<'a>(&'a self, session: &'a str, keys: &'a str) -> BoxFuture<'a, bool>;

    /// Deliver an OS signal to the session's leader process.
    fn send_signal<'a>(&'a self, session: &'a SessionEntry, signal: Signal) -> BoxFuture<'a, bool>;

    /// Ask the multiplexer to tear the session down.
    fn terminate_session<'a>(&'a self, session: &'a str) -> BoxFuture<'a, bool>;

    /// Remove records of sessions whose processes are gone.
    fn wipe(&self) -> BoxFuture<'_, bool>;

    /// Connect the caller's terminal to the session; resolves on detach.
    fn attach<'a>(&'a self, session: &'a str) -> BoxFuture<'a, bool>;
}

static LISTING_ROW: LazyLock<Regex> = LazyLock::new(|| {
    // e.g. "\t12345.8f3a...\t(Detached)"
    Regex::new(r"^\s*(\d+)\.(\S+)").expect("valid session listing regex")
});

/// Parse `screen -ls` style output into entries.
///
/// Header and footer lines ("There are screens on:", "2 Sockets in ...")
/// do not match the `<pid>.<name>` shape and are skipped.
pub fn parse_listing(listing: &str) -> Vec<SessionEntry> {
    listing
        .lines()
        .filter_map(|line| {
            let caps = LISTING_ROW.captures(line)?;
            let pid = caps[1].parse().ok()?;
            Some(SessionEntry {
                pid,
                name: caps[2].to_string(),
            })
        })
        .collect()
}

/// Find the entry whose name is exactly `session`.
pub fn find_session(listing: &str, session: &str) -> Option<SessionEntry> {
    parse_listing(listing)
        .into_iter()
        .find(|entry| entry.name == session)
}
