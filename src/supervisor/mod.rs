// src/supervisor/mod.rs

//! Job lifecycle operations on top of a [`SessionService`].
//!
//! The supervisor keeps no state about what is running. Every question
//! ("is this job up?") is answered from a fresh session listing, and a job's
//! session is found by its [`Fingerprint`], so an edited definition never
//! aliases a session started from the old one.
//!
//! All operations accept a job name or a resolved [`Definition`]. Names are
//! resolved once at the start of each operation; an unknown name is the only
//! error these operations raise for a missing job. Everything the session
//! service can get wrong comes back as `Ok(false)`, including a listing that
//! could not be obtained: without one, nothing is known about the job and no
//! operation claims success.

pub mod batch;
pub mod logs;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use nix::sys::signal::Signal;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::errors::{JobscreenError, Result};
use crate::invocation::SelfInvocation;
use crate::job::{Definition, Fingerprint};
use crate::registry::Registry;
use crate::session::{find_session, SessionEntry, SessionService, SpawnRequest, INTERRUPT_KEYS};

pub use batch::{run_batch, select, Action, BatchOutcome, BatchReport, Selection};
pub use logs::LogLayout;

/// Environment variable naming the deployment environment; set for every
/// session and every job process.
pub const ENVIRONMENT_VAR: &str = "APP_ENV";

/// Either a job name or an already resolved definition.
#[derive(Debug, Clone, Copy)]
pub enum JobRef<'a> {
    Name(&'a str),
    Definition(&'a Definition),
}

impl<'a> From<&'a str> for JobRef<'a> {
    fn from(name: &'a str) -> Self {
        JobRef::Name(name)
    }
}

impl<'a> From<&'a String> for JobRef<'a> {
    fn from(name: &'a String) -> Self {
        JobRef::Name(name.as_str())
    }
}

impl<'a> From<&'a Definition> for JobRef<'a> {
    fn from(definition: &'a Definition) -> Self {
        JobRef::Definition(definition)
    }
}

/// Static inputs of the supervisor.
#[derive(Debug, Clone)]
pub struct SupervisorSettings {
    /// Working directory of every session; part of every fingerprint.
    pub base_dir: PathBuf,
    /// Value of [`ENVIRONMENT_VAR`].
    pub environment: String,
    /// How sessions launch the in-session runner.
    pub invocation: SelfInvocation,
    /// Default graceful stop timeout.
    pub stop_timeout: Duration,
    /// Default poll interval while waiting for a graceful stop.
    pub poll_interval: Duration,
}

/// What a fresh listing says about one session.
enum Presence {
    Running(SessionEntry),
    Absent,
    /// The listing could not be obtained.
    Unknown,
}

pub struct Supervisor<S: SessionService> {
    sessions: S,
    registry: Arc<dyn Registry>,
    settings: SupervisorSettings,
    logs: LogLayout,
}

impl<S: SessionService> std::fmt::Debug for Supervisor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("registry", &self.registry)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<S: SessionService> Supervisor<S> {
    pub fn new(sessions: S, registry: Arc<dyn Registry>, settings: SupervisorSettings) -> Self {
        let logs = LogLayout::new(&settings.base_dir);
        Self {
            sessions,
            registry,
            settings,
            logs,
        }
    }

    pub fn registry(&self) -> &dyn Registry {
        self.registry.as_ref()
    }

    pub fn settings(&self) -> &SupervisorSettings {
        &self.settings
    }

    pub fn base_dir(&self) -> &Path {
        &self.settings.base_dir
    }

    /// Turn a name or definition into a definition.
    pub fn resolve(&self, job: JobRef<'_>) -> Result<Definition> {
        match job {
            JobRef::Name(name) => self.registry.require(name).cloned(),
            JobRef::Definition(definition) => Ok(definition.clone()),
        }
    }

    pub fn fingerprint(&self, definition: &Definition) -> Fingerprint {
        Fingerprint::of(&self.settings.base_dir, definition)
    }

    pub fn log_path(&self, definition: &Definition) -> PathBuf {
        self.logs.path_for(&self.fingerprint(definition))
    }

    /// Start the job in a new detached session unless it is already running.
    ///
    /// Returns once the session exists; the job itself keeps running.
    pub async fn start<'a>(&self, job: impl Into<JobRef<'a>>) -> Result<bool> {
        let definition = self.resolve(job.into())?;
        let fingerprint = self.fingerprint(&definition);

        match self.lookup(&fingerprint).await {
            Presence::Running(_) => {
                debug!(job = definition.name(), %fingerprint, "already running; start is a no-op");
                return Ok(true);
            }
            Presence::Unknown => {
                warn!(job = definition.name(), "cannot tell whether the job runs; not starting");
                return Ok(false);
            }
            Presence::Absent => {}
        }

        let log_path = self.logs.prepare(&fingerprint).await?;

        let request = SpawnRequest {
            session: fingerprint.to_string(),
            argv: self.settings.invocation.argv("run", definition.name()),
            cwd: self.settings.base_dir.clone(),
            env: vec![(
                ENVIRONMENT_VAR.to_string(),
                self.settings.environment.clone(),
            )],
        };

        info!(
            job = definition.name(),
            %fingerprint,
            command = %definition.command().tokens().join(" "),
            log = ?log_path,
            environment = %self.settings.environment,
            "starting job session"
        );

        let created = self.sessions.create_detached(&request).await;
        if created {
            info!(job = definition.name(), %fingerprint, "job session started");
        } else {
            warn!(job = definition.name(), %fingerprint, "failed to create job session");
        }
        Ok(created)
    }

    /// Ask the job to stop by typing Ctrl-C into its terminal.
    ///
    /// `true` means the keystroke was delivered, not that the job exited.
    pub async fn stop<'a>(&self, job: impl Into<JobRef<'a>>) -> Result<bool> {
        let definition = self.resolve(job.into())?;
        let fingerprint = self.fingerprint(&definition);

        match self.lookup(&fingerprint).await {
            Presence::Running(_) => {}
            Presence::Absent => {
                debug!(job = definition.name(), "not running; stop is a no-op");
                return Ok(true);
            }
            Presence::Unknown => return Ok(false),
        }

        info!(job = definition.name(), %fingerprint, "sending interrupt to job session");
        Ok(self
            .sessions
            .send_keys(fingerprint.as_str(), INTERRUPT_KEYS)
            .await)
    }

    /// Stop, wait up to `timeout` for the session to go away (checking every
    /// `poll_interval`), then kill whatever is left.
    pub async fn gracefully_stop<'a>(
        &self,
        job: impl Into<JobRef<'a>>,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<bool> {
        let definition = self.resolve(job.into())?;
        let fingerprint = self.fingerprint(&definition);

        match self.lookup(&fingerprint).await {
            Presence::Running(_) => {}
            Presence::Absent => return Ok(true),
            Presence::Unknown => return Ok(false),
        }

        if self.stop(&definition).await? {
            // No deadline when `timeout` does not fit after now.
            let deadline = Instant::now().checked_add(timeout);
            loop {
                if let Presence::Absent = self.lookup(&fingerprint).await {
                    info!(job = definition.name(), "job stopped gracefully");
                    return Ok(true);
                }
                if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                    break;
                }
                sleep(poll_interval).await;
            }
            warn!(
                job = definition.name(),
                ?timeout,
                "job did not stop in time; escalating to kill"
            );
        } else {
            warn!(job = definition.name(), "interrupt could not be delivered; escalating to kill");
        }

        Ok(self.kill_session(&definition, &fingerprint).await)
    }

    /// [`Supervisor::gracefully_stop`] with the configured timings.
    pub async fn gracefully_stop_default<'a>(&self, job: impl Into<JobRef<'a>>) -> Result<bool> {
        self.gracefully_stop(job, self.settings.stop_timeout, self.settings.poll_interval)
            .await
    }

    /// Tear the session down, escalating to SIGKILL and a wipe if the
    /// multiplexer alone does not get rid of it.
    pub async fn kill<'a>(&self, job: impl Into<JobRef<'a>>) -> Result<bool> {
        let definition = self.resolve(job.into())?;
        let fingerprint = self.fingerprint(&definition);

        match self.lookup(&fingerprint).await {
            Presence::Running(_) => {}
            Presence::Absent => {
                debug!(job = definition.name(), "not running; kill is a no-op");
                return Ok(true);
            }
            Presence::Unknown => return Ok(false),
        }

        Ok(self.kill_session(&definition, &fingerprint).await)
    }

    /// Live check against the session listing.
    pub async fn is_running<'a>(&self, job: impl Into<JobRef<'a>>) -> Result<bool> {
        let definition = self.resolve(job.into())?;
        let fingerprint = self.fingerprint(&definition);
        Ok(matches!(self.lookup(&fingerprint).await, Presence::Running(_)))
    }

    /// Current log contents, `None` when there is nothing logged yet.
    pub async fn get_logs<'a>(&self, job: impl Into<JobRef<'a>>) -> Result<Option<String>> {
        let definition = self.resolve(job.into())?;
        let fingerprint = self.fingerprint(&definition);
        Ok(self.logs.read(&fingerprint).await?)
    }

    /// Hand the caller's terminal to the job session until it detaches.
    pub async fn attach<'a>(&self, job: impl Into<JobRef<'a>>) -> Result<bool> {
        let definition = self.resolve(job.into())?;

        if !std::io::stdin().is_terminal() {
            return Err(JobscreenError::NotInteractive);
        }

        let fingerprint = self.fingerprint(&definition);
        if !matches!(self.lookup(&fingerprint).await, Presence::Running(_)) {
            warn!(job = definition.name(), "cannot attach: job is not running");
            return Ok(false);
        }

        Ok(self.sessions.attach(fingerprint.as_str()).await)
    }

    async fn lookup(&self, fingerprint: &Fingerprint) -> Presence {
        let Some(listing) = self.sessions.list_sessions().await else {
            warn!(%fingerprint, "session listing unavailable");
            return Presence::Unknown;
        };
        match find_session(&listing, fingerprint.as_str()) {
            Some(entry) => Presence::Running(entry),
            None => Presence::Absent,
        }
    }

    async fn kill_session(&self, definition: &Definition, fingerprint: &Fingerprint) -> bool {
        let terminated = self.sessions.terminate_session(fingerprint.as_str()).await;

        let entry = match self.lookup(fingerprint).await {
            Presence::Running(entry) => entry,
            Presence::Absent => {
                info!(job = definition.name(), "job session killed");
                return true;
            }
            Presence::Unknown => {
                warn!(job = definition.name(), terminated, "cannot confirm the session is gone");
                return false;
            }
        };

        warn!(
            job = definition.name(),
            pid = entry.pid,
            terminated,
            "session survived terminate request; sending SIGKILL"
        );
        let signalled = self.sessions.send_signal(&entry, Signal::SIGKILL).await;
        let wiped = self.sessions.wipe().await;

        if !(signalled && wiped) {
            warn!(job = definition.name(), signalled, wiped, "kill escalation incomplete");
        }
        signalled && wiped
    }
}
