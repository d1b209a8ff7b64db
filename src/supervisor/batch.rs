// src/supervisor/batch.rs

//! Applying one action to several jobs.
//!
//! Two selection modes with different failure semantics:
//!
//! - [`Selection::Named`]: every name is validated before anything runs; one
//!   unknown name aborts the whole batch with `JobNotFound`.
//! - [`Selection::All`]: every managed job is acted on, and each job's
//!   failure is recorded without affecting the others.

use std::fmt;

use tracing::{error, info};

use crate::errors::Result;
use crate::job::Definition;
use crate::registry::Registry;
use crate::session::SessionService;

use super::Supervisor;

/// Which jobs a batch targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Named(Vec<String>),
}

impl Selection {
    /// An empty list means "all managed jobs".
    pub fn from_names(names: Vec<String>) -> Self {
        if names.is_empty() {
            Selection::All
        } else {
            Selection::Named(names)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Stop,
    Kill,
    /// Graceful stop followed by start.
    Restart,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Start => "start",
            Action::Stop => "stop",
            Action::Kill => "kill",
            Action::Restart => "restart",
        };
        f.write_str(s)
    }
}

/// Result for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub job: String,
    pub ok: bool,
    /// Set when the action raised an error rather than reporting failure.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub action: Action,
    pub outcomes: Vec<BatchOutcome>,
}

impl BatchReport {
    pub fn success(&self) -> bool {
        self.outcomes.iter().all(|o| o.ok)
    }

    pub fn outcome(&self, job: &str) -> Option<&BatchOutcome> {
        self.outcomes.iter().find(|o| o.job == job)
    }
}

/// Resolve a selection against the registry.
///
/// Named selections are validated in full before returning, so callers never
/// act on a prefix of a list that contains an unknown name.
pub fn select<'r>(registry: &'r dyn Registry, selection: &Selection) -> Result<Vec<&'r Definition>> {
    match selection {
        Selection::All => Ok(registry.all()),
        Selection::Named(names) => names.iter().map(|name| registry.require(name)).collect(),
    }
}

/// Run `action` against every selected job and collect the outcomes.
pub async fn run_batch<S: SessionService>(
    supervisor: &Supervisor<S>,
    selection: &Selection,
    action: Action,
) -> Result<BatchReport> {
    let targets = select(supervisor.registry(), selection)?;

    let mut outcomes = Vec::with_capacity(targets.len());
    for definition in targets {
        let outcome = match apply(supervisor, action, definition).await {
            Ok(ok) => BatchOutcome {
                job: definition.name().to_string(),
                ok,
                error: None,
            },
            Err(e) => BatchOutcome {
                job: definition.name().to_string(),
                ok: false,
                error: Some(e.to_string()),
            },
        };

        if outcome.ok {
            info!(job = %outcome.job, %action, "action succeeded");
        } else {
            error!(job = %outcome.job, %action, error = ?outcome.error, "action failed");
        }
        outcomes.push(outcome);
    }

    Ok(BatchReport { action, outcomes })
}

async fn apply<S: SessionService>(
    supervisor: &Supervisor<S>,
    action: Action,
    definition: &Definition,
) -> Result<bool> {
    match action {
        Action::Start => supervisor.start(definition).await,
        Action::Stop => supervisor.stop(definition).await,
        Action::Kill => supervisor.kill(definition).await,
        Action::Restart => {
            let stopped = supervisor.gracefully_stop_default(definition).await?;
            let started = supervisor.start(definition).await?;
            Ok(stopped && started)
        }
    }
}
