// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod events;
pub mod invocation;
pub mod job;
pub mod logging;
pub mod registry;
pub mod runner;
pub mod session;
pub mod supervisor;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::{CliArgs, JobCommand};
use crate::config::{include_paths, load_and_validate, load_jobs_file, resolve_base_dir, ConfigFile};
use crate::events::{DetachedRestart, EventBus, LogListener, RestartPolicy, SignalLedger};
use crate::invocation::SelfInvocation;
use crate::job::Fingerprint;
use crate::registry::{ChainRegistry, Registry, StaticRegistry};
use crate::runner::{Runner, RunnerSettings};
use crate::session::{ScreenSessions, SessionService};
use crate::supervisor::{
    run_batch, select, Action, BatchReport, LogLayout, Selection, Supervisor, SupervisorSettings,
};

/// Everything derived from the config file that the commands need.
#[derive(Debug)]
pub struct App {
    pub config: ConfigFile,
    pub base_dir: PathBuf,
    pub registry: Arc<ChainRegistry>,
    pub invocation: SelfInvocation,
}

impl App {
    /// Load and validate `config_path` and build the registry from it and
    /// every file it includes.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config = load_and_validate(config_path)?;
        let base_dir = resolve_base_dir(config_path, &config);

        let mut members: Vec<Box<dyn Registry>> = vec![Box::new(StaticRegistry::try_from(&config)?)];
        for path in include_paths(config_path, &config) {
            let jobs = load_jobs_file(&path)
                .with_context(|| format!("loading included jobs from {}", path.display()))?;
            members.push(Box::new(StaticRegistry::try_from(&jobs)?));
        }
        let registry = Arc::new(ChainRegistry::new(members)?);
        let invocation = SelfInvocation::current(config_path)?;

        debug!(base_dir = ?base_dir, jobs = registry.all().len(), "loaded configuration");

        Ok(Self {
            config,
            base_dir,
            registry,
            invocation,
        })
    }

    pub fn supervisor_settings(&self) -> SupervisorSettings {
        SupervisorSettings {
            base_dir: self.base_dir.clone(),
            environment: self.config.config.environment.clone(),
            invocation: self.invocation.clone(),
            stop_timeout: self.config.timings.stop_timeout,
            poll_interval: self.config.timings.poll_interval,
        }
    }

    pub fn supervisor(&self) -> Supervisor<ScreenSessions> {
        let sessions = ScreenSessions::new(
            &self.config.config.screen_binary,
            self.config.timings.spawn_timeout,
        );
        Supervisor::new(sessions, self.registry.clone(), self.supervisor_settings())
    }
}

/// High-level entry point used by `main.rs`.
///
/// Returns the process exit code: 0 when every requested operation
/// succeeded, non-zero otherwise. Unknown job names and configuration
/// problems are returned as errors.
pub async fn run(args: CliArgs) -> Result<i32> {
    let app = App::load(&args.config)?;

    match args.command {
        JobCommand::Run { name } => run_job(&app, &name).await,
        JobCommand::Start { names } => batch(&app, names, Action::Start).await,
        JobCommand::Stop { names } => batch(&app, names, Action::Stop).await,
        JobCommand::Kill { names } => batch(&app, names, Action::Kill).await,
        JobCommand::Restart { names } => batch(&app, names, Action::Restart).await,
        JobCommand::Status { names } => {
            status(&app.supervisor(), &Selection::from_names(names)).await
        }
        JobCommand::Log { names } => logs(&app.supervisor(), &Selection::from_names(names)).await,
        JobCommand::Attach { name } => {
            let attached = app.supervisor().attach(&name).await?;
            Ok(exit_code(attached))
        }
    }
}

async fn batch(app: &App, names: Vec<String>, action: Action) -> Result<i32> {
    let supervisor = app.supervisor();
    let report = run_batch(&supervisor, &Selection::from_names(names), action).await?;
    print_report(&report);
    Ok(exit_code(report.success()))
}

fn print_report(report: &BatchReport) {
    for outcome in &report.outcomes {
        match (&outcome.error, outcome.ok) {
            (_, true) => println!("{}: {} ok", outcome.job, report.action),
            (Some(error), false) => println!("{}: {} failed ({error})", outcome.job, report.action),
            (None, false) => println!("{}: {} failed", outcome.job, report.action),
        }
    }
}

/// Print `<name>: running|not running` for every selected job.
pub async fn status<S: SessionService>(supervisor: &Supervisor<S>, selection: &Selection) -> Result<i32> {
    for definition in select(supervisor.registry(), selection)? {
        let running = supervisor.is_running(definition).await?;
        println!(
            "{}: {}",
            definition.name(),
            if running { "running" } else { "not running" }
        );
    }
    Ok(0)
}

/// Print the log of every selected job.
pub async fn logs<S: SessionService>(supervisor: &Supervisor<S>, selection: &Selection) -> Result<i32> {
    for definition in select(supervisor.registry(), selection)? {
        match supervisor.get_logs(definition).await? {
            Some(contents) => {
                println!("==> {} <==", definition.name());
                print!("{contents}");
                if !contents.ends_with('\n') {
                    println!();
                }
            }
            None => println!("==> {} <== (empty)", definition.name()),
        }
    }
    Ok(0)
}

/// In-session entrypoint: run the job in the foreground with restart
/// handling wired in.
async fn run_job(app: &App, name: &str) -> Result<i32> {
    let definition = app.registry.require(name)?.clone();
    let fingerprint = Fingerprint::of(&app.base_dir, &definition);

    let layout = LogLayout::new(&app.base_dir);
    tokio::fs::create_dir_all(layout.dir()).await?;

    let scheduler = DetachedRestart::new(
        &app.config.config.screen_binary,
        app.invocation.clone(),
        app.base_dir.clone(),
    );
    let bus = EventBus::new().with(LogListener).with(RestartPolicy::new(
        SignalLedger::new(),
        Box::new(scheduler),
        app.config.timings.restart_delay,
    ));

    let settings = RunnerSettings {
        base_dir: app.base_dir.clone(),
        environment: app.config.config.environment.clone(),
        log_path: layout.path_for(&fingerprint),
    };

    info!(job = name, %fingerprint, "runner starting");
    let code = Runner::new(definition, settings, bus).run().await?;
    Ok(process_exit_code(code))
}

fn exit_code(success: bool) -> i32 {
    if success { 0 } else { 1 }
}

/// Map a job exit code onto something a process can exit with.
pub fn process_exit_code(code: i32) -> i32 {
    if (0..=255).contains(&code) { code } else { 1 }
}
