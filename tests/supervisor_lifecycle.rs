// tests/supervisor_lifecycle.rs

mod common;
use crate::common::builders::{definition, supervisor, FAKE_PROGRAM};
use crate::common::{init_tracing, with_timeout, FakeSessions, SessionCall};

use std::error::Error;
use std::io::IsTerminal;
use std::time::{Duration, Instant};

use nix::sys::signal::Signal;
use tempfile::TempDir;

use jobscreen::errors::JobscreenError;
use jobscreen::session::{ScreenSessions, INTERRUPT_KEYS};
use jobscreen::supervisor::ENVIRONMENT_VAR;

type TestResult = Result<(), Box<dyn Error>>;

fn create_calls(fake: &FakeSessions) -> usize {
    fake.calls()
        .iter()
        .filter(|c| matches!(c, SessionCall::Create(_)))
        .count()
}

#[tokio::test]
async fn test_start_creates_fingerprinted_session() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let fake = FakeSessions::new();
    let sup = supervisor(fake.clone(), vec![definition("worker", "sleep 60", false)], dir.path());

    assert!(sup.start("worker").await?);

    let def = sup.resolve("worker".into())?;
    let fp = sup.fingerprint(&def);
    assert_eq!(fake.session_names(), vec![fp.to_string()]);

    let requests = fake.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.session, fp.as_str());
    assert_eq!(request.cwd, dir.path());
    assert_eq!(
        request.env,
        vec![(ENVIRONMENT_VAR.to_string(), "test".to_string())]
    );
    assert_eq!(request.argv[0], FAKE_PROGRAM);
    assert_eq!(&request.argv[request.argv.len() - 2..], ["run", "worker"]);

    let log_path = sup.log_path(&def);
    assert_eq!(log_path, dir.path().join("logs").join(format!("{fp}.log")));
    assert!(log_path.exists());
    assert!(sup.is_running("worker").await?);
    Ok(())
}

#[tokio::test]
async fn test_start_is_idempotent() -> TestResult {
    let dir = TempDir::new()?;
    let fake = FakeSessions::new();
    let sup = supervisor(fake.clone(), vec![definition("worker", "sleep 60", false)], dir.path());

    assert!(sup.start("worker").await?);
    assert!(sup.start("worker").await?);

    assert_eq!(create_calls(&fake), 1);
    assert_eq!(fake.session_names().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_start_truncates_previous_log() -> TestResult {
    let dir = TempDir::new()?;
    let fake = FakeSessions::new();
    let sup = supervisor(fake, vec![definition("worker", "sleep 60", false)], dir.path());

    let def = sup.resolve("worker".into())?;
    let log_path = sup.log_path(&def);
    std::fs::create_dir_all(log_path.parent().unwrap())?;
    std::fs::write(&log_path, "output from the previous run\n")?;

    assert_eq!(
        sup.get_logs("worker").await?.as_deref(),
        Some("output from the previous run\n")
    );

    sup.start("worker").await?;
    assert_eq!(sup.get_logs("worker").await?, None);
    Ok(())
}

#[tokio::test]
async fn test_failed_create_is_reported_not_raised() -> TestResult {
    let dir = TempDir::new()?;
    let fake = FakeSessions::new();
    fake.set_fail_create(true);
    let sup = supervisor(fake.clone(), vec![definition("worker", "sleep 60", false)], dir.path());

    assert!(!sup.start("worker").await?);
    assert!(!sup.is_running("worker").await?);
    Ok(())
}

#[tokio::test]
async fn test_unknown_job_is_an_error_everywhere() -> TestResult {
    let dir = TempDir::new()?;
    let sup = supervisor(FakeSessions::new(), vec![definition("worker", "sleep 60", false)], dir.path());

    assert!(matches!(sup.start("nope").await, Err(JobscreenError::JobNotFound(_))));
    assert!(matches!(sup.stop("nope").await, Err(JobscreenError::JobNotFound(_))));
    assert!(matches!(sup.kill("nope").await, Err(JobscreenError::JobNotFound(_))));
    assert!(matches!(sup.is_running("nope").await, Err(JobscreenError::JobNotFound(_))));
    assert!(matches!(sup.get_logs("nope").await, Err(JobscreenError::JobNotFound(_))));
    assert!(matches!(
        sup.gracefully_stop_default("nope").await,
        Err(JobscreenError::JobNotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_stop_when_not_running_is_a_no_op() -> TestResult {
    let dir = TempDir::new()?;
    let fake = FakeSessions::new();
    let sup = supervisor(fake.clone(), vec![definition("worker", "sleep 60", false)], dir.path());

    assert!(sup.stop("worker").await?);
    assert!(sup.kill("worker").await?);
    assert!(sup.gracefully_stop_default("worker").await?);

    assert!(fake.actions().is_empty(), "unexpected calls: {:?}", fake.actions());
    Ok(())
}

#[tokio::test]
async fn test_stop_sends_interrupt() -> TestResult {
    let dir = TempDir::new()?;
    let fake = FakeSessions::new();
    let sup = supervisor(fake.clone(), vec![definition("worker", "sleep 60", false)], dir.path());
    sup.start("worker").await?;
    let fp = sup.fingerprint(&sup.resolve("worker".into())?);

    assert!(sup.stop("worker").await?);

    assert!(fake
        .actions()
        .contains(&SessionCall::SendKeys(fp.to_string(), INTERRUPT_KEYS.to_string())));
    assert!(!sup.is_running("worker").await?);
    Ok(())
}

#[tokio::test]
async fn test_graceful_stop_without_escalation() -> TestResult {
    let dir = TempDir::new()?;
    let fake = FakeSessions::new();
    let sup = supervisor(fake.clone(), vec![definition("worker", "sleep 60", false)], dir.path());
    sup.start("worker").await?;

    let stopped = with_timeout(sup.gracefully_stop(
        "worker",
        Duration::from_secs(1),
        Duration::from_millis(10),
    ))
    .await?;

    assert!(stopped);
    assert!(!fake
        .actions()
        .iter()
        .any(|c| matches!(c, SessionCall::Terminate(_))));
    Ok(())
}

#[tokio::test]
async fn test_graceful_stop_escalates_after_timeout() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let fake = FakeSessions::new();
    fake.set_ignore_interrupt(true);
    let sup = supervisor(fake.clone(), vec![definition("worker", "sleep 60", false)], dir.path());
    sup.start("worker").await?;
    let fp = sup.fingerprint(&sup.resolve("worker".into())?);

    let timeout = Duration::from_millis(150);
    let begun = Instant::now();
    let stopped = with_timeout(sup.gracefully_stop("worker", timeout, Duration::from_millis(10))).await?;

    assert!(stopped);
    assert!(begun.elapsed() >= timeout);
    assert!(fake.actions().contains(&SessionCall::Terminate(fp.to_string())));
    assert!(!fake.is_alive(fp.as_str()));
    Ok(())
}

#[tokio::test]
async fn test_graceful_stop_with_unbounded_timeout_waits_for_exit() -> TestResult {
    let dir = TempDir::new()?;
    let fake = FakeSessions::new();
    fake.set_ignore_interrupt(true);
    let sup = supervisor(fake.clone(), vec![definition("worker", "sleep 60", false)], dir.path());
    sup.start("worker").await?;
    let fp = sup.fingerprint(&sup.resolve("worker".into())?);

    // The job takes a while to react to Ctrl-C, then exits on its own.
    let exiting = fake.clone();
    let session = fp.to_string();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        exiting.end(&session);
    });

    let stopped = with_timeout(sup.gracefully_stop(
        "worker",
        Duration::MAX,
        Duration::from_millis(5),
    ))
    .await?;

    assert!(stopped);
    assert!(!fake
        .actions()
        .iter()
        .any(|c| matches!(c, SessionCall::Terminate(_))));
    Ok(())
}

#[tokio::test]
async fn test_graceful_stop_kills_when_interrupt_cannot_be_sent() -> TestResult {
    let dir = TempDir::new()?;
    let fake = FakeSessions::new();
    let sup = supervisor(fake.clone(), vec![definition("worker", "sleep 60", false)], dir.path());
    sup.start("worker").await?;
    let fp = sup.fingerprint(&sup.resolve("worker".into())?);
    fake.set_fail_send_keys(true);

    let begun = Instant::now();
    let stopped = with_timeout(sup.gracefully_stop(
        "worker",
        Duration::from_secs(3),
        Duration::from_millis(10),
    ))
    .await?;

    assert!(stopped);
    // No waiting for a stop that was never requested.
    assert!(begun.elapsed() < Duration::from_secs(3));
    assert!(fake.actions().contains(&SessionCall::Terminate(fp.to_string())));
    Ok(())
}

#[tokio::test]
async fn test_kill_escalates_to_sigkill_and_wipe() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let fake = FakeSessions::new();
    fake.set_ignore_quit(true);
    let sup = supervisor(fake.clone(), vec![definition("worker", "sleep 60", false)], dir.path());
    sup.start("worker").await?;
    let fp = sup.fingerprint(&sup.resolve("worker".into())?);

    assert!(sup.kill("worker").await?);

    let actions = fake.actions();
    let terminate = actions
        .iter()
        .position(|c| *c == SessionCall::Terminate(fp.to_string()))
        .expect("terminate requested");
    let signal = actions
        .iter()
        .position(|c| matches!(c, SessionCall::Signal(_, Signal::SIGKILL)))
        .expect("SIGKILL sent");
    let wipe = actions
        .iter()
        .position(|c| *c == SessionCall::Wipe)
        .expect("wipe requested");
    assert!(terminate < signal && signal < wipe);
    assert!(!sup.is_running("worker").await?);
    Ok(())
}

#[tokio::test]
async fn test_kill_reports_failed_escalation() -> TestResult {
    let dir = TempDir::new()?;
    let fake = FakeSessions::new();
    fake.set_ignore_quit(true);
    fake.set_fail_signal(true);
    let sup = supervisor(fake.clone(), vec![definition("worker", "sleep 60", false)], dir.path());
    sup.start("worker").await?;

    assert!(!sup.kill("worker").await?);
    assert!(sup.is_running("worker").await?);
    Ok(())
}

#[tokio::test]
async fn test_unavailable_listing_is_never_success() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let fake = FakeSessions::new();
    let sup = supervisor(
        fake.clone(),
        vec![
            definition("worker", "sleep 60", false),
            definition("idle", "sleep 61", false),
        ],
        dir.path(),
    );
    sup.start("worker").await?;
    fake.set_fail_list(true);
    let before = fake.actions();

    assert!(!sup.start("idle").await?);
    assert!(!sup.stop("worker").await?);
    assert!(!sup.kill("worker").await?);
    assert!(!with_timeout(sup.gracefully_stop_default("worker")).await?);
    assert!(!sup.is_running("worker").await?);

    // Nothing was created, typed or signalled on a blind listing.
    assert_eq!(fake.actions(), before);
    let fp = sup.fingerprint(&sup.resolve("worker".into())?);
    assert!(fake.is_alive(fp.as_str()));
    Ok(())
}

#[tokio::test]
async fn test_missing_screen_binary_fails_every_operation() -> TestResult {
    let dir = TempDir::new()?;
    let sessions = ScreenSessions::new("/nonexistent/screen-binary", Duration::from_secs(1));
    let sup = supervisor(sessions, vec![definition("worker", "sleep 60", false)], dir.path());

    assert!(!sup.start("worker").await?);
    assert!(!sup.stop("worker").await?);
    assert!(!sup.kill("worker").await?);
    assert!(!with_timeout(sup.gracefully_stop_default("worker")).await?);
    assert!(!sup.is_running("worker").await?);
    Ok(())
}

#[tokio::test]
async fn test_kill_without_escalation_skips_signal() -> TestResult {
    let dir = TempDir::new()?;
    let fake = FakeSessions::new();
    let sup = supervisor(fake.clone(), vec![definition("worker", "sleep 60", false)], dir.path());
    sup.start("worker").await?;

    assert!(sup.kill("worker").await?);
    assert!(!fake
        .actions()
        .iter()
        .any(|c| matches!(c, SessionCall::Signal(..) | SessionCall::Wipe)));
    Ok(())
}

#[tokio::test]
async fn test_session_lookup_requires_exact_name() -> TestResult {
    let dir = TempDir::new()?;
    let fake = FakeSessions::new();
    let sup = supervisor(fake.clone(), vec![definition("worker", "sleep 60", false)], dir.path());
    let fp = sup.fingerprint(&sup.resolve("worker".into())?);

    fake.seed(&fp.as_str()[..12]);
    fake.seed(&format!("{fp}-old"));

    assert!(!sup.is_running("worker").await?);
    assert!(sup.start("worker").await?);
    assert!(sup.is_running("worker").await?);
    Ok(())
}

#[tokio::test]
async fn test_changed_command_is_a_different_job() -> TestResult {
    let dir = TempDir::new()?;
    let fake = FakeSessions::new();

    let old = supervisor(fake.clone(), vec![definition("worker", "sleep 60", false)], dir.path());
    old.start("worker").await?;

    let new = supervisor(fake.clone(), vec![definition("worker", "sleep 120", false)], dir.path());
    assert!(!new.is_running("worker").await?);
    assert!(new.start("worker").await?);

    assert_eq!(fake.session_names().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_same_job_under_two_base_dirs_does_not_collide() -> TestResult {
    let first = TempDir::new()?;
    let second = TempDir::new()?;
    let fake = FakeSessions::new();

    let a = supervisor(fake.clone(), vec![definition("worker", "sleep 60", false)], first.path());
    let b = supervisor(fake.clone(), vec![definition("worker", "sleep 60", false)], second.path());

    a.start("worker").await?;
    assert!(!b.is_running("worker").await?);
    b.start("worker").await?;

    assert_eq!(fake.session_names().len(), 2);
    a.kill("worker").await?;
    assert!(b.is_running("worker").await?);
    Ok(())
}

#[tokio::test]
async fn test_attach_needs_a_terminal() -> TestResult {
    if std::io::stdin().is_terminal() {
        return Ok(());
    }
    let dir = TempDir::new()?;
    let fake = FakeSessions::new();
    let sup = supervisor(fake.clone(), vec![definition("worker", "sleep 60", false)], dir.path());
    sup.start("worker").await?;

    assert!(matches!(sup.attach("worker").await, Err(JobscreenError::NotInteractive)));
    assert!(!fake.actions().iter().any(|c| matches!(c, SessionCall::Attach(_))));
    Ok(())
}
