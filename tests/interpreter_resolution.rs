// tests/interpreter_resolution.rs
//
// Rewrites PATH for the whole process, so it lives in its own test binary
// with a single test.

mod common;
use crate::common::RecordingListener;

use std::error::Error;
use std::fs;
use std::os::unix::fs::PermissionsExt;

use tempfile::TempDir;

use jobscreen::errors::JobscreenError;
use jobscreen::events::EventBus;
use jobscreen::job::{find_in_path, CommandSpec, Definition, Interpreter};
use jobscreen::runner::{Runner, RunnerSettings};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn test_placeholders_resolve_against_path() -> TestResult {
    let bin = TempDir::new()?;

    let python3 = bin.path().join("python3");
    fs::write(&python3, "#!/bin/sh\necho fake python \"$@\"\n")?;
    fs::set_permissions(&python3, fs::Permissions::from_mode(0o755))?;

    // Present but not executable: must be skipped.
    fs::write(bin.path().join("node"), "not a program")?;

    // SAFETY: this test binary runs a single test, nothing else reads the
    // environment concurrently.
    unsafe { std::env::set_var("PATH", bin.path()) };

    assert_eq!(find_in_path("python3"), Some(python3.clone()));
    assert_eq!(find_in_path("node"), None);
    assert_eq!(Interpreter::Python.locate()?, python3);
    assert!(matches!(
        Interpreter::Node.locate(),
        Err(JobscreenError::InterpreterNotFound(name)) if name == "node"
    ));

    let spec = CommandSpec::parse(vec!["python".into(), "worker.py".into()])?;
    assert_eq!(
        spec.resolve()?,
        vec![python3.to_string_lossy().into_owned(), "worker.py".to_string()]
    );

    // An unresolvable placeholder is fatal before anything is spawned.
    let work = TempDir::new()?;
    let listener = RecordingListener::new();
    let definition = Definition::new("web", vec!["php".into(), "-S".into(), "0:8080".into()], false)?;
    let result = Runner::new(
        definition,
        RunnerSettings {
            base_dir: work.path().to_path_buf(),
            environment: "test".to_string(),
            log_path: work.path().join("web.log"),
        },
        EventBus::new().with(listener.clone()),
    )
    .run()
    .await;

    assert!(matches!(result, Err(JobscreenError::InterpreterNotFound(name)) if name == "php"));
    assert!(listener.events().is_empty());
    Ok(())
}
