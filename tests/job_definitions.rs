// tests/job_definitions.rs

use std::path::Path;

use proptest::prelude::*;

use jobscreen::errors::JobscreenError;
use jobscreen::job::{fingerprint, CommandSpec, Definition, Fingerprint, Interpreter};

fn tokens(cmd: &[&str]) -> Vec<String> {
    cmd.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_literal_command_is_passed_through() {
    let spec = CommandSpec::parse(tokens(&["/usr/bin/env", "sleep", "1"])).unwrap();

    assert_eq!(spec, CommandSpec::Literal(tokens(&["/usr/bin/env", "sleep", "1"])));
    assert_eq!(spec.resolve().unwrap(), tokens(&["/usr/bin/env", "sleep", "1"]));
}

#[test]
fn test_placeholder_becomes_runtime_interpreter() {
    let spec = CommandSpec::parse(tokens(&["php", "bin/console", "app:sync"])).unwrap();

    match &spec {
        CommandSpec::RuntimeInterpreter { interpreter, args } => {
            assert_eq!(*interpreter, Interpreter::Php);
            assert_eq!(args, &tokens(&["bin/console", "app:sync"]));
        }
        other => panic!("Expected RuntimeInterpreter, got {:?}", other),
    }
    // The configured tokens survive classification unchanged.
    assert_eq!(spec.tokens(), tokens(&["php", "bin/console", "app:sync"]));
}

#[test]
fn test_placeholder_only_applies_to_first_token() {
    let spec = CommandSpec::parse(tokens(&["env", "php", "-v"])).unwrap();
    assert!(matches!(spec, CommandSpec::Literal(_)));
}

#[test]
fn test_absolute_interpreter_path_is_literal() {
    let spec = CommandSpec::parse(tokens(&["/usr/bin/php", "-v"])).unwrap();
    assert!(matches!(spec, CommandSpec::Literal(_)));
}

#[test]
fn test_every_placeholder_round_trips() {
    for interpreter in [
        Interpreter::Php,
        Interpreter::Python,
        Interpreter::Node,
        Interpreter::Ruby,
    ] {
        assert_eq!(
            Interpreter::from_placeholder(interpreter.placeholder()),
            Some(interpreter)
        );
    }
    assert_eq!(Interpreter::from_placeholder("perl"), None);
}

#[test]
fn test_empty_command_is_rejected() {
    let err = Definition::new("job", Vec::new(), false).unwrap_err();
    assert!(matches!(err, JobscreenError::ConfigError(msg) if msg.contains("job 'job'")));
}

#[test]
fn test_empty_name_is_rejected() {
    let err = Definition::new("", tokens(&["true"]), false).unwrap_err();
    assert!(matches!(err, JobscreenError::ConfigError(_)));
}

#[test]
fn test_definition_display_shows_configured_command() {
    let def = Definition::new("worker", tokens(&["python", "worker.py"]), true).unwrap();
    assert_eq!(def.to_string(), "worker (python worker.py)");
    assert!(def.restart_enabled());
}

#[test]
fn test_fingerprint_is_stable_hex() {
    let def = Definition::new("worker", tokens(&["sleep", "60"]), false).unwrap();
    let base = Path::new("/srv/app");

    let a = Fingerprint::of(base, &def);
    let b = Fingerprint::of(base, &def);

    assert_eq!(a, b);
    assert_eq!(a.as_str().len(), 64);
    assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn test_fingerprint_ignores_restart_flag() {
    let base = Path::new("/srv/app");
    let with = Definition::new("worker", tokens(&["sleep", "60"]), true).unwrap();
    let without = Definition::new("worker", tokens(&["sleep", "60"]), false).unwrap();

    assert_eq!(Fingerprint::of(base, &with), Fingerprint::of(base, &without));
}

#[test]
fn test_fingerprint_separates_token_boundaries() {
    let base = Path::new("/srv/app");
    assert_ne!(
        fingerprint(base, "job", &["ab", "c"]),
        fingerprint(base, "job", &["a", "bc"])
    );
    assert_ne!(
        fingerprint(base, "jobx", &["y"]),
        fingerprint(base, "job", &["xy"])
    );
}

proptest! {
    #[test]
    fn prop_fingerprint_changes_with_any_input(
        name in "[a-z][a-z0-9_-]{0,11}",
        other_name in "[a-z][a-z0-9_-]{0,11}",
        args in proptest::collection::vec("[a-zA-Z0-9:/._-]{1,8}", 1..5),
        extra in "[a-zA-Z0-9]{1,6}",
    ) {
        let base = Path::new("/srv/app");
        let fp = fingerprint(base, &name, args.as_slice());

        prop_assert_eq!(&fp, &fingerprint(base, &name, args.as_slice()));

        if other_name != name {
            prop_assert_ne!(&fp, &fingerprint(base, &other_name, args.as_slice()));
        }

        let mut longer = args.clone();
        longer.push(extra);
        prop_assert_ne!(&fp, &fingerprint(base, &name, longer.as_slice()));

        prop_assert_ne!(&fp, &fingerprint(Path::new("/srv/other"), &name, args.as_slice()));
    }
}
