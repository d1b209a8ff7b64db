// tests/session_listing.rs

use jobscreen::invocation::{shell_quote, SelfInvocation};
use jobscreen::session::{find_session, parse_listing, SessionEntry};

const LISTING: &str = "There are screens on:
\t4242.8f3a9c\t(10/16/2026 09:12:01 AM)\t(Detached)
\t4300.8f3a9c0d\t(Attached)
\t  77.other-job\t(Dead ???)
2 Sockets in /run/screen/S-deploy.
";

#[test]
fn test_listing_rows_are_parsed() {
    let entries = parse_listing(LISTING);

    assert_eq!(
        entries,
        vec![
            SessionEntry { pid: 4242, name: "8f3a9c".to_string() },
            SessionEntry { pid: 4300, name: "8f3a9c0d".to_string() },
            SessionEntry { pid: 77, name: "other-job".to_string() },
        ]
    );
}

#[test]
fn test_find_session_requires_exact_name() {
    assert_eq!(find_session(LISTING, "8f3a9c").map(|e| e.pid), Some(4242));
    assert_eq!(find_session(LISTING, "8f3a9c0d").map(|e| e.pid), Some(4300));
    assert!(find_session(LISTING, "8f3a").is_none());
    assert!(find_session(LISTING, "3a9c").is_none());
}

#[test]
fn test_empty_or_garbage_listing_has_no_sessions() {
    assert!(parse_listing("").is_empty());
    assert!(parse_listing("No Sockets found in /run/screen/S-deploy.\n").is_empty());
    assert!(find_session("screen: command not found", "anything").is_none());
}

#[test]
fn test_self_invocation_argv() {
    let inv = SelfInvocation::new(
        "/usr/local/bin/jobscreen",
        vec!["--config".to_string(), "/srv/app/jobscreen.toml".to_string()],
    );

    assert_eq!(
        inv.argv("run", "worker"),
        vec![
            "/usr/local/bin/jobscreen",
            "--config",
            "/srv/app/jobscreen.toml",
            "run",
            "worker"
        ]
    );
}

#[test]
fn test_shell_line_quotes_unsafe_arguments() {
    let inv = SelfInvocation::new(
        "/opt/my tools/jobscreen",
        vec!["--config".to_string(), "/srv/it's/jobscreen.toml".to_string()],
    );

    assert_eq!(
        inv.shell_line("start", "worker"),
        r#"'/opt/my tools/jobscreen' --config '/srv/it'"'"'s/jobscreen.toml' start worker"#
    );
    assert_eq!(shell_quote(""), "''");
    assert_eq!(shell_quote("plain-word_1.0"), "plain-word_1.0");
}
