//! Runs the `roster` binary end to end

use std::process::Command;

fn roster(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_roster"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run roster binary")
}

#[test]
fn test_default_run_prints_demo_to_stdout() {
    let output = roster(&[]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 12);
    assert!(lines[1].contains("('Albert Einstein',)"));
    assert!(lines[1].contains("('Alan Turing',)"));
    assert_eq!(lines[6], "(2,)");
    assert_eq!(lines[7], "Alan Turing");
    assert_eq!(&lines[10..], &["None", "None"]);
}

#[test]
fn test_quiet_profile_keeps_stderr_empty() {
    let output = roster(&["--log-profile", "quiet"]);
    assert!(output.status.success());
    assert!(output.stderr.is_empty());
}

#[test]
fn test_development_profile_logs_to_stderr_only() {
    let output = roster(&["--log-profile", "development"]);
    assert!(output.status.success());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("commit"));

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 12);
}

#[test]
fn test_unknown_profile_rejected() {
    let output = roster(&["--log-profile", "verbose"]);
    assert!(!output.status.success());
}
