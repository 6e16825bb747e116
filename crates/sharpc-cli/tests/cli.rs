//! Smoke tests for the `sharpc` binary.

use std::process::Command;

fn sharpc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sharpc"))
}

#[test]
fn help_runs() {
    let output = sharpc().arg("--help").output().expect("failed to run sharpc");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
}

#[test]
fn version_runs() {
    let output = sharpc()
        .arg("--version")
        .output()
        .expect("failed to run sharpc");
    assert!(output.status.success());
}

#[test]
fn missing_fragment_is_reported() {
    let output = sharpc()
        .arg("/no/such/fragment.cs")
        .output()
        .expect("failed to run sharpc");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read fragment"));
}
