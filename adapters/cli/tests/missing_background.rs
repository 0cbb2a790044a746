use std::{
    fs,
    io::Write,
    path::Path,
    process::{Command, Output, Stdio},
};

use tempfile::tempdir;

const MISSING_MESSAGE: &str = "Error: File 'Screenshot.png' not found. \
     Please ensure the image is in the same directory as this script.";

fn run_in(dir: &Path) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_chernomap"))
        .current_dir(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to launch chernomap binary");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(b"\n")
        .expect("failed to acknowledge the exit prompt");

    child.wait_with_output().expect("chernomap did not exit")
}

#[test]
fn missing_background_prints_message_and_waits_for_enter() {
    let dir = tempdir().expect("temp dir");
    let output = run_in(dir.path());

    assert!(output.status.success(), "exit status {:?}", output.status);
    let stdout = String::from_utf8(output.stdout).expect("utf-8 stdout");
    assert_eq!(stdout, format!("{MISSING_MESSAGE}\nPress Enter to exit..."));
}

#[test]
fn preflight_runs_before_the_configuration_is_read() {
    let dir = tempdir().expect("temp dir");
    fs::write(dir.path().join("chernomap.toml"), "[simulation\npopulation = ")
        .expect("write config");

    let output = run_in(dir.path());

    assert!(output.status.success(), "exit status {:?}", output.status);
    let stdout = String::from_utf8(output.stdout).expect("utf-8 stdout");
    assert!(stdout.starts_with(MISSING_MESSAGE));
    let stderr = String::from_utf8(output.stderr).expect("utf-8 stderr");
    assert!(!stderr.contains("configuration"), "config was loaded: {stderr}");
}
