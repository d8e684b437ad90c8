//! End-to-end checks of the `lila` binary

use std::process::Command;
use tempfile::TempDir;

fn lila() -> Command {
    Command::new(env!("CARGO_BIN_EXE_lila"))
}

fn empty_config(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    let id_file = dir.path().join("session_id");
    std::fs::write(
        &path,
        format!("[session]\nid_file = {:?}\n", id_file.display().to_string()),
    )
    .unwrap();
    path
}

#[test]
fn test_help_lists_subcommands() {
    let output = lila().arg("--help").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    for command in ["chat", "ask", "analyze", "health"] {
        assert!(stdout.contains(command), "missing {} in:\n{}", command, stdout);
    }
}

#[test]
fn test_health_reports_unreachable_backend() {
    let dir = TempDir::new().unwrap();
    let output = lila()
        .arg("-C")
        .arg(empty_config(&dir))
        .args(["--base-url", "http://127.0.0.1:1", "health"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("not reachable"));
}

#[test]
fn test_invalid_base_url_fails_fast() {
    let dir = TempDir::new().unwrap();
    let output = lila()
        .arg("-C")
        .arg(empty_config(&dir))
        .args(["--base-url", "localhost:5001", "health"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid --base-url"));
}

#[test]
fn test_analyze_rejects_non_excel_file() {
    let dir = TempDir::new().unwrap();
    let notes = dir.path().join("notes.csv");
    std::fs::write(&notes, "a,b\n").unwrap();

    let output = lila()
        .arg("-C")
        .arg(empty_config(&dir))
        .args(["--base-url", "http://127.0.0.1:1", "analyze"])
        .arg(&notes)
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Please upload an Excel file"));
    assert!(dir.path().join("session_id").exists());
}
