//! Black-box tests of the forge binary.

use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn forge() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_forge"));
    cmd.env_remove("RUST_LOG").env_remove("FORGE_REGION");
    cmd
}

#[test]
fn test_build_stub_only() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("src/functions/api");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("handler.py"), "def handler(e, c): pass").unwrap();

    let output = forge()
        .args(["build", "--stub-only", "--project-dir"])
        .arg(temp.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(temp.path().join(".forge/build/api.zip").is_file());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("  - api (python3.13)"));
    assert!(stdout.contains("timeout 30s, memory 256 MB"));

    let runs: Vec<_> = fs::read_dir(temp.path().join(".forge/runs")).unwrap().collect();
    assert_eq!(runs.len(), 1);
}

#[test]
fn test_missing_functions_directory_exit_code() {
    let temp = TempDir::new().unwrap();

    let output = forge()
        .args(["build", "--project-dir"])
        .arg(temp.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_missing_project_directory_exit_code() {
    let temp = TempDir::new().unwrap();

    let output = forge()
        .args(["build", "--project-dir"])
        .arg(temp.path().join("nope"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_deploy_without_infra_directory() {
    let temp = TempDir::new().unwrap();

    let output = forge()
        .args(["deploy", "--auto-approve", "--project-dir"])
        .arg(temp.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Infrastructure directory not found"));
}
