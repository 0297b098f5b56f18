use assert_cmd::Command; // Bring Command into scope
use predicates::prelude::*; // Bring predicate traits into scope
use std::fs;
use tempfile::tempdir;

#[test]
fn test_install_action_runs_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("keystone")?;

    cmd.args(["--action", "install"])
        .env("RUST_LOG", "info")
        .assert()
        .success()
        .stderr(predicate::str::contains("Schema created"))
        .stderr(predicate::str::contains("Action 'install' completed"));

    Ok(())
}

#[test]
fn test_unknown_action_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("keystone")?;

    cmd.args(["--action", "bogus"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No registered module declares the tag 'bogus'"));

    Ok(())
}

#[test]
fn test_bounded_run_starts_and_stops_services() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("keystone")?;

    cmd.args(["--run-for", "0"])
        .env("RUST_LOG", "info")
        .assert()
        .success()
        .stderr(predicate::str::contains("Starting 2 services"))
        .stderr(predicate::str::contains("Shutting down"));

    Ok(())
}

#[test]
fn test_config_file_is_applied() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("keystone.json");
    fs::write(&path, r#"{ "logging": { "level": "info" }, "scheduler": { "enabled": false } }"#)?;

    let mut cmd = Command::cargo_bin("keystone")?;
    cmd.arg("--config")
        .arg(&path)
        .args(["--run-for", "0"])
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("Starting 1 services"))
        .stderr(predicate::str::contains("metrics will not be flushed"));

    Ok(())
}

#[test]
fn test_unsupported_config_format_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("keystone.ini");
    fs::write(&path, "level = debug")?;

    let mut cmd = Command::cargo_bin("keystone")?;
    cmd.arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Unsupported configuration format"));

    Ok(())
}
