//! Integration tests for the secret-mask binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SECRET: &str = "sup3r-s3cret-value";

/// A command isolated from config files and name-based detection, with a
/// single secret registered through `--secret-env`.
fn secret_mask(temp: &TempDir, subcommand: &str) -> Command {
    let mut cmd = Command::new(cargo_bin("secret-mask"));
    cmd.current_dir(temp.path());
    cmd.env_remove("SECRET_MASK_CONFIG");
    cmd.env_remove("SECRET_MASK_MASK");
    cmd.env_remove("SECRET_MASK_TIMEOUT_MS");
    cmd.env_remove("SECRET_MASK_ENV_FILE");
    cmd.env_remove("RUST_LOG");
    cmd.env("MY_VALUE", SECRET);
    cmd.args([subcommand, "--no-detect", "-s", "MY_VALUE"]);
    cmd
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("secret-mask"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("filter"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("secret-mask"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_invalid_command_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("secret-mask"));
    cmd.arg("invalid-command");
    cmd.assert().failure();
    Ok(())
}

#[test]
fn cli_filter_masks_stdin() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let mut cmd = secret_mask(&temp, "filter");
    cmd.write_stdin(format!("token: {SECRET}\nbye\n"));
    cmd.assert()
        .success()
        .stdout("token: [REDACTED]\nbye\n");
    Ok(())
}

#[test]
fn cli_filter_uses_custom_mask() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let mut cmd = secret_mask(&temp, "filter");
    cmd.args(["--mask", "***"]);
    cmd.write_stdin(format!("{SECRET}{SECRET}"));
    cmd.assert().success().stdout("******");
    Ok(())
}

#[test]
fn cli_filter_passes_partial_secret_through() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let mut cmd = secret_mask(&temp, "filter");
    cmd.write_stdin("prefix sup3r-s3c");
    cmd.assert().success().stdout("prefix sup3r-s3c");
    Ok(())
}

#[test]
fn cli_filter_warns_without_secrets() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let mut cmd = Command::new(cargo_bin("secret-mask"));
    cmd.current_dir(temp.path());
    cmd.env_remove("SECRET_MASK_CONFIG");
    cmd.args(["filter", "--no-detect"]);
    cmd.write_stdin("hello");
    cmd.assert()
        .success()
        .stdout("hello")
        .stderr(predicate::str::contains("no secrets registered"));
    Ok(())
}

#[test]
fn cli_quiet_suppresses_warning() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let mut cmd = Command::new(cargo_bin("secret-mask"));
    cmd.current_dir(temp.path());
    cmd.env_remove("SECRET_MASK_CONFIG");
    cmd.args(["-q", "filter", "--no-detect"]);
    cmd.write_stdin("hello");
    cmd.assert().success().stderr(predicate::str::is_empty());
    Ok(())
}

#[test]
fn cli_filter_reads_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    fs::write(
        temp.path().join(".secret-mask.yml"),
        "mask: '<hidden>'\nsecret_env: [OTHER_VALUE]\n",
    )?;
    let mut cmd = secret_mask(&temp, "filter");
    cmd.env("OTHER_VALUE", "another-one");
    cmd.write_stdin(format!("{SECRET} another-one"));
    cmd.assert().success().stdout("<hidden> <hidden>");
    Ok(())
}

#[test]
fn cli_invalid_config_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    fs::write(temp.path().join(".secret-mask.yml"), "unknown_key: true\n")?;
    let mut cmd = secret_mask(&temp, "filter");
    cmd.write_stdin("");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
    Ok(())
}

#[test]
fn cli_missing_explicit_config_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let mut cmd = secret_mask(&temp, "config");
    cmd.args(["--config", "nope.yml"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Configuration not found"));
    Ok(())
}

#[test]
fn cli_config_json_hides_values() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let mut cmd = secret_mask(&temp, "config");
    cmd.arg("--json");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"secret_count\": 1"))
        .stdout(predicate::str::contains(SECRET).not());
    Ok(())
}

#[test]
fn cli_completions_generates_script() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("secret-mask"));
    cmd.args(["completions", "bash"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("secret-mask"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn cli_run_masks_stdout_and_stderr() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let mut cmd = secret_mask(&temp, "run");
    cmd.args(["--", "sh", "-c", "echo \"out $MY_VALUE\"; echo \"err $MY_VALUE\" >&2"]);
    cmd.assert()
        .success()
        .stdout("out [REDACTED]\n")
        .stderr("err [REDACTED]\n");
    Ok(())
}

#[cfg(unix)]
#[test]
fn cli_run_propagates_exit_code() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let mut cmd = secret_mask(&temp, "run");
    cmd.args(["--", "sh", "-c", "exit 3"]);
    cmd.assert().code(3);
    Ok(())
}

#[cfg(unix)]
#[test]
fn cli_run_without_masking() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let mut cmd = secret_mask(&temp, "run");
    cmd.args(["--no-masking", "--", "sh", "-c", "echo $MY_VALUE"]);
    cmd.assert().success().stdout(format!("{SECRET}\n"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn cli_run_injects_and_masks_env_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    fs::write(temp.path().join("deploy.env"), "DEPLOY_PASS=from-env-file\n")?;
    let mut cmd = secret_mask(&temp, "run");
    cmd.args(["--env-file", "deploy.env", "--", "sh", "-c", "echo $DEPLOY_PASS"]);
    cmd.assert().success().stdout("[REDACTED]\n");
    Ok(())
}

#[test]
fn cli_run_missing_program_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let mut cmd = secret_mask(&temp, "run");
    cmd.args(["--", "definitely-not-a-real-program-xyz"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("definitely-not-a-real-program-xyz"));
    Ok(())
}

#[test]
fn cli_debug_flag_logs_to_stderr() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let mut cmd = secret_mask(&temp, "filter");
    cmd.arg("--debug");
    cmd.write_stdin("x");
    cmd.assert()
        .success()
        .stdout("x")
        .stderr(predicate::str::contains("resolved secrets"));
    Ok(())
}
