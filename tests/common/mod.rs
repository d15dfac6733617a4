//! Shared helpers for CLI integration tests.
//!
//! Every invocation runs with stdin closed and the user config path
//! pointed into the test directory, so nothing on the host machine can
//! leak into a test.

use std::path::Path;
use std::process::{Child, Command, Stdio};

/// Captured output of one accdev invocation
pub struct CliResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

pub fn run(cwd: &Path, args: &[&str]) -> CliResult {
    run_with_env(cwd, args, &[])
}

pub fn run_with_env(cwd: &Path, args: &[&str], env_vars: &[(&str, &str)]) -> CliResult {
    let output = command(cwd, args, env_vars)
        .output()
        .expect("failed to run accdev");

    CliResult {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

/// Start accdev without waiting for it, stdout piped.
#[allow(dead_code)]
pub fn spawn(cwd: &Path, args: &[&str], env_vars: &[(&str, &str)]) -> Child {
    command(cwd, args, env_vars)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn accdev")
}

fn command(cwd: &Path, args: &[&str], env_vars: &[(&str, &str)]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_accdev"));
    cmd.current_dir(cwd)
        .args(args)
        .stdin(Stdio::null())
        .env("ACCDEV_USER_CONFIG_PATH", cwd.join("no-user-config.toml"));
    for (key, value) in env_vars {
        cmd.env(key, value);
    }
    cmd
}
