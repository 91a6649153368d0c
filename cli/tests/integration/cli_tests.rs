//! End-to-end tests of the agentctl binary.

#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Temp dir holding a config file that points every path inside it.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new(agent: &str) -> Self {
        Self::with_extra(agent, "")
    }

    fn with_extra(agent: &str, extra: &str) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = dir.path().display();
        let config = format!(
            "agent: {agent}\n\
             settings_file: {root}/settings.yaml\n\
             state_file: {root}/state.json\n\
             prefix_dir: {root}/venv\n\
             cache_dir: {root}/cache\n\
             unit_dir: {root}/units\n\
             {extra}"
        );
        std::fs::write(dir.path().join("config.yaml"), config).expect("write config");
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn cmd(&self) -> Command {
        let mut cmd = agentctl();
        cmd.env("AGENTCTL_CONFIG", self.path("config.yaml"));
        cmd
    }

    fn seed_state(&self, json: &str) {
        std::fs::write(self.path("state.json"), json).expect("seed state");
    }

    fn state(&self) -> serde_json::Value {
        let raw = std::fs::read_to_string(self.path("state.json")).expect("state written");
        serde_json::from_str(&raw).expect("state is JSON")
    }

    fn write_settings(&self, yaml: &str) {
        std::fs::write(self.path("settings.yaml"), yaml).expect("write settings");
    }
}

fn agentctl() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("agentctl"));
    cmd.env("NO_COLOR", "1").env_remove("AGENTCTL_CONFIG");
    cmd
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

const COMPLETE_SETTINGS: &str = "\
base-api-url: https://api.example.com
base-slurmrestd-url: http://slurmctld:6820
slurmrestd-jwt-key-string: abc
slurmrestd-use-key-path: false
oidc-domain: auth.example.com
oidc-audience: https://apis.example.com
oidc-client-id: client
oidc-client-secret: s3cr3t
x-slurm-user-name: slurm
";

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help() {
    agentctl()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_cli_help_lists_lifecycle_commands() {
    agentctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("config-changed"))
        .stdout(predicate::str::contains("status-check"))
        .stdout(predicate::str::contains("clear-cache-dir"))
        .stdout(predicate::str::contains("show-version"));
}

#[test]
fn test_version_command_shows_version() {
    agentctl()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "agentctl {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = agentctl()
        .args(["version", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_no_color_accepts_conventional_values() {
    for value in ["1", "yes", "0", ""] {
        Command::new(assert_cmd::cargo::cargo_bin!("agentctl"))
            .env("NO_COLOR", value)
            .arg("version")
            .assert()
            .success();
    }
}

#[test]
fn test_unknown_agent_is_rejected() {
    agentctl()
        .args(["--agent", "slurmctld", "status"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}

// --- Config handling ---

#[test]
fn test_unknown_config_key_fails() {
    let sandbox = Sandbox::with_extra("cluster-agent", "agnet: typo\n");
    sandbox
        .cmd()
        .arg("status")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown field"));
}

#[test]
fn test_config_flag_overrides_env() {
    let sandbox = Sandbox::new("jobbergate-agent");
    sandbox.seed_state(r#"{"installed":true,"config_available":false}"#);

    let output = agentctl()
        .env("AGENTCTL_CONFIG", "/nonexistent/agentctl.yaml")
        .arg("--config")
        .arg(sandbox.path("config.yaml"))
        .args(["status", "--json"])
        .output()
        .expect("run");

    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["installed"], true);
}

// --- status ---

#[test]
fn test_status_fresh_state_json() {
    let sandbox = Sandbox::new("cluster-agent");
    let output = sandbox.cmd().args(["status", "--json"]).output().expect("run");

    assert!(output.status.success());
    let state = stdout_json(&output);
    assert_eq!(state["installed"], false);
    assert_eq!(state["config_available"], false);
    assert_eq!(state["phase"], "uninstalled");
}

#[test]
fn test_status_masks_secrets() {
    let sandbox = Sandbox::new("cluster-agent");
    sandbox.seed_state(
        r#"{"installed":true,"config_available":true,"phase":"active",
            "oidc-client-secret":"s3cr3t","base-api-url":"https://api.example.com"}"#,
    );

    sandbox
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://api.example.com"))
        .stdout(predicate::str::contains("s3cr3t").not());
}

// --- deferral ---

#[test]
fn test_start_before_install_exits_deferred() {
    let sandbox = Sandbox::new("cluster-agent");
    let output = sandbox.cmd().args(["start", "--json"]).output().expect("run");

    assert_eq!(output.status.code(), Some(75));
    let result = stdout_json(&output);
    assert_eq!(result["trigger"], "start");
    assert_eq!(result["outcome"], "deferred");
    assert_eq!(sandbox.state()["deferred"][0]["trigger"], "start");
}

#[test]
fn test_config_changed_before_install_exits_deferred() {
    let sandbox = Sandbox::new("cluster-agent");
    sandbox.write_settings(COMPLETE_SETTINGS);

    sandbox.cmd().arg("config-changed").assert().code(75);

    assert!(!sandbox.path("venv/.env").exists());
    assert_eq!(sandbox.state()["deferred"][0]["trigger"], "config-changed");
}

#[test]
fn test_status_check_before_install_is_a_noop() {
    let sandbox = Sandbox::new("cluster-agent");
    sandbox.cmd().arg("status-check").assert().success();
}

// --- config-changed ---

#[test]
fn test_config_changed_writes_environment_file() {
    let sandbox = Sandbox::new("jobbergate-agent");
    sandbox.seed_state(r#"{"installed":true,"config_available":false,"phase":"waiting-for-config"}"#);
    sandbox.write_settings(COMPLETE_SETTINGS);

    sandbox.cmd().arg("config-changed").assert().success();

    let env = std::fs::read_to_string(sandbox.path("venv/.env")).expect("env file");
    assert!(env.contains("JOBBERGATE_AGENT_SLURMRESTD_JWT_KEY_STRING=abc\n"));
    assert!(env.contains("JOBBERGATE_AGENT_SLURMRESTD_USE_KEY_PATH=false\n"));
    assert!(env.ends_with(&format!(
        "JOBBERGATE_AGENT_CACHE_DIR={}\n",
        sandbox.path("cache").display()
    )));

    let state = sandbox.state();
    assert_eq!(state["config_available"], true);
    assert_eq!(state["oidc-client-id"], "client");
}

#[test]
fn test_config_changed_with_incomplete_settings_waits() {
    let sandbox = Sandbox::new("jobbergate-agent");
    sandbox.seed_state(r#"{"installed":true,"config_available":false}"#);
    sandbox.write_settings("base-api-url: https://api.example.com\n");

    let output = sandbox
        .cmd()
        .args(["config-changed", "--json"])
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(75));
    assert_eq!(stdout_json(&output)["status"]["kind"], "waiting");
}

// --- upgrade ---

#[test]
fn test_upgrade_not_installed_fails() {
    let sandbox = Sandbox::new("cluster-agent");
    let output = sandbox
        .cmd()
        .args(["upgrade", "3.2.1", "--json"])
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
    let err = stdout_json(&output);
    assert_eq!(err["error"], true);
    assert_eq!(err["code"], "NOT_INSTALLED");
}

#[test]
fn test_upgrade_rejects_requirement_syntax() {
    let sandbox = Sandbox::new("cluster-agent");
    sandbox.seed_state(r#"{"installed":true,"config_available":true}"#);

    let output = sandbox
        .cmd()
        .args(["--json", "upgrade", "1.0;rm"])
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_json(&output)["code"], "INVALID_VERSION");
}

#[test]
fn test_upgrade_error_is_human_readable() {
    let sandbox = Sandbox::new("jobbergate-agent");
    sandbox
        .cmd()
        .args(["upgrade", "2.0.0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "jobbergate-agent is not installed. Run 'agentctl install' first.",
        ));
}

#[test]
fn test_upgrade_reaches_the_installer() {
    // No runtime exists in the sandbox, so the pinned install itself fails.
    let sandbox = Sandbox::new("cluster-agent");
    sandbox.seed_state(r#"{"installed":true,"config_available":true,"phase":"active"}"#);

    let output = sandbox
        .cmd()
        .args(["upgrade", "3.2.1", "--json"])
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_json(&output)["code"], "UPGRADE_FAILED");
    let state = sandbox.state();
    assert_eq!(state["phase"], "blocked");
    assert_eq!(state["status"]["message"], "Error updating to version 3.2.1");
}

// --- clear-cache-dir ---

#[test]
fn test_clear_cache_missing_dir_skips() {
    let sandbox = Sandbox::new("cluster-agent");
    sandbox
        .cmd()
        .arg("clear-cache-dir")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache dir doesn't exist. Skipping."));
}

#[test]
fn test_clear_cache_removes_dir() {
    let sandbox = Sandbox::new("cluster-agent");
    let cache = sandbox.path("cache");
    std::fs::create_dir_all(cache.join("tokens")).expect("seed cache");

    sandbox
        .cmd()
        .arg("clear-cache-dir")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache cleared"));

    assert!(!Path::new(&cache).exists());
    assert_eq!(sandbox.state()["status"]["message"], "Cache cleared");
}

#[test]
fn test_clear_cache_json_reports_success() {
    let sandbox = Sandbox::new("cluster-agent");
    let output = sandbox
        .cmd()
        .args(["clear-cache-dir", "--json"])
        .output()
        .expect("run");

    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        serde_json::json!({ "cache-clear": "success" })
    );
}
