//! `ServiceController` tests: best-effort supervisor calls, health queries,
//! template lookup, unit provisioning and teardown.

use std::collections::BTreeMap;
use std::sync::atomic::Ordering;

use agentctl_cli::application::services::service_controller::ServiceController;
use agentctl_cli::domain::error::ConfigError;
use agentctl_cli::domain::outcome::BestEffort;
use agentctl_cli::infra::fs::HostFs;
use agentctl_cli::infra::systemd::SystemctlSupervisor;
use tempfile::TempDir;

use crate::helpers::{err_output, ok_output};
use crate::mocks::{FakeSupervisor, RecordingRunner};

fn ctx(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

// ── best-effort operations ────────────────────────────────────────────────────

#[tokio::test]
async fn successful_operation_is_done() {
    let supervisor = FakeSupervisor::new();
    let ctl = ServiceController::new(&supervisor, &HostFs);

    assert_eq!(ctl.start("ovs-cluster-agent.service").await, BestEffort::Done);
}

#[tokio::test]
async fn non_zero_exit_is_a_logged_failure() {
    let supervisor = FakeSupervisor::new();
    supervisor.failing.store(true, Ordering::SeqCst);
    let ctl = ServiceController::new(&supervisor, &HostFs);

    let outcome = ctl.restart("ovs-cluster-agent.service").await;

    assert!(!outcome.is_done());
    assert!(outcome.to_string().contains("restart"), "got: {outcome}");
}

#[tokio::test]
async fn spawn_failure_is_a_logged_failure() {
    let supervisor = FakeSupervisor::new();
    supervisor.unreachable.store(true, Ordering::SeqCst);
    let ctl = ServiceController::new(&supervisor, &HostFs);

    assert!(!ctl.enable("jobbergate-agent.service").await.is_done());
    assert!(!ctl.daemon_reload().await.is_done());
}

// ── query_active ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn active_unit_is_reported_active() {
    let supervisor = FakeSupervisor::active();
    let ctl = ServiceController::new(&supervisor, &HostFs);

    assert!(ctl.query_active("ovs-cluster-agent.timer").await);
}

#[tokio::test]
async fn inactive_unit_is_not_active() {
    let supervisor = FakeSupervisor::new();
    let ctl = ServiceController::new(&supervisor, &HostFs);

    assert!(!ctl.query_active("ovs-cluster-agent.timer").await);
}

#[tokio::test]
async fn activating_unit_is_not_yet_active() {
    let runner = RecordingRunner::scripted(vec![Ok(ok_output(b"activating\n"))]);
    let supervisor = SystemctlSupervisor::new(runner);
    let ctl = ServiceController::new(&supervisor, &HostFs);

    assert!(!ctl.query_active("jobbergate-agent.service").await);
}

#[tokio::test]
async fn failed_exit_with_active_text_is_not_active() {
    let runner = RecordingRunner::scripted(vec![Ok(std::process::Output {
        stdout: b"active\n".to_vec(),
        ..err_output(1, b"")
    })]);
    let supervisor = SystemctlSupervisor::new(runner);
    let ctl = ServiceController::new(&supervisor, &HostFs);

    assert!(!ctl.query_active("jobbergate-agent.service").await);
}

#[tokio::test]
async fn unreachable_supervisor_is_not_active() {
    let supervisor = FakeSupervisor::active();
    supervisor.unreachable.store(true, Ordering::SeqCst);
    let ctl = ServiceController::new(&supervisor, &HostFs);

    assert!(!ctl.query_active("jobbergate-agent.service").await);
}

// ── template_text ─────────────────────────────────────────────────────────────

#[test]
fn bundled_template_is_used_without_override() {
    let supervisor = FakeSupervisor::new();
    let ctl = ServiceController::new(&supervisor, &HostFs);

    let text = ctl
        .template_text(None, "ovs-cluster-agent.timer")
        .expect("bundled");

    assert!(text.contains("{{ stat_interval }}"));
}

#[test]
fn template_override_wins() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(
        dir.path().join("jobbergate-agent.service"),
        "[Service]\nExecStart={{ prefix_dir }}/bin/custom\n",
    )
    .expect("write override");
    let supervisor = FakeSupervisor::new();
    let ctl = ServiceController::new(&supervisor, &HostFs);

    let text = ctl
        .template_text(Some(dir.path()), "jobbergate-agent.service")
        .expect("override");

    assert!(text.contains("bin/custom"));
}

#[test]
fn override_dir_without_the_file_falls_back() {
    let dir = TempDir::new().expect("tempdir");
    let supervisor = FakeSupervisor::new();
    let ctl = ServiceController::new(&supervisor, &HostFs);

    let text = ctl
        .template_text(Some(dir.path()), "jobbergate-agent.service")
        .expect("bundled");

    assert!(text.contains("jobbergate-agent"));
}

#[test]
fn unknown_template_is_an_error() {
    let supervisor = FakeSupervisor::new();
    let ctl = ServiceController::new(&supervisor, &HostFs);

    let err = ctl
        .template_text(None, "nope.service")
        .expect_err("missing template");

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::MissingTemplate(_))
    ));
}

// ── provision_unit ────────────────────────────────────────────────────────────

#[tokio::test]
async fn provision_renders_writes_and_reloads() {
    let dir = TempDir::new().expect("tempdir");
    let target = dir.path().join("units").join("agent.timer");
    let supervisor = FakeSupervisor::new();
    let ctl = ServiceController::new(&supervisor, &HostFs);

    let written = ctl
        .provision_unit(
            "OnUnitActiveSec={{ stat_interval }}\n",
            &target,
            Some(&ctx(&[("stat_interval", "90")])),
        )
        .await
        .expect("provision");

    assert!(written);

    assert_eq!(
        std::fs::read_to_string(&target).expect("unit written"),
        "OnUnitActiveSec=90\n"
    );
    assert_eq!(supervisor.calls(), vec!["daemon-reload"]);
}

#[tokio::test]
async fn provision_without_context_copies_verbatim() {
    let dir = TempDir::new().expect("tempdir");
    let target = dir.path().join("agent.service");
    let supervisor = FakeSupervisor::new();
    let ctl = ServiceController::new(&supervisor, &HostFs);

    ctl.provision_unit("[Unit]\nDescription={{ literal }}\n", &target, None)
        .await
        .expect("provision");

    assert!(
        std::fs::read_to_string(&target)
            .expect("unit written")
            .contains("{{ literal }}")
    );
}

#[tokio::test]
async fn unresolved_placeholder_writes_nothing() {
    let dir = TempDir::new().expect("tempdir");
    let target = dir.path().join("agent.timer");
    let supervisor = FakeSupervisor::new();
    let ctl = ServiceController::new(&supervisor, &HostFs);

    let result = ctl
        .provision_unit("OnUnitActiveSec={{ stat_interval }}\n", &target, Some(&ctx(&[])))
        .await;

    assert!(result.is_err());
    assert!(!target.exists());
    assert!(supervisor.calls().is_empty());
}

#[tokio::test]
async fn provision_survives_a_failed_reload() {
    let dir = TempDir::new().expect("tempdir");
    let target = dir.path().join("agent.service");
    let supervisor = FakeSupervisor::new();
    supervisor.failing.store(true, Ordering::SeqCst);
    let ctl = ServiceController::new(&supervisor, &HostFs);

    ctl.provision_unit("[Unit]\n", &target, None)
        .await
        .expect("reload failure is not an error");

    assert!(target.exists());
}

#[tokio::test]
async fn provision_leaves_an_identical_unit_alone() {
    let dir = TempDir::new().expect("tempdir");
    let target = dir.path().join("agent.timer");
    std::fs::write(&target, "OnUnitActiveSec=90\n").expect("seed unit");
    let supervisor = FakeSupervisor::new();
    let ctl = ServiceController::new(&supervisor, &HostFs);
    let vars = ctx(&[("stat_interval", "90")]);

    let written = ctl
        .provision_unit("OnUnitActiveSec={{ stat_interval }}\n", &target, Some(&vars))
        .await
        .expect("provision");

    assert!(!written);
    assert!(supervisor.calls().is_empty());
}

#[tokio::test]
async fn provision_rewrites_a_unit_whose_values_changed() {
    let dir = TempDir::new().expect("tempdir");
    let target = dir.path().join("agent.timer");
    std::fs::write(&target, "OnUnitActiveSec=60\n").expect("seed unit");
    let supervisor = FakeSupervisor::new();
    let ctl = ServiceController::new(&supervisor, &HostFs);
    let vars = ctx(&[("stat_interval", "120")]);

    let written = ctl
        .provision_unit("OnUnitActiveSec={{ stat_interval }}\n", &target, Some(&vars))
        .await
        .expect("provision");

    assert!(written);
    assert_eq!(std::fs::read_to_string(&target).expect("unit"), "OnUnitActiveSec=120\n");
    assert_eq!(supervisor.calls(), vec!["daemon-reload"]);
}

// ── teardown ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn teardown_stops_disables_and_deletes() {
    let dir = TempDir::new().expect("tempdir");
    let service = dir.path().join("agent.service");
    let timer = dir.path().join("agent.timer");
    std::fs::write(&service, "[Unit]\n").expect("seed service");
    std::fs::write(&timer, "[Timer]\n").expect("seed timer");
    let supervisor = FakeSupervisor::new();
    let ctl = ServiceController::new(&supervisor, &HostFs);

    let outcome = ctl
        .teardown(&["agent.service", "agent.timer"], &[service.clone(), timer.clone()])
        .await;

    assert_eq!(outcome, BestEffort::Done);
    assert_eq!(
        supervisor.calls(),
        vec![
            "stop agent.service",
            "disable agent.service",
            "stop agent.timer",
            "disable agent.timer",
            "daemon-reload",
        ]
    );
    assert!(!service.exists());
    assert!(!timer.exists());
}

#[tokio::test]
async fn teardown_continues_past_failures() {
    let dir = TempDir::new().expect("tempdir");
    let service = dir.path().join("agent.service");
    std::fs::write(&service, "[Unit]\n").expect("seed service");
    let missing = dir.path().join("never-written.timer");
    let supervisor = FakeSupervisor::new();
    supervisor.unreachable.store(true, Ordering::SeqCst);
    let ctl = ServiceController::new(&supervisor, &HostFs);

    let outcome = ctl
        .teardown(&["agent.service"], &[service.clone(), missing])
        .await;

    assert!(!outcome.is_done());
    assert!(!service.exists());
    assert_eq!(supervisor.count_op("daemon-reload"), 1);
}
