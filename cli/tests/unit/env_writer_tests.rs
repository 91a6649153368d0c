//! Environment file writing against a real temp directory.

use agentctl_cli::application::services::env_writer::{EnvWrite, write_environment};
use agentctl_cli::domain::error::LifecycleError;
use agentctl_cli::domain::settings::resolve;
use agentctl_cli::infra::fs::HostFs;
use agentctl_common::{CLUSTER_AGENT, JOBBERGATE_AGENT};
use tempfile::TempDir;

use crate::helpers::{complete_settings, layout_in};
use crate::mocks::ReadOnlyPath;

#[test]
fn writes_prefixed_lines_and_cache_dir_last() {
    let dir = TempDir::new().expect("tempdir");
    let layout = layout_in(dir.path(), &JOBBERGATE_AGENT);
    let settings = resolve(
        &complete_settings(),
        JOBBERGATE_AGENT.schema,
        Some(&JOBBERGATE_AGENT.secret),
    )
    .expect("complete");

    let written = write_environment(&HostFs, &layout, JOBBERGATE_AGENT.env_prefix, &settings)
        .expect("write");

    assert_eq!(written, EnvWrite::Written);
    let content = std::fs::read_to_string(&layout.env_file).expect("env file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), settings.len() + 1);
    assert!(lines.contains(&"JOBBERGATE_AGENT_OIDC_CLIENT_ID=client"));
    assert!(lines.contains(&"JOBBERGATE_AGENT_X_SLURM_USER_NAME=slurm"));
    assert_eq!(
        lines.last().copied(),
        Some(format!("JOBBERGATE_AGENT_CACHE_DIR={}", layout.cache_dir.display()).as_str())
    );
}

#[test]
fn rewrite_replaces_previous_content() {
    let dir = TempDir::new().expect("tempdir");
    let layout = layout_in(dir.path(), &CLUSTER_AGENT);
    std::fs::create_dir_all(&layout.runtime.root).expect("runtime dir");
    std::fs::write(&layout.env_file, "STALE=1\n").expect("seed");
    let settings = resolve(&complete_settings(), CLUSTER_AGENT.schema, Some(&CLUSTER_AGENT.secret))
        .expect("complete");

    let written =
        write_environment(&HostFs, &layout, CLUSTER_AGENT.env_prefix, &settings).expect("write");

    assert_eq!(written, EnvWrite::Written);
    let content = std::fs::read_to_string(&layout.env_file).expect("env file");
    assert!(!content.contains("STALE"));
}

#[test]
fn same_settings_produce_identical_bytes() {
    let dir = TempDir::new().expect("tempdir");
    let layout = layout_in(dir.path(), &CLUSTER_AGENT);
    let settings = resolve(&complete_settings(), CLUSTER_AGENT.schema, Some(&CLUSTER_AGENT.secret))
        .expect("complete");

    write_environment(&HostFs, &layout, CLUSTER_AGENT.env_prefix, &settings).expect("first");
    let first = std::fs::read(&layout.env_file).expect("env file");
    let second =
        write_environment(&HostFs, &layout, CLUSTER_AGENT.env_prefix, &settings).expect("second");

    assert_eq!(second, EnvWrite::Unchanged);
    assert_eq!(std::fs::read(&layout.env_file).expect("env file"), first);
}

#[test]
fn header_change_rewrites_identical_settings() {
    let dir = TempDir::new().expect("tempdir");
    let mut layout = layout_in(dir.path(), &CLUSTER_AGENT);
    let settings = resolve(&complete_settings(), CLUSTER_AGENT.schema, Some(&CLUSTER_AGENT.secret))
        .expect("complete");
    write_environment(&HostFs, &layout, CLUSTER_AGENT.env_prefix, &settings).expect("first");

    layout.env_header = Some("CLUSTER_AGENT_LOG_LEVEL=DEBUG".into());
    let written =
        write_environment(&HostFs, &layout, CLUSTER_AGENT.env_prefix, &settings).expect("second");

    assert_eq!(written, EnvWrite::Written);
    let content = std::fs::read_to_string(&layout.env_file).expect("env file");
    assert!(content.starts_with("CLUSTER_AGENT_LOG_LEVEL=DEBUG\n"), "got: {content}");
}

#[test]
fn deleted_artifact_is_restored() {
    let dir = TempDir::new().expect("tempdir");
    let layout = layout_in(dir.path(), &CLUSTER_AGENT);
    let settings = resolve(&complete_settings(), CLUSTER_AGENT.schema, Some(&CLUSTER_AGENT.secret))
        .expect("complete");
    write_environment(&HostFs, &layout, CLUSTER_AGENT.env_prefix, &settings).expect("first");
    std::fs::remove_file(&layout.env_file).expect("remove");

    let written =
        write_environment(&HostFs, &layout, CLUSTER_AGENT.env_prefix, &settings).expect("second");

    assert_eq!(written, EnvWrite::Written);
    assert!(layout.env_file.exists());
}

#[test]
fn failed_write_names_the_file() {
    let dir = TempDir::new().expect("tempdir");
    let layout = layout_in(dir.path(), &CLUSTER_AGENT);
    std::fs::create_dir_all(&layout.cache_dir).expect("seed cache");
    let fs = ReadOnlyPath {
        inner: HostFs,
        denied: layout.env_file.clone(),
    };
    let settings = resolve(&complete_settings(), CLUSTER_AGENT.schema, Some(&CLUSTER_AGENT.secret))
        .expect("complete");

    let err = write_environment(&fs, &layout, CLUSTER_AGENT.env_prefix, &settings)
        .expect_err("write denied");

    match err.downcast_ref::<LifecycleError>() {
        Some(LifecycleError::EnvironmentWriteFailed { path }) => {
            assert_eq!(path, &layout.env_file.display().to_string());
        }
        other => panic!("expected EnvironmentWriteFailed, got {other:?}"),
    }
    assert!(layout.cache_dir.exists());
}
