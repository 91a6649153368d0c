//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio for
//! async process execution. Children are killed if their future is dropped.

use std::process::{Output, Stdio};

use anyhow::{Context, Result};
use tokio::process::Command;

use crate::application::ports::CommandRunner;

/// Production `CommandRunner`: spawns real processes and waits for them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    async fn output(program: &str, command: &mut Command) -> Result<Output> {
        let child = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;
        child
            .wait_with_output()
            .await
            .with_context(|| format!("waiting for {program}"))
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        tracing::debug!(program, ?args, "running command");
        Self::output(program, Command::new(program).args(args)).await
    }

    async fn run_clean_env(&self, program: &str, args: &[&str]) -> Result<Output> {
        tracing::debug!(program, ?args, "running command with empty environment");
        Self::output(program, Command::new(program).args(args).env_clear()).await
    }
}
