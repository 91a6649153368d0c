//! Infrastructure implementation of the `Supervisor` port.
//!
//! `SystemctlSupervisor<R>` routes every supervisor call through a
//! `CommandRunner` as `systemctl <operation> [unit]`.

use std::process::Output;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, Supervisor};

const SYSTEMCTL: &str = "systemctl";

/// Infrastructure adapter over `systemctl`.
pub struct SystemctlSupervisor<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> SystemctlSupervisor<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    async fn systemctl(&self, args: &[&str]) -> Result<Output> {
        self.runner
            .run(SYSTEMCTL, args)
            .await
            .with_context(|| format!("systemctl {}", args.join(" ")))
    }
}

impl<R: CommandRunner> Supervisor for SystemctlSupervisor<R> {
    async fn start(&self, unit: &str) -> Result<Output> {
        self.systemctl(&["start", unit]).await
    }

    async fn stop(&self, unit: &str) -> Result<Output> {
        self.systemctl(&["stop", unit]).await
    }

    async fn restart(&self, unit: &str) -> Result<Output> {
        self.systemctl(&["restart", unit]).await
    }

    async fn enable(&self, unit: &str) -> Result<Output> {
        self.systemctl(&["enable", unit]).await
    }

    async fn disable(&self, unit: &str) -> Result<Output> {
        self.systemctl(&["disable", unit]).await
    }

    async fn daemon_reload(&self) -> Result<Output> {
        self.systemctl(&["daemon-reload"]).await
    }

    async fn is_active(&self, unit: &str) -> Result<Output> {
        self.systemctl(&["is-active", unit]).await
    }
}
