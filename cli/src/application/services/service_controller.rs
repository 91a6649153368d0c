//! Supervisor control, unit file provisioning, and health queries.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! Supervisor calls are best-effort: failures are logged and returned as
//! `BestEffort::Failed`, never as `Err`. Health is checked separately.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::{Context, Result};

use crate::application::ports::{LocalFs, Supervisor};
use crate::domain::error::ConfigError;
use crate::domain::outcome::BestEffort;
use crate::domain::units::{RenderContext, bundled_template, render_template};

/// Map a supervisor call result to a logged `BestEffort`.
fn best_effort(operation: &str, unit: &str, result: Result<Output>) -> BestEffort {
    match result {
        Ok(out) if out.status.success() => {
            tracing::debug!(unit = %unit, operation, "supervisor call succeeded");
            BestEffort::Done
        }
        Ok(out) => {
            let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
            tracing::error!(
                unit = %unit,
                operation,
                code = ?out.status.code(),
                stderr = %stderr,
                "supervisor call failed"
            );
            BestEffort::Failed(format!("{operation} {unit}: {stderr}"))
        }
        Err(e) => {
            tracing::error!(unit = %unit, operation, error = %format!("{e:#}"), "supervisor call failed");
            BestEffort::Failed(format!("{operation} {unit}: {e:#}"))
        }
    }
}

/// Drives the host supervisor and the unit files it reads.
pub struct ServiceController<'a, S: Supervisor, F: LocalFs> {
    supervisor: &'a S,
    fs: &'a F,
}

impl<'a, S: Supervisor, F: LocalFs> ServiceController<'a, S, F> {
    pub fn new(supervisor: &'a S, fs: &'a F) -> Self {
        Self { supervisor, fs }
    }

    pub async fn start(&self, unit: &str) -> BestEffort {
        best_effort("start", unit, self.supervisor.start(unit).await)
    }

    pub async fn stop(&self, unit: &str) -> BestEffort {
        best_effort("stop", unit, self.supervisor.stop(unit).await)
    }

    pub async fn restart(&self, unit: &str) -> BestEffort {
        best_effort("restart", unit, self.supervisor.restart(unit).await)
    }

    pub async fn enable(&self, unit: &str) -> BestEffort {
        best_effort("enable", unit, self.supervisor.enable(unit).await)
    }

    pub async fn disable(&self, unit: &str) -> BestEffort {
        best_effort("disable", unit, self.supervisor.disable(unit).await)
    }

    pub async fn daemon_reload(&self) -> BestEffort {
        best_effort("daemon-reload", "-", self.supervisor.daemon_reload().await)
    }

    /// `true` only when the supervisor exits 0 and reports `active`.
    pub async fn query_active(&self, unit: &str) -> bool {
        match self.supervisor.is_active(unit).await {
            Ok(out) => {
                let state = String::from_utf8_lossy(&out.stdout);
                let active = out.status.success() && state.trim() == "active";
                tracing::debug!(unit = %unit, state = %state.trim(), active, "queried unit state");
                active
            }
            Err(e) => {
                tracing::error!(unit = %unit, error = %format!("{e:#}"), "cannot query unit state");
                false
            }
        }
    }

    /// Load a unit template, preferring an override in `template_dir`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingTemplate` if neither an override nor a
    /// bundled template exists, or an I/O error if the override is unreadable.
    pub fn template_text(&self, template_dir: Option<&Path>, name: &str) -> Result<String> {
        if let Some(dir) = template_dir {
            let candidate = dir.join(name);
            if self.fs.exists(&candidate) {
                return self
                    .fs
                    .read_to_string(&candidate)
                    .with_context(|| format!("reading template override {}", candidate.display()));
            }
        }
        bundled_template(name)
            .map(str::to_string)
            .ok_or_else(|| ConfigError::MissingTemplate(name.to_string()).into())
    }

    /// Render `template` into `target`, then reload the supervisor.
    ///
    /// With no context the template is copied verbatim. A target that
    /// already holds the rendered text is left alone and no reload is
    /// issued. Returns whether the file was written.
    ///
    /// # Errors
    ///
    /// Returns an error if a placeholder is unresolved or the file cannot be
    /// written. A failed reload is logged only.
    pub async fn provision_unit(
        &self,
        template: &str,
        target: &Path,
        ctx: Option<&RenderContext>,
    ) -> Result<bool> {
        let text = match ctx {
            Some(ctx) => render_template(template, ctx)
                .with_context(|| format!("rendering {}", target.display()))?,
            None => template.to_string(),
        };
        if self.fs.exists(target) && self.fs.read_to_string(target).is_ok_and(|t| t == text) {
            tracing::debug!(path = %target.display(), "unit file up to date");
            return Ok(false);
        }
        if let Some(parent) = target.parent() {
            self.fs.create_dir_all(parent)?;
        }
        self.fs
            .write_atomic(target, &text)
            .with_context(|| format!("writing unit file {}", target.display()))?;
        tracing::info!(path = %target.display(), "unit file written");
        let _ = self.daemon_reload().await;
        Ok(true)
    }

    /// Stop and disable every unit, delete their files, then reload.
    ///
    /// Each step runs regardless of earlier failures. Missing files are fine.
    pub async fn teardown(&self, units: &[&str], files: &[PathBuf]) -> BestEffort {
        let mut outcome = BestEffort::Done;
        for unit in units {
            outcome = outcome
                .and(self.stop(unit).await)
                .and(self.disable(unit).await);
        }
        for file in files {
            if !self.fs.exists(file) {
                continue;
            }
            if let Err(e) = self.fs.remove_file(file) {
                tracing::error!(path = %file.display(), error = %format!("{e:#}"), "cannot remove unit file");
                outcome = outcome.and(BestEffort::Failed(format!("remove {}: {e:#}", file.display())));
            }
        }
        outcome.and(self.daemon_reload().await)
    }
}
