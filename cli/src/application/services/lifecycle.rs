//! Lifecycle state machine: sequences install, configuration, start,
//! health checks, operator actions and removal against the persisted
//! `AgentState`.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! Every transition runs to completion on a loaded state, which is saved
//! afterwards even when the transition fails.

use std::path::PathBuf;

use agentctl_common::{AgentProfile, RawSettings};
use anyhow::{Context, Result};
use chrono::Utc;

use crate::application::ports::{
    AgentStateStore, LocalFs, PackageInstaller, ProgressReporter, Supervisor,
};
use crate::application::services::cache::{CacheClear, clear_cache_dir};
use crate::application::services::env_writer::{EnvWrite, write_environment};
use crate::application::services::package::{install_agent, upgrade_agent};
use crate::application::services::service_controller::ServiceController;
use crate::domain::config::Layout;
use crate::domain::error::LifecycleError;
use crate::domain::outcome::{BestEffort, Outcome};
use crate::domain::package::validate_version;
use crate::domain::settings::resolve;
use crate::domain::state::{AgentState, LifecyclePhase, Trigger, UnitStatus};
use crate::domain::units::unit_context;

/// Orchestrates one managed agent through its ports.
pub struct LifecycleMachine<'a, P, S, F, St, R>
where
    P: PackageInstaller,
    S: Supervisor,
    F: LocalFs,
    St: AgentStateStore,
    R: ProgressReporter,
{
    installer: &'a P,
    supervisor: &'a S,
    fs: &'a F,
    store: &'a St,
    reporter: &'a R,
    profile: &'static AgentProfile,
    layout: &'a Layout,
}

impl<'a, P, S, F, St, R> LifecycleMachine<'a, P, S, F, St, R>
where
    P: PackageInstaller,
    S: Supervisor,
    F: LocalFs,
    St: AgentStateStore,
    R: ProgressReporter,
{
    pub fn new(
        installer: &'a P,
        supervisor: &'a S,
        fs: &'a F,
        store: &'a St,
        reporter: &'a R,
        profile: &'static AgentProfile,
        layout: &'a Layout,
    ) -> Self {
        Self {
            installer,
            supervisor,
            fs,
            store,
            reporter,
            profile,
            layout,
        }
    }

    fn controller(&self) -> ServiceController<'a, S, F> {
        ServiceController::new(self.supervisor, self.fs)
    }

    async fn load(&self) -> Result<AgentState> {
        Ok(self.store.load_async().await?.unwrap_or_default())
    }

    async fn save(&self, state: &mut AgentState) -> Result<()> {
        state.updated_at = Some(Utc::now());
        self.store.save_async(state).await
    }

    /// Persisted state, or the default when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the state store cannot be read.
    pub async fn status(&self) -> Result<AgentState> {
        self.load().await
    }

    // ── Trigger dispatch ─────────────────────────────────────────────────────

    /// Replay deferred triggers, then run `trigger`.
    ///
    /// A deferred result queues the trigger for the next dispatch. A queued
    /// trigger equal to `trigger` is dropped because it runs now anyway.
    ///
    /// # Errors
    ///
    /// Returns an error if `trigger` fails outright or the state cannot be
    /// loaded or saved. Deferral is not an error.
    pub async fn dispatch(&self, trigger: Trigger, raw: &RawSettings) -> Result<Outcome> {
        let mut state = self.load().await?;

        let queued = std::mem::take(&mut state.deferred);
        for pending in queued.into_iter().filter(|t| *t != trigger) {
            tracing::info!(trigger = %pending, "replaying deferred trigger");
            match self.apply(&mut state, &pending, raw).await {
                Ok(Outcome::Completed(phase)) => {
                    tracing::info!(trigger = %pending, phase = %phase, "deferred trigger completed");
                }
                Ok(Outcome::Deferred(reason)) => {
                    tracing::warn!(trigger = %pending, reason = %reason, "trigger deferred again");
                    state.defer(pending);
                }
                Err(e) => {
                    tracing::error!(trigger = %pending, error = %format!("{e:#}"), "deferred trigger failed");
                    state.defer(pending);
                }
            }
        }

        let result = self.apply(&mut state, &trigger, raw).await;
        match &result {
            Ok(Outcome::Deferred(reason)) => {
                tracing::warn!(trigger = %trigger, reason = %reason, "trigger deferred");
                state.defer(trigger);
            }
            Ok(Outcome::Completed(phase)) => {
                tracing::info!(trigger = %trigger, phase = %phase, "trigger completed");
            }
            Err(_) => {}
        }

        let saved = self.save(&mut state).await;
        let outcome = result?;
        saved?;
        Ok(outcome)
    }

    async fn apply(
        &self,
        state: &mut AgentState,
        trigger: &Trigger,
        raw: &RawSettings,
    ) -> Result<Outcome> {
        match trigger {
            Trigger::Install { addons } => Ok(self.install(state, addons, raw).await),
            Trigger::UpgradePackage => {
                self.record_workload_version(state);
                Ok(Outcome::Completed(state.phase))
            }
            Trigger::Start => Ok(self.start(state).await),
            Trigger::ConfigChanged => self.config_changed(state, raw).await,
            Trigger::StatusCheck => Ok(self.status_check(state).await),
        }
    }

    // ── Transitions ──────────────────────────────────────────────────────────

    async fn install(&self, state: &mut AgentState, addons: &[String], raw: &RawSettings) -> Outcome {
        let package = self.profile.package;
        let was_running = state.phase == LifecyclePhase::Active;
        state.phase = LifecyclePhase::Installing;
        state.status = UnitStatus::maintenance(format!("Installing {package}"));
        self.record_workload_version(state);

        match self.install_steps(addons, raw).await {
            Ok(()) if was_running && state.config_available => {
                state.installed = true;
                self.reporter.success(&format!("{package} installed"));
                self.settle_health(state, format!("{package} installed"), "is not active")
                    .await
            }
            Ok(()) => {
                state.installed = true;
                state.phase = if state.config_available {
                    LifecyclePhase::Configured
                } else {
                    LifecyclePhase::WaitingForConfig
                };
                state.status = UnitStatus::waiting(format!("{package} installed"));
                self.reporter.success(&format!("{package} installed"));
                Outcome::Completed(state.phase)
            }
            Err(e) => {
                tracing::error!(package, error = %format!("{e:#}"), "install failed");
                state.installed = false;
                state.phase = LifecyclePhase::Blocked;
                state.status = UnitStatus::blocked(format!("Error installing {package}"));
                Outcome::Deferred(format!("Error installing {package}: {e:#}"))
            }
        }
    }

    async fn install_steps(&self, addons: &[String], raw: &RawSettings) -> Result<()> {
        install_agent(
            self.installer,
            self.reporter,
            self.profile,
            &self.layout.runtime,
            addons,
        )
        .await?;
        clear_cache_dir(self.fs, &self.layout.cache_dir)?;

        self.reporter.step("installing supervisor units...");
        self.provision_units(raw, false).await?;

        let ctl = self.controller();
        let mut enabled = BestEffort::Done;
        for unit in self.profile.units() {
            enabled = enabled.and(ctl.enable(unit.name).await);
        }
        if let BestEffort::Failed(reason) = enabled {
            self.reporter.warn(&format!("could not enable every unit: {reason}"));
        }
        Ok(())
    }

    /// Render and write unit files. With `settings_backed_only`, units whose
    /// templates take no settings are skipped. Returns the names of the units
    /// whose files changed.
    async fn provision_units(
        &self,
        raw: &RawSettings,
        settings_backed_only: bool,
    ) -> Result<Vec<&'static str>> {
        let ctl = self.controller();
        let base = self.layout.render_context(self.profile);
        let mut changed = Vec::new();
        for unit in self.profile.units() {
            if settings_backed_only && unit.context.is_empty() {
                continue;
            }
            let template = ctl.template_text(self.layout.template_dir.as_deref(), unit.template)?;
            let ctx = unit_context(&base, unit, raw);
            if ctl
                .provision_unit(&template, &self.layout.unit_path(unit.name), Some(&ctx))
                .await?
            {
                changed.push(unit.name);
            }
        }
        Ok(changed)
    }

    async fn config_changed(&self, state: &mut AgentState, raw: &RawSettings) -> Result<Outcome> {
        let package = self.profile.package;
        if !state.installed {
            return Ok(Outcome::Deferred(format!("{package} is not installed")));
        }

        let resolved = match resolve(raw, self.profile.schema, Some(&self.profile.secret)) {
            Ok(resolved) => resolved,
            Err(incomplete) => {
                state.config_available = false;
                state.status = UnitStatus::waiting(incomplete.to_string());
                return Ok(Outcome::Deferred(incomplete.to_string()));
            }
        };

        let was_running = state.phase == LifecyclePhase::Active
            || (state.phase == LifecyclePhase::Blocked && state.config_available);
        let snapshot_changed = !state.config_available || state.settings != resolved;

        self.reporter.step("writing environment file...");
        let env_prefix = self.profile.env_prefix;
        let written = match write_environment(self.fs, self.layout, env_prefix, &resolved) {
            Ok(written) => written,
            Err(e) => {
                state.config_available = false;
                state.status = UnitStatus::blocked(format!("{e}"));
                return Err(e);
            }
        };
        state.settings = resolved;
        state.config_available = true;
        let units_changed = self.provision_units(raw, true).await?;

        if written == EnvWrite::Written {
            if let Err(e) = clear_cache_dir(self.fs, &self.layout.cache_dir) {
                tracing::error!(error = %format!("{e:#}"), "cache clear after configuration failed");
                state.status = UnitStatus::blocked(LifecycleError::CacheClearFailed.to_string());
                return Err(e.context(LifecycleError::CacheClearFailed));
            }
        }

        if !snapshot_changed && written == EnvWrite::Unchanged && units_changed.is_empty() {
            tracing::info!(package, "configuration unchanged");
            return Ok(Outcome::Completed(state.phase));
        }

        if was_running {
            let ctl = self.controller();
            let mut restarted = ctl.restart(self.profile.service.name).await;
            for unit in &units_changed {
                restarted = restarted.and(ctl.restart(unit).await);
            }
            if let BestEffort::Failed(reason) = restarted {
                self.reporter.warn(&reason);
            }
            return Ok(self
                .settle_health(state, format!("{package} restarted"), "is not active after restart")
                .await);
        }

        state.phase = LifecyclePhase::Configured;
        state.status = UnitStatus::waiting("configuration written");
        Ok(Outcome::Completed(state.phase))
    }

    async fn start(&self, state: &mut AgentState) -> Outcome {
        let package = self.profile.package;
        if !state.installed {
            return Outcome::Deferred(format!("{package} is not installed"));
        }
        if !state.config_available {
            state.status = UnitStatus::waiting("waiting for configuration");
            return Outcome::Deferred("configuration is not available".to_string());
        }

        let ctl = self.controller();
        let service = self.profile.service.name;
        let mut started = ctl.enable(service).await.and(ctl.start(service).await);
        for timer in self.profile.timers {
            started = started.and(ctl.start(timer.name).await);
        }
        if let BestEffort::Failed(reason) = started {
            self.reporter.warn(&reason);
        }
        self.settle_health(state, format!("{package} started"), "is not active")
            .await
    }

    async fn status_check(&self, state: &mut AgentState) -> Outcome {
        let watched = matches!(state.phase, LifecyclePhase::Active | LifecyclePhase::Blocked);
        if !(state.installed && state.config_available && watched) {
            return Outcome::Completed(state.phase);
        }
        let package = self.profile.package;
        self.settle_health(state, format!("{package} running"), "is not active")
            .await
    }

    /// Query the health unit and record `active` or `blocked`.
    async fn settle_health(&self, state: &mut AgentState, ok: String, failure: &str) -> Outcome {
        let unit = self.profile.health_unit();
        if self.controller().query_active(unit).await {
            state.phase = LifecyclePhase::Active;
            state.status = UnitStatus::active(ok);
        } else {
            state.phase = LifecyclePhase::Blocked;
            state.status = UnitStatus::blocked(format!("{unit} {failure}"));
        }
        Outcome::Completed(state.phase)
    }

    fn record_workload_version(&self, state: &mut AgentState) {
        let Some(path) = self.layout.version_file.as_deref() else {
            return;
        };
        match self.fs.read_to_string(path) {
            Ok(version) => state.workload_version = Some(version.trim().to_string()),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %format!("{e:#}"), "cannot read version file");
            }
        }
    }

    // ── Operator actions ─────────────────────────────────────────────────────

    /// Pin the agent to `version`.
    ///
    /// # Errors
    ///
    /// Returns `InstallError::InvalidVersion` before touching anything if the
    /// version is malformed, `LifecycleError::NotInstalled` if nothing is
    /// installed, or
    /// `LifecycleError::UpgradeFailed` (with the cause attached) when the
    /// install fails. The blocked status is saved before returning.
    pub async fn upgrade(&self, version: &str) -> Result<()> {
        validate_version(version)?;
        let mut state = self.load().await?;
        if !state.installed {
            anyhow::bail!(LifecycleError::NotInstalled {
                package: self.profile.package.to_string(),
            });
        }

        self.reporter.step(&format!("upgrading {} to {version}...", self.profile.package));
        let result = upgrade_agent(self.installer, self.fs, self.profile, self.layout, version).await;
        match &result {
            Ok(()) => {
                state.phase = LifecyclePhase::Active;
                state.agent_version = Some(version.to_string());
                state.status = UnitStatus::active(format!("Updated to version {version}"));
            }
            Err(e) => {
                tracing::error!(version, error = %format!("{e:#}"), "upgrade failed");
                state.phase = LifecyclePhase::Blocked;
                state.status = UnitStatus::blocked(format!("Error updating to version {version}"));
            }
        }
        self.save(&mut state).await?;
        result.map_err(|e| {
            e.context(LifecycleError::UpgradeFailed {
                version: version.to_string(),
            })
        })
    }

    /// Clear the agent cache directory.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::CacheClearFailed` if the directory exists but
    /// cannot be removed. The blocked status is saved before returning.
    pub async fn clear_cache(&self) -> Result<CacheClear> {
        let mut state = self.load().await?;
        let result = clear_cache_dir(self.fs, &self.layout.cache_dir);
        match &result {
            Ok(cleared) => state.status = UnitStatus::active(cleared.message()),
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "cache clear failed");
                state.status = UnitStatus::blocked(LifecycleError::CacheClearFailed.to_string());
            }
        }
        self.save(&mut state).await?;
        result.map_err(|e| e.context(LifecycleError::CacheClearFailed))
    }

    /// Raw package metadata of the installed agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the package manager cannot report the package.
    pub async fn show_version(&self) -> Result<String> {
        self.installer
            .query_version(&self.layout.runtime, self.profile.package)
            .await
            .with_context(|| format!("querying {} version", self.profile.package))
    }

    /// Tear down units, delete the runtime prefix and forget all state.
    ///
    /// Safe to run repeatedly; missing pieces are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime prefix or the state cannot be deleted.
    /// Supervisor failures are logged only.
    pub async fn remove(&self) -> Result<Outcome> {
        let units: Vec<&str> = self.profile.units().map(|u| u.name).collect();
        let files: Vec<PathBuf> = units.iter().map(|u| self.layout.unit_path(u)).collect();

        self.reporter.step("stopping and removing units...");
        if let BestEffort::Failed(reason) = self.controller().teardown(&units, &files).await {
            self.reporter.warn(&format!("teardown incomplete: {reason}"));
        }

        let root = &self.layout.runtime.root;
        if self.fs.exists(root) {
            self.reporter.step(&format!("removing {}...", root.display()));
            self.fs
                .remove_dir_all(root)
                .with_context(|| format!("removing runtime {}", root.display()))?;
        }

        self.store.clear_async().await?;
        tracing::info!(package = self.profile.package, "agent removed");
        Ok(Outcome::Completed(LifecyclePhase::Removed))
    }
}
