//! Application context: unified state passed to every command handler.
//!
//! `AppContext` loads the controller config once, resolves the agent profile
//! and layout, and owns the production adapters. Commands build a
//! `LifecycleMachine` from it with their own progress reporter.

use std::path::PathBuf;

use agentctl_common::{AgentKind, AgentProfile};
use anyhow::Result;

use crate::application::ports::{ConfigStore, ProgressReporter};
use crate::application::services::lifecycle::LifecycleMachine;
use crate::domain::config::{AgentctlConfig, Layout};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::YamlConfigStore;
use crate::infra::fs::HostFs;
use crate::infra::pip::PipInstaller;
use crate::infra::settings::YamlSettingsSource;
use crate::infra::state::StateManager;
use crate::infra::systemd::SystemctlSupervisor;
use crate::output::{OutputContext, Renderer};

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Explicit config file path.
    pub config: Option<PathBuf>,
    /// Agent override; wins over the config file.
    pub agent: Option<AgentKind>,
    /// Settings file override; wins over the config file.
    pub settings: Option<PathBuf>,
}

/// Production lifecycle machine type.
pub type HostMachine<'a, R> = LifecycleMachine<
    'a,
    PipInstaller<TokioCommandRunner>,
    SystemctlSupervisor<TokioCommandRunner>,
    HostFs,
    StateManager,
    R,
>;

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Whether results are rendered as JSON.
    pub json: bool,
    /// Loaded controller configuration, with CLI overrides applied.
    pub config: AgentctlConfig,
    /// Where the configuration was loaded from.
    pub config_path: PathBuf,
    pub profile: &'static AgentProfile,
    pub layout: Layout,
    pub installer: PipInstaller<TokioCommandRunner>,
    pub supervisor: SystemctlSupervisor<TokioCommandRunner>,
    pub fs: HostFs,
    pub state_mgr: StateManager,
    pub settings: YamlSettingsSource,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or
    /// parsed.
    pub fn new(flags: AppFlags) -> Result<Self> {
        let store = YamlConfigStore::locate(flags.config);
        let mut config = store.load()?;
        if let Some(agent) = flags.agent {
            config.agent = agent;
        }
        if let Some(settings) = flags.settings {
            config.settings_file = Some(settings);
        }

        let profile = config.agent.profile();
        let layout = Layout::resolve(&config, profile);
        tracing::debug!(
            agent = %config.agent,
            config = %store.path().display(),
            state = %layout.state_file.display(),
            "context resolved"
        );

        let json = flags.output.json;
        Ok(Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet || json),
            json,
            config_path: store.path(),
            profile,
            state_mgr: StateManager::with_path(layout.state_file.clone()),
            settings: YamlSettingsSource::new(layout.settings_file.clone()),
            installer: PipInstaller::new(TokioCommandRunner::new()),
            supervisor: SystemctlSupervisor::new(TokioCommandRunner::new()),
            fs: HostFs,
            layout,
            config,
        })
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        Renderer::for_mode(self.json, &self.output)
    }

    /// Lifecycle machine wired to the production adapters.
    pub fn machine<'a, R: ProgressReporter>(&'a self, reporter: &'a R) -> HostMachine<'a, R> {
        LifecycleMachine::new(
            &self.installer,
            &self.supervisor,
            &self.fs,
            &self.state_mgr,
            reporter,
            self.profile,
            &self.layout,
        )
    }
}
