//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and `agentctl_common`: never
//! from `crate::infra`, `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;

use agentctl_common::RawSettings;
use anyhow::Result;

use crate::domain::config::{AgentctlConfig, RuntimePrefix};
use crate::domain::outcome::BestEffort;
use crate::domain::state::AgentState;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
///
/// Calls block until the child exits; there is no timeout.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program with the inherited environment and capture its output.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with an empty environment and capture its output.
    async fn run_clean_env(&self, program: &str, args: &[&str]) -> Result<Output>;
}

// ── Package Installer Port ────────────────────────────────────────────────────

/// Installs the agent and its dependencies into an isolated runtime prefix.
#[allow(async_fn_in_trait)]
pub trait PackageInstaller {
    /// Create the runtime and upgrade its package manager.
    ///
    /// A failing bootstrap step is logged and returned as
    /// `BestEffort::Failed`; only a spawn failure is an `Err`.
    async fn provision(&self, prefix: &RuntimePrefix) -> Result<BestEffort>;
    /// Install helper packages the agent needs at runtime.
    async fn install_extras(&self, prefix: &RuntimePrefix, packages: &[&str]) -> Result<()>;
    /// Install or upgrade the agent package, optionally pinned.
    async fn install_package(
        &self,
        prefix: &RuntimePrefix,
        name: &str,
        version: Option<&str>,
    ) -> Result<()>;
    /// Install or upgrade an operator-named add-on requirement.
    async fn install_addon(&self, prefix: &RuntimePrefix, spec: &str) -> Result<()>;
    /// Raw package metadata for `name`, trimmed.
    async fn query_version(&self, prefix: &RuntimePrefix, name: &str) -> Result<String>;
}

// ── Supervisor Port ───────────────────────────────────────────────────────────

/// Host service supervisor operations on a named unit.
///
/// Implementations return the raw process output; callers decide what a
/// non-zero exit means.
#[allow(async_fn_in_trait)]
pub trait Supervisor {
    async fn start(&self, unit: &str) -> Result<Output>;
    async fn stop(&self, unit: &str) -> Result<Output>;
    async fn restart(&self, unit: &str) -> Result<Output>;
    async fn enable(&self, unit: &str) -> Result<Output>;
    async fn disable(&self, unit: &str) -> Result<Output>;
    /// Re-read unit files from disk.
    async fn daemon_reload(&self) -> Result<Output>;
    /// Query whether `unit` is active. Stdout carries the state word.
    async fn is_active(&self, unit: &str) -> Result<Output>;
}

// ── State and Filesystem Ports ────────────────────────────────────────────────

/// Abstracts agent state persistence (load/save/clear).
#[allow(async_fn_in_trait)]
pub trait AgentStateStore {
    /// Load the persisted state, returning `None` if no state exists.
    async fn load_async(&self) -> Result<Option<AgentState>>;
    /// Persist the given state.
    async fn save_async(&self, state: &AgentState) -> Result<()>;
    /// Delete the persisted state. Missing state is not an error.
    async fn clear_async(&self) -> Result<()>;
}

/// Abstracts raw local filesystem operations for testability.
pub trait LocalFs {
    /// Returns `true` if the path exists.
    fn exists(&self, path: &Path) -> bool;
    /// Create a directory and all its parents.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    /// Remove a directory and all its contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be removed.
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    /// Remove a single file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be removed.
    fn remove_file(&self, path: &Path) -> Result<()>;
    /// Replace `path` with `content` so readers never see a partial file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or persisted.
    fn write_atomic(&self, path: &Path, content: &str) -> Result<()>;
    /// Read a UTF-8 file to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn read_to_string(&self, path: &Path) -> Result<String>;
}

// ── Configuration Ports ───────────────────────────────────────────────────────

/// Abstracts loading the controller configuration.
pub trait ConfigStore {
    /// Load the configuration, returning defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<AgentctlConfig>;
    /// Path the configuration is loaded from.
    fn path(&self) -> PathBuf;
}

/// Abstracts loading the raw agent settings supplied by the operator.
pub trait SettingsSource {
    /// Load the raw settings mapping. A missing source is an empty mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the source exists but cannot be read or parsed.
    fn load(&self) -> Result<RawSettings>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait: no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
