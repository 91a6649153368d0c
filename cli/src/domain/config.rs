//! Domain types for agentctl configuration and the resolved on-disk layout.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::path::{Path, PathBuf};

use agentctl_common::{AgentKind, AgentProfile};
use serde::{Deserialize, Serialize};

use crate::domain::env_file::ENV_FILE_NAME;
use crate::domain::units::RenderContext;

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_CONFIG_PATH: &str = "/etc/agentctl/config.yaml";
pub const DEFAULT_SETTINGS_PATH: &str = "/etc/agentctl/settings.yaml";
pub const DEFAULT_STATE_DIR: &str = "/var/lib/agentctl";
pub const DEFAULT_UNIT_DIR: &str = "/usr/lib/systemd/system";

// ── Config schema ────────────────────────────────────────────────────────────

/// Controller configuration stored in `/etc/agentctl/config.yaml`.
///
/// Every field is optional; unset paths fall back to the agent profile's
/// defaults. Unknown keys are rejected so typos do not pass silently.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AgentctlConfig {
    /// Which agent this controller manages.
    pub agent: AgentKind,
    /// YAML mapping of raw agent settings.
    pub settings_file: Option<PathBuf>,
    pub state_file: Option<PathBuf>,
    /// Isolated runtime root.
    pub prefix_dir: Option<PathBuf>,
    /// Interpreter used to create the runtime.
    pub python: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    /// Supervisor unit directory.
    pub unit_dir: Option<PathBuf>,
    /// Directory whose files override the bundled unit templates.
    pub template_dir: Option<PathBuf>,
    /// File holding the controller bundle version.
    pub version_file: Option<PathBuf>,
    /// Static block written verbatim at the top of the environment file.
    pub env_header: Option<String>,
    /// Add-on packages installed with every install.
    pub addons: Vec<String>,
}

// ── Layout ───────────────────────────────────────────────────────────────────

/// Isolated runtime location and the binaries inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePrefix {
    pub root: PathBuf,
    /// Interpreter used to create the runtime (lives outside it).
    pub python: PathBuf,
    /// Package manager inside the runtime.
    pub pip: PathBuf,
}

/// Concrete paths and static inputs for one managed agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub runtime: RuntimePrefix,
    pub env_file: PathBuf,
    pub cache_dir: PathBuf,
    pub unit_dir: PathBuf,
    pub state_file: PathBuf,
    pub settings_file: PathBuf,
    pub template_dir: Option<PathBuf>,
    pub version_file: Option<PathBuf>,
    pub env_header: Option<String>,
}

impl Layout {
    /// Resolve profile defaults and config overrides into concrete paths.
    #[must_use]
    pub fn resolve(config: &AgentctlConfig, profile: &AgentProfile) -> Self {
        let root = config
            .prefix_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(profile.runtime_dir));
        let runtime = RuntimePrefix {
            pip: root.join(profile.pip),
            python: config
                .python
                .clone()
                .unwrap_or_else(|| PathBuf::from(profile.python)),
            root,
        };
        Self {
            env_file: runtime.root.join(ENV_FILE_NAME),
            runtime,
            cache_dir: config
                .cache_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(profile.cache_dir)),
            unit_dir: config
                .unit_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UNIT_DIR)),
            state_file: config.state_file.clone().unwrap_or_else(|| {
                Path::new(DEFAULT_STATE_DIR).join(format!("{}-state.json", profile.kind))
            }),
            settings_file: config
                .settings_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH)),
            template_dir: config.template_dir.clone(),
            version_file: config.version_file.clone(),
            env_header: config.env_header.clone(),
        }
    }

    /// Path of a unit file under the supervisor unit directory.
    #[must_use]
    pub fn unit_path(&self, unit_name: &str) -> PathBuf {
        self.unit_dir.join(unit_name)
    }

    /// Placeholders available to every unit template.
    #[must_use]
    pub fn render_context(&self, profile: &AgentProfile) -> RenderContext {
        [
            ("package", profile.package.to_string()),
            ("prefix_dir", self.runtime.root.display().to_string()),
            ("env_file", self.env_file.display().to_string()),
            ("cache_dir", self.cache_dir.display().to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
