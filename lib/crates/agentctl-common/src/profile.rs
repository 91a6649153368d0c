//! Built-in agent profiles.
//!
//! A profile captures everything that differs between the deployable agent
//! types: package name, supervised units, environment namespace, default
//! install locations, and the settings schema.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::settings::{SecretSource, SettingSpec};

/// Deployable agent type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum AgentKind {
    #[default]
    ClusterAgent,
    JobbergateAgent,
}

impl AgentKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClusterAgent => "cluster-agent",
            Self::JobbergateAgent => "jobbergate-agent",
        }
    }

    /// Static profile for this agent type.
    #[must_use]
    pub fn profile(self) -> &'static AgentProfile {
        match self {
            Self::ClusterAgent => &CLUSTER_AGENT,
            Self::JobbergateAgent => &JOBBERGATE_AGENT,
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of supervisor unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Service,
    Timer,
}

/// A template variable whose value is taken from an operator setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextVar {
    /// Placeholder name inside the template.
    pub name: &'static str,
    /// Setting key the value is read from.
    pub setting: &'static str,
    /// Used when the setting is unset.
    pub default: &'static str,
}

/// A supervisor unit provisioned from a bundled template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitSpec {
    /// Unit name, which is also the file name under the unit directory.
    pub name: &'static str,
    /// Template file name.
    pub template: &'static str,
    pub kind: UnitKind,
    pub context: &'static [ContextVar],
}

/// Everything agentctl needs to know about one agent type.
#[derive(Debug)]
pub struct AgentProfile {
    pub kind: AgentKind,
    /// Package name as known to the package index.
    pub package: &'static str,
    /// Prefix prepended to every generated environment variable.
    pub env_prefix: &'static str,
    /// Default isolated runtime location.
    pub runtime_dir: &'static str,
    /// Package manager binary, relative to the runtime root.
    pub pip: &'static str,
    /// Interpreter used to create the runtime.
    pub python: &'static str,
    pub cache_dir: &'static str,
    /// Auxiliary packages installed before the agent itself.
    pub extra_packages: &'static [&'static str],
    pub service: UnitSpec,
    pub timers: &'static [UnitSpec],
    pub schema: &'static [SettingSpec],
    pub secret: SecretSource,
}

impl AgentProfile {
    /// Every unit this profile provisions, service first.
    pub fn units(&self) -> impl Iterator<Item = &UnitSpec> {
        std::iter::once(&self.service).chain(self.timers.iter())
    }

    /// Unit whose activity reflects agent health.
    ///
    /// Timer-driven agents run a oneshot service, so the timer is the unit
    /// that stays active.
    #[must_use]
    pub fn health_unit(&self) -> &'static str {
        self.timers.first().map_or(self.service.name, |t| t.name)
    }
}

const SLURMRESTD_SECRET: SecretSource = SecretSource {
    by_path: "slurmrestd-jwt-key-path",
    by_value: "slurmrestd-jwt-key-string",
    use_path_flag: "slurmrestd-use-key-path",
};

const EXTRA_PACKAGES: &[&str] = &["uvicorn", "pyyaml"];

const CLUSTER_AGENT_SCHEMA: &[SettingSpec] = &[
    SettingSpec::required("base-api-url"),
    SettingSpec::required("base-slurmrestd-url"),
    SettingSpec::optional("slurm-restd-version"),
    SettingSpec::optional("slurmrestd-jwt-key-path"),
    SettingSpec::optional("slurmrestd-jwt-key-string"),
    SettingSpec::required("slurmrestd-use-key-path"),
    SettingSpec::optional("sentry-dsn"),
    SettingSpec::required("oidc-domain"),
    SettingSpec::required("oidc-audience"),
    SettingSpec::required("oidc-client-id"),
    SettingSpec::required("oidc-client-secret"),
    SettingSpec::optional("slurm-user-mapper"),
    SettingSpec::optional("ldap-domain"),
    SettingSpec::optional("ldap-username"),
    SettingSpec::optional("ldap-password"),
    SettingSpec::optional("ldap-auth-type"),
    SettingSpec::required("x-slurm-user-name"),
];

const JOBBERGATE_AGENT_SCHEMA: &[SettingSpec] = &[
    SettingSpec::required("base-api-url"),
    SettingSpec::required("base-slurmrestd-url"),
    SettingSpec::optional("slurm-restd-version"),
    SettingSpec::optional("slurmrestd-jwt-key-path"),
    SettingSpec::optional("slurmrestd-jwt-key-string"),
    SettingSpec::required("slurmrestd-use-key-path"),
    SettingSpec::optional("sentry-dsn"),
    SettingSpec::required("oidc-domain"),
    SettingSpec::required("oidc-audience"),
    SettingSpec::required("oidc-client-id"),
    SettingSpec::required("oidc-client-secret"),
    SettingSpec::optional("slurm-user-mapper"),
    SettingSpec::required("x-slurm-user-name"),
    SettingSpec::optional("task-jobs-interval-seconds"),
    SettingSpec::optional("task-garbage-collection-hour"),
    SettingSpec::optional("write-submission-files"),
];

pub static CLUSTER_AGENT: AgentProfile = AgentProfile {
    kind: AgentKind::ClusterAgent,
    package: "ovs-cluster-agent",
    env_prefix: "CLUSTER_AGENT_",
    runtime_dir: "/srv/ovs-cluster-agent-venv",
    pip: "bin/pip3.8",
    python: "/usr/bin/python3.8",
    cache_dir: "/var/cache/cluster-agent",
    extra_packages: EXTRA_PACKAGES,
    service: UnitSpec {
        name: "ovs-cluster-agent.service",
        template: "ovs-cluster-agent.service",
        kind: UnitKind::Service,
        context: &[],
    },
    timers: &[UnitSpec {
        name: "ovs-cluster-agent.timer",
        template: "ovs-cluster-agent.timer",
        kind: UnitKind::Timer,
        context: &[ContextVar {
            name: "stat_interval",
            setting: "stat-interval",
            default: "60",
        }],
    }],
    schema: CLUSTER_AGENT_SCHEMA,
    secret: SLURMRESTD_SECRET,
};

pub static JOBBERGATE_AGENT: AgentProfile = AgentProfile {
    kind: AgentKind::JobbergateAgent,
    package: "jobbergate-agent",
    env_prefix: "JOBBERGATE_AGENT_",
    runtime_dir: "/srv/jobbergate-agent-venv",
    pip: "bin/pip",
    python: "/opt/python/python3.12/bin/python3.12",
    cache_dir: "/var/cache/jobbergate-agent",
    extra_packages: EXTRA_PACKAGES,
    service: UnitSpec {
        name: "jobbergate-agent.service",
        template: "jobbergate-agent.service",
        kind: UnitKind::Service,
        context: &[],
    },
    timers: &[],
    schema: JOBBERGATE_AGENT_SCHEMA,
    secret: SLURMRESTD_SECRET,
};
