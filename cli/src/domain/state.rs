//! Persisted agent state and lifecycle vocabulary.
//!
//! This module is intentionally free of I/O, async, and external layer imports.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::settings::ResolvedSettings;

/// Where the agent sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LifecyclePhase {
    #[default]
    Uninstalled,
    Installing,
    WaitingForConfig,
    Configured,
    Active,
    Blocked,
    Removed,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uninstalled => "uninstalled",
            Self::Installing => "installing",
            Self::WaitingForConfig => "waiting-for-config",
            Self::Configured => "configured",
            Self::Active => "active",
            Self::Blocked => "blocked",
            Self::Removed => "removed",
        })
    }
}

/// Operator-facing status category.
///
/// `Waiting` means more input is needed; `Blocked` means an error needs
/// investigation. The two call for different remediation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    #[default]
    Unknown,
    Maintenance,
    Waiting,
    Active,
    Blocked,
}

/// Status kind plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UnitStatus {
    pub kind: StatusKind,
    #[serde(default)]
    pub message: String,
}

impl UnitStatus {
    fn new(kind: StatusKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn maintenance(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Maintenance, message)
    }

    pub fn waiting(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Waiting, message)
    }

    pub fn active(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Active, message)
    }

    pub fn blocked(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Blocked, message)
    }
}

/// A host-originated lifecycle trigger. Serializable so deferred triggers
/// survive controller restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "trigger", rename_all = "kebab-case")]
pub enum Trigger {
    Install {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        addons: Vec<String>,
    },
    UpgradePackage,
    Start,
    ConfigChanged,
    StatusCheck,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Install { .. } => "install",
            Self::UpgradePackage => "upgrade-package",
            Self::Start => "start",
            Self::ConfigChanged => "config-changed",
            Self::StatusCheck => "status-check",
        })
    }
}

/// Agent state persisted between controller runs.
///
/// The last-applied settings are flattened to the top level, keyed by their
/// hyphenated setting names, next to the `installed` and `config_available`
/// flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub installed: bool,
    pub config_available: bool,
    #[serde(default)]
    pub phase: LifecyclePhase,
    #[serde(default)]
    pub status: UnitStatus,
    /// Version of the controller bundle that performed the install.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workload_version: Option<String>,
    /// Agent package version pinned by the last successful upgrade.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_version: Option<String>,
    /// Triggers waiting to be replayed, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deferred: Vec<Trigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub settings: ResolvedSettings,
}

impl AgentState {
    /// Queue a trigger for replay unless an identical one is already queued.
    pub fn defer(&mut self, trigger: Trigger) {
        if !self.deferred.contains(&trigger) {
            self.deferred.push(trigger);
        }
    }
}
