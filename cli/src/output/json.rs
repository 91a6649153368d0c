//! JSON output helpers.
//!
//! Provides the error-object formatter used by all `--json` code paths when
//! a command fails, and `JsonRenderer` for successful results.

use anyhow::{Context, Result};
use serde_json::{Map, Value, json};

use crate::domain::error::{InstallError, LifecycleError};
use crate::domain::outcome::Outcome;
use crate::domain::state::AgentState;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Stable machine-readable code for a failed command.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    if let Some(e) = err.downcast_ref::<LifecycleError>() {
        return match e {
            LifecycleError::NotInstalled { .. } => "NOT_INSTALLED",
            LifecycleError::UpgradeFailed { .. } => "UPGRADE_FAILED",
            LifecycleError::CacheClearFailed => "CACHE_CLEAR_FAILED",
            LifecycleError::EnvironmentWriteFailed { .. } => "ENV_WRITE_FAILED",
        };
    }
    if let Some(InstallError::InvalidVersion(_)) = err.downcast_ref::<InstallError>() {
        return "INVALID_VERSION";
    }
    "ERROR"
}

fn single(key: &str, value: &str) -> Value {
    let mut obj = Map::new();
    obj.insert(key.to_string(), Value::from(value));
    Value::Object(obj)
}

fn print(value: &Value) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("JSON serialization failed")?
    );
    Ok(())
}

/// Renders results as machine-readable JSON on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    /// Render the result of a lifecycle trigger with the resulting status.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_outcome(&self, trigger: &str, outcome: &Outcome, state: &AgentState) -> Result<()> {
        let mut obj = match outcome {
            Outcome::Completed(phase) => json!({
                "trigger": trigger,
                "outcome": "completed",
                "phase": phase,
            }),
            Outcome::Deferred(reason) => json!({
                "trigger": trigger,
                "outcome": "deferred",
                "reason": reason,
            }),
        };
        obj["status"] = serde_json::to_value(&state.status).context("serializing status")?;
        print(&obj)
    }

    /// Render a successful operator action as `{"<action>": "success"}`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_action(&self, action: &str) -> Result<()> {
        print(&single(action, "success"))
    }

    /// Render package metadata keyed by package name.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_package_info(&self, package: &str, info: &str) -> Result<()> {
        print(&single(package, info))
    }

    /// Render the persisted agent state verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_state(&self, state: &AgentState) -> Result<()> {
        print(&serde_json::to_value(state).context("serializing state")?)
    }

    /// Render the controller version.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        print(&json!({ "version": version }))
    }
}
