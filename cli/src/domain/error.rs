//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Lifecycle errors ──────────────────────────────────────────────────────────

/// Errors surfaced synchronously by operator-invoked actions.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("{package} is not installed. Run 'agentctl install' first.")]
    NotInstalled { package: String },

    #[error("Error updating to version {version}")]
    UpgradeFailed { version: String },

    #[error("Error clearing cache")]
    CacheClearFailed,

    #[error("Error writing environment file {path}")]
    EnvironmentWriteFailed { path: String },
}

// ── Install errors ────────────────────────────────────────────────────────────

/// Errors from the isolated-runtime package manager.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("`{command}` exited with {}: {stderr}", exit_code_display(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Invalid package version '{0}': only letters, digits and . + ! _ - are allowed")]
    InvalidVersion(String),
}

#[allow(clippy::ref_option)]
fn exit_code_display(code: &Option<i32>) -> String {
    code.map_or_else(|| "a signal".to_string(), |c| format!("code {c}"))
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to controller configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unit template '{0}' is not bundled and no template_dir is configured")]
    MissingTemplate(String),
}

// ── Template errors ───────────────────────────────────────────────────────────

/// Errors from rendering unit templates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template placeholder '{{{{ {0} }}}}' has no value")]
    Unresolved(String),

    #[error("Unterminated placeholder in template starting at byte {0}")]
    Unterminated(usize),
}
