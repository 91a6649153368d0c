//! Package install sequence for the isolated runtime.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use agentctl_common::AgentProfile;
use anyhow::{Context, Result};

use crate::application::ports::{LocalFs, PackageInstaller, ProgressReporter};
use crate::application::services::cache::clear_cache_dir;
use crate::domain::config::{Layout, RuntimePrefix};
use crate::domain::outcome::BestEffort;

/// Provision the runtime, then install extras, the agent and any add-ons.
///
/// Bootstrap failures are logged and skipped; every later step propagates.
///
/// # Errors
///
/// Returns an error if the interpreter cannot be spawned or any install step
/// fails.
pub async fn install_agent(
    installer: &impl PackageInstaller,
    reporter: &impl ProgressReporter,
    profile: &AgentProfile,
    prefix: &RuntimePrefix,
    addons: &[String],
) -> Result<()> {
    reporter.step(&format!("creating runtime at {}...", prefix.root.display()));
    if let BestEffort::Failed(reason) = installer
        .provision(prefix)
        .await
        .context("creating isolated runtime")?
    {
        reporter.warn(&format!("runtime bootstrap incomplete: {reason}"));
    }

    reporter.step("installing runtime dependencies...");
    installer
        .install_extras(prefix, profile.extra_packages)
        .await
        .context("installing runtime dependencies")?;

    reporter.step(&format!("installing {}...", profile.package));
    installer
        .install_package(prefix, profile.package, None)
        .await
        .with_context(|| format!("installing {}", profile.package))?;

    for addon in addons {
        reporter.step(&format!("installing add-on {addon}..."));
        installer
            .install_addon(prefix, addon)
            .await
            .with_context(|| format!("installing add-on {addon}"))?;
    }
    tracing::info!(package = profile.package, addons = addons.len(), "package installed");
    Ok(())
}

/// Clear the agent cache, then pin the package with a single install call.
///
/// `version` must already have passed `validate_version`.
///
/// # Errors
///
/// Returns the cache or install failure.
pub async fn upgrade_agent(
    installer: &impl PackageInstaller,
    fs: &impl LocalFs,
    profile: &AgentProfile,
    layout: &Layout,
    version: &str,
) -> Result<()> {
    clear_cache_dir(fs, &layout.cache_dir)?;
    installer
        .install_package(&layout.runtime, profile.package, Some(version))
        .await
        .with_context(|| format!("upgrading {} to {version}", profile.package))?;
    tracing::info!(package = profile.package, version, "package upgraded");
    Ok(())
}
