//! Upgrade action: pin the agent package to a version.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::commands::UpgradeArgs;
use crate::output::TerminalReporter;

/// Run the upgrade action.
///
/// # Errors
///
/// Returns an error if the agent is not installed or the pinned install
/// fails. The blocked status is persisted either way.
pub async fn run(app: &AppContext, args: &UpgradeArgs) -> Result<ExitCode> {
    let reporter = TerminalReporter::new(&app.output);
    app.machine(&reporter).upgrade(&args.target_version).await?;
    app.renderer()
        .action("upgrade", &format!("Updated to version {}", args.target_version))?;
    Ok(ExitCode::SUCCESS)
}
