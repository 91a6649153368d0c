//! Show-version action: raw package metadata of the installed agent.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::output::TerminalReporter;

/// Run the show-version action.
///
/// # Errors
///
/// Returns an error if the package manager cannot report the agent package.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let reporter = TerminalReporter::new(&app.output);
    let info = app.machine(&reporter).show_version().await?;
    app.renderer().package_info(app.profile.package, &info)?;
    Ok(ExitCode::SUCCESS)
}
