//! Status command: show the persisted agent state.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::output::TerminalReporter;

/// Run the status command.
///
/// # Errors
///
/// Returns an error if the state file exists but cannot be read.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let reporter = TerminalReporter::new(&app.output);
    let state = app.machine(&reporter).status().await?;
    app.renderer().state(app.profile.kind.as_str(), &state)?;
    Ok(ExitCode::SUCCESS)
}
