//! Clear-cache action.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::output::TerminalReporter;

/// Run the clear-cache-dir action.
///
/// # Errors
///
/// Returns an error if the cache directory exists but cannot be removed.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let reporter = TerminalReporter::new(&app.output);
    let cleared = app.machine(&reporter).clear_cache().await?;
    app.renderer().action("cache-clear", cleared.message())?;
    Ok(ExitCode::SUCCESS)
}
