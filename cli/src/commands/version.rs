//! Version command

use std::process::ExitCode;

use anyhow::Result;

use crate::output::Renderer;

/// Run the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(renderer: &Renderer<'_>) -> Result<ExitCode> {
    renderer.version(env!("CARGO_PKG_VERSION"))?;
    Ok(ExitCode::SUCCESS)
}
