//! Environment artifact writing.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::Result;

use crate::application::ports::LocalFs;
use crate::domain::config::Layout;
use crate::domain::env_file::render;
use crate::domain::error::LifecycleError;
use crate::domain::settings::ResolvedSettings;

/// Whether `write_environment` had to touch the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvWrite {
    /// The file on disk already held the rendered bytes.
    Unchanged,
    Written,
}

/// Render the environment artifact and atomically replace the file when its
/// bytes differ. A missing or unreadable file counts as different.
///
/// # Errors
///
/// Returns `LifecycleError::EnvironmentWriteFailed` if the artifact cannot be
/// written.
pub fn write_environment(
    fs: &impl LocalFs,
    layout: &Layout,
    env_prefix: &str,
    settings: &ResolvedSettings,
) -> Result<EnvWrite> {
    let content = render(
        settings,
        env_prefix,
        layout.env_header.as_deref(),
        &layout.cache_dir,
    );
    let path = &layout.env_file;
    if fs.exists(path) && fs.read_to_string(path).is_ok_and(|current| current == content) {
        tracing::debug!(path = %path.display(), "environment file up to date");
        return Ok(EnvWrite::Unchanged);
    }

    let written = path
        .parent()
        .map_or(Ok(()), |parent| fs.create_dir_all(parent))
        .and_then(|()| fs.write_atomic(path, &content));
    if let Err(e) = written {
        tracing::error!(path = %path.display(), error = %format!("{e:#}"), "cannot write environment file");
        return Err(e.context(LifecycleError::EnvironmentWriteFailed {
            path: path.display().to_string(),
        }));
    }
    tracing::info!(path = %path.display(), keys = settings.len(), "environment file written");
    Ok(EnvWrite::Written)
}
