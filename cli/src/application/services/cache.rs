//! Agent cache directory clearing.
//!
//! The agent recreates its cache on the next run, so clearing only removes.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::LocalFs;

/// What `clear_cache_dir` found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheClear {
    Cleared,
    AlreadyClear,
}

impl CacheClear {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Cleared => "Cache cleared",
            Self::AlreadyClear => "Cache dir doesn't exist. Skipping.",
        }
    }
}

impl fmt::Display for CacheClear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Remove the cache directory if it exists.
///
/// # Errors
///
/// Returns an error if the directory exists but cannot be removed.
pub fn clear_cache_dir(fs: &impl LocalFs, dir: &Path) -> Result<CacheClear> {
    if !fs.exists(dir) {
        tracing::debug!(path = %dir.display(), "cache dir absent");
        return Ok(CacheClear::AlreadyClear);
    }
    tracing::debug!(path = %dir.display(), "clearing cache dir");
    fs.remove_dir_all(dir)
        .with_context(|| format!("clearing cache dir {}", dir.display()))?;
    Ok(CacheClear::Cleared)
}
