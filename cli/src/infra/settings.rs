//! Infrastructure implementation of the `SettingsSource` port.

use std::path::PathBuf;

use agentctl_common::RawSettings;
use anyhow::{Context, Result};

use crate::application::ports::SettingsSource;

/// Reads raw agent settings from a YAML mapping on disk.
///
/// A missing file is an empty mapping; the resolver reports what is missing.
pub struct YamlSettingsSource {
    path: PathBuf,
}

impl YamlSettingsSource {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SettingsSource for YamlSettingsSource {
    fn load(&self) -> Result<RawSettings> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no settings file");
            return Ok(RawSettings::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(RawSettings::new());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", self.path.display()))
    }
}
