//! JSON file store for `AgentState`.
//!
//! Blocking file work runs on `spawn_blocking`. Saves go through a sibling
//! temp file that is persisted over the old state, mode 0600.

use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::application::ports::AgentStateStore;
use crate::domain::state::AgentState;

/// Owns one agent's state file.
pub struct StateManager {
    path: PathBuf,
}

impl StateManager {
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// `None` when no state has been saved yet.
    fn load_sync(&self) -> Result<Option<AgentState>> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .with_context(|| format!("{} is not valid agent state", self.path.display()))
    }

    fn save_sync(&self, state: &AgentState) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => std::path::Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating state directory {}", dir.display()))?;

        let mut body = serde_json::to_vec_pretty(state).context("encoding agent state")?;
        body.push(b'\n');

        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("staging state in {}", dir.display()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o600))
                .context("restricting state file mode")?;
        }
        tmp.write_all(&body).context("writing staged state")?;
        tmp.persist(&self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }

    fn clear_sync(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                Err(e).with_context(|| format!("removing {}", self.path.display()))
            }
            _ => Ok(()),
        }
    }
}

impl AgentStateStore for StateManager {
    async fn load_async(&self) -> Result<Option<AgentState>> {
        let mgr = Self::with_path(self.path.clone());
        tokio::task::spawn_blocking(move || mgr.load_sync())
            .await
            .context("state load task panicked")?
    }

    async fn save_async(&self, state: &AgentState) -> Result<()> {
        let mgr = Self::with_path(self.path.clone());
        let state = state.clone();
        tokio::task::spawn_blocking(move || mgr.save_sync(&state))
            .await
            .context("state save task panicked")?
    }

    async fn clear_async(&self) -> Result<()> {
        let mgr = Self::with_path(self.path.clone());
        tokio::task::spawn_blocking(move || mgr.clear_sync())
            .await
            .context("state clear task panicked")?
    }
}
