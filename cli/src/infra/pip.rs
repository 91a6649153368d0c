//! Infrastructure implementation of the `PackageInstaller` port.
//!
//! `PipInstaller<R>` routes every interpreter and pip call through a
//! `CommandRunner` with an empty environment, so host variables such as
//! `PIP_INDEX_URL` or `VIRTUAL_ENV` never leak into the isolated runtime.

use std::path::Path;
use std::process::Output;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, PackageInstaller};
use crate::domain::config::RuntimePrefix;
use crate::domain::error::InstallError;
use crate::domain::outcome::BestEffort;
use crate::domain::package::requirement;

/// Infrastructure adapter that drives pip inside a runtime prefix.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without spawning real processes.
pub struct PipInstaller<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> PipInstaller<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    async fn exec(&self, program: &Path, args: &[&str]) -> Result<Output> {
        let program = program
            .to_str()
            .with_context(|| format!("path is not valid UTF-8: {}", program.display()))?;
        self.runner.run_clean_env(program, args).await
    }

    /// Run a command that must exit 0.
    async fn exec_checked(&self, program: &Path, args: &[&str]) -> Result<Output> {
        let out = self.exec(program, args).await?;
        if out.status.success() {
            return Ok(out);
        }
        Err(InstallError::CommandFailed {
            command: format!("{} {}", program.display(), args.join(" ")),
            code: out.status.code(),
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        }
        .into())
    }

    async fn pip_install(&self, prefix: &RuntimePrefix, requirements: &[&str]) -> Result<()> {
        let mut args = vec!["install", "-U"];
        args.extend_from_slice(requirements);
        self.exec_checked(&prefix.pip, &args).await?;
        Ok(())
    }
}

impl<R: CommandRunner> PackageInstaller for PipInstaller<R> {
    async fn provision(&self, prefix: &RuntimePrefix) -> Result<BestEffort> {
        let root = prefix
            .root
            .to_str()
            .with_context(|| format!("path is not valid UTF-8: {}", prefix.root.display()))?;

        let venv = self.exec(&prefix.python, &["-m", "venv", root]).await?;
        if !venv.status.success() {
            let stderr = String::from_utf8_lossy(&venv.stderr).trim().to_string();
            tracing::error!(root, stderr = %stderr, "cannot create runtime");
            return Ok(BestEffort::Failed(format!("creating runtime: {stderr}")));
        }

        match self.exec_checked(&prefix.pip, &["install", "--upgrade", "pip"]).await {
            Ok(_) => Ok(BestEffort::Done),
            Err(e) => {
                tracing::error!(root, error = %format!("{e:#}"), "cannot upgrade pip");
                Ok(BestEffort::Failed(format!("upgrading pip: {e:#}")))
            }
        }
    }

    async fn install_extras(&self, prefix: &RuntimePrefix, packages: &[&str]) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }
        let mut args = vec!["install"];
        args.extend_from_slice(packages);
        self.exec_checked(&prefix.pip, &args).await?;
        Ok(())
    }

    async fn install_package(
        &self,
        prefix: &RuntimePrefix,
        name: &str,
        version: Option<&str>,
    ) -> Result<()> {
        let req = requirement(name, version);
        self.pip_install(prefix, &[&req]).await
    }

    async fn install_addon(&self, prefix: &RuntimePrefix, spec: &str) -> Result<()> {
        self.pip_install(prefix, &[spec]).await
    }

    async fn query_version(&self, prefix: &RuntimePrefix, name: &str) -> Result<String> {
        let out = self.exec_checked(&prefix.pip, &["show", name]).await?;
        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    }
}
