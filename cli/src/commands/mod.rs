//! Command implementations

pub mod clear_cache;
pub mod lifecycle;
pub mod show_version;
pub mod status;
pub mod upgrade;
pub mod version;

use std::process::ExitCode;

use clap::Args;

use crate::domain::outcome::Outcome;

/// Exit status for a trigger that was deferred (`EX_TEMPFAIL`).
pub const EXIT_DEFERRED: u8 = 75;

/// Map a lifecycle outcome to the process exit status.
#[must_use]
pub fn exit_code(outcome: &Outcome) -> ExitCode {
    if outcome.is_deferred() {
        ExitCode::from(EXIT_DEFERRED)
    } else {
        ExitCode::SUCCESS
    }
}

/// Arguments for the install command.
#[derive(Args, Debug, Default)]
pub struct InstallArgs {
    /// Extra add-on requirement to install with the agent (repeatable)
    #[arg(long = "addon", value_name = "SPEC")]
    pub addons: Vec<String>,
}

/// Arguments for the upgrade command.
#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// Agent package version to pin, e.g. 3.2.1
    #[arg(id = "target_version", value_name = "VERSION")]
    pub target_version: String,
}
