//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use agentctl_common::AgentKind;
use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;
use crate::domain::state::Trigger;
use crate::output::{OutputContext, Renderer};

/// Lifecycle manager for the cluster and jobbergate agents
#[derive(Parser, Debug)]
#[command(
    name = "agentctl",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Controller config file
    #[arg(long, global = true, env = "AGENTCTL_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Agent to manage (overrides the config file)
    #[arg(long, global = true, value_enum)]
    pub agent: Option<AgentKind>,

    /// Raw agent settings file (overrides the config file)
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install the agent into its isolated runtime and set up its units
    Install(commands::InstallArgs),

    /// Re-read settings and rewrite the agent environment
    ConfigChanged,

    /// Start the agent once it is installed and configured
    Start,

    /// Check the agent is still running
    StatusCheck,

    /// Record the controller bundle version after an upgrade
    UpgradePackage,

    /// Stop the agent and delete its runtime, units and state
    Remove,

    /// Pin the agent package to a specific version
    Upgrade(commands::UpgradeArgs),

    /// Show the installed agent package metadata
    ShowVersion,

    /// Clear the agent cache directory
    ClearCacheDir,

    /// Show the persisted agent state
    Status,

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or the command
    /// fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            config,
            agent,
            settings,
            command,
        } = self;

        if let Command::Version = command {
            let output = OutputContext::new(no_color, quiet || json);
            return commands::version::run(&Renderer::for_mode(json, &output));
        }

        let app = AppContext::new(AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            config,
            agent,
            settings,
        })?;

        match command {
            Command::Install(args) => commands::lifecycle::install(&app, args.addons).await,
            Command::ConfigChanged => commands::lifecycle::run(&app, Trigger::ConfigChanged).await,
            Command::Start => commands::lifecycle::run(&app, Trigger::Start).await,
            Command::StatusCheck => commands::lifecycle::run(&app, Trigger::StatusCheck).await,
            Command::UpgradePackage => {
                commands::lifecycle::run(&app, Trigger::UpgradePackage).await
            }
            Command::Remove => commands::lifecycle::remove(&app).await,
            Command::Upgrade(args) => commands::upgrade::run(&app, &args).await,
            Command::ShowVersion => commands::show_version::run(&app).await,
            Command::ClearCacheDir => commands::clear_cache::run(&app).await,
            Command::Status => commands::status::run(&app).await,
            Command::Version => commands::version::run(&app.renderer()),
        }
    }
}
