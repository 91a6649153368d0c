//! Lifecycle trigger commands: install, config-changed, start, status-check,
//! upgrade-package and remove.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::SettingsSource;
use crate::commands::exit_code;
use crate::domain::state::{AgentState, Trigger};
use crate::output::{TerminalReporter, progress};

/// Run one lifecycle trigger (after replaying any deferred ones).
///
/// # Errors
///
/// Returns an error if settings cannot be loaded, the transition fails, or
/// the state cannot be persisted. A deferred trigger is not an error.
pub async fn run(app: &AppContext, trigger: Trigger) -> Result<ExitCode> {
    let raw = app.settings.load()?;
    let name = trigger.to_string();

    let reporter = if app.output.show_progress() && matches!(trigger, Trigger::Install { .. }) {
        TerminalReporter::with_spinner(
            &app.output,
            progress::spinner(&format!("installing {}...", app.profile.package)),
        )
    } else {
        TerminalReporter::new(&app.output)
    };
    let machine = app.machine(&reporter);

    let result = machine.dispatch(trigger, &raw).await;
    if let Some(pb) = reporter.spinner() {
        match &result {
            Ok(outcome) if !outcome.is_deferred() => progress::finish_ok(pb, &format!("{name} finished")),
            _ => progress::finish_warn(pb, &format!("{name} did not finish")),
        }
    }
    let outcome = result?;

    let state = machine.status().await?;
    app.renderer().outcome(&name, &outcome, &state)?;
    Ok(exit_code(&outcome))
}

/// Install the agent with the configured add-ons plus `extra`.
///
/// # Errors
///
/// See [`run`].
pub async fn install(app: &AppContext, extra: Vec<String>) -> Result<ExitCode> {
    let mut addons = app.config.addons.clone();
    for addon in extra {
        if !addons.contains(&addon) {
            addons.push(addon);
        }
    }
    run(app, Trigger::Install { addons }).await
}

/// Tear everything down and forget the state.
///
/// # Errors
///
/// Returns an error if the runtime prefix or state file cannot be deleted.
pub async fn remove(app: &AppContext) -> Result<ExitCode> {
    let reporter = TerminalReporter::new(&app.output);
    let outcome = app.machine(&reporter).remove().await?;
    app.renderer()
        .outcome("remove", &outcome, &AgentState::default())?;
    Ok(exit_code(&outcome))
}
