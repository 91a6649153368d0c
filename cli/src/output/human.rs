//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;

use crate::domain::outcome::Outcome;
use crate::domain::state::{AgentState, StatusKind, UnitStatus};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the result of a lifecycle trigger.
    pub fn render_outcome(&self, trigger: &str, outcome: &Outcome, state: &AgentState) {
        match outcome {
            Outcome::Completed(phase) => {
                self.ctx.success(&format!("{trigger}: {phase}"));
                self.render_unit_status(&state.status);
            }
            Outcome::Deferred(reason) => {
                self.ctx.warn(&format!("{trigger} deferred: {reason}"));
                self.ctx
                    .info("It will be retried on the next lifecycle trigger.");
            }
        }
    }

    /// Render a successful operator action message.
    pub fn render_action(&self, message: &str) {
        self.ctx.success(message);
    }

    /// Render raw package metadata.
    pub fn render_package_info(&self, info: &str) {
        if !self.ctx.quiet {
            println!("{info}");
        }
    }

    /// Render the persisted agent state.
    pub fn render_state(&self, agent: &str, state: &AgentState) {
        if self.ctx.quiet {
            return;
        }
        self.ctx.header(agent);
        self.ctx.kv("Installed:    ", yes_no(state.installed));
        self.ctx.kv("Configured:   ", yes_no(state.config_available));
        self.ctx.kv("Phase:        ", &state.phase.to_string());
        self.ctx.kv("Status:       ", &self.status_line(&state.status));
        if let Some(version) = &state.agent_version {
            self.ctx.kv("Agent version:", version);
        }
        if let Some(version) = &state.workload_version {
            self.ctx.kv("Bundle:       ", version);
        }
        if !state.deferred.is_empty() {
            let queued: Vec<String> = state.deferred.iter().map(ToString::to_string).collect();
            self.ctx.kv("Deferred:     ", &queued.join(", "));
        }
        if let Some(at) = state.updated_at {
            self.ctx.kv("Updated:      ", &at.to_rfc3339());
        }
        if !state.settings.is_empty() {
            println!();
            self.ctx.header("Settings:");
            for (key, value) in state.settings.iter() {
                println!("    {:<30} {}", key.style(self.ctx.styles.dim), mask(key, &value.to_string()));
            }
        }
    }

    /// Render the controller version.
    pub fn render_version(&self, version: &str) {
        if !self.ctx.quiet {
            println!("agentctl {version}");
        }
    }

    fn status_line(&self, status: &UnitStatus) -> String {
        let tag = status_tag(status.kind);
        format!("{} {}", tag.style(self.ctx.styles.status(status.kind)), status.message)
    }

    fn render_unit_status(&self, status: &UnitStatus) {
        let line = self.status_line(status);
        match status.kind {
            StatusKind::Blocked => self.ctx.warn(&line),
            StatusKind::Unknown => {}
            _ => self.ctx.info(&line),
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn status_tag(kind: StatusKind) -> &'static str {
    match kind {
        StatusKind::Unknown => "[unknown]",
        StatusKind::Maintenance => "[maintenance]",
        StatusKind::Waiting => "[waiting]",
        StatusKind::Active => "[active]",
        StatusKind::Blocked => "[blocked]",
    }
}

/// Hide values of settings that carry credentials.
fn mask(key: &str, value: &str) -> String {
    const SENSITIVE: [&str; 4] = ["secret", "password", "key-string", "dsn"];
    if SENSITIVE.iter().any(|s| key.contains(s)) {
        "********".to_string()
    } else {
        value.to_string()
    }
}
