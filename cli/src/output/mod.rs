//! Output formatting module

pub mod human;
pub mod json;
pub mod progress;
pub mod reporter;
pub mod styles;

use anyhow::Result;
use console::Term;
use owo_colors::{OwoColorize as _, Style};

pub use human::HumanRenderer;
pub use json::JsonRenderer;
pub use reporter::TerminalReporter;
pub use styles::Styles;

use crate::domain::outcome::Outcome;
use crate::domain::state::AgentState;

/// Styling and terminal state shared by every renderer.
///
/// All printing helpers are no-ops when `quiet` is set, which `--json`
/// implies.
pub struct OutputContext {
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    pub quiet: bool,
}

impl OutputContext {
    /// Colors are used only on a TTY, and never with `--no-color` or
    /// `NO_COLOR` set.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let colored = is_tty && !no_color && std::env::var_os("NO_COLOR").is_none();
        Self {
            styles: if colored {
                Styles::colored()
            } else {
                Styles::default()
            },
            is_tty,
            quiet,
        }
    }

    /// Spinners only make sense on an interactive, non-quiet terminal.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    fn mark(&self, symbol: &str, style: Style, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", symbol.style(style));
        }
    }

    pub fn success(&self, msg: &str) {
        self.mark("✓", self.styles.success, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.mark("⚠", self.styles.warning, msg);
    }

    pub fn info(&self, msg: &str) {
        self.mark("ℹ", self.styles.info, msg);
    }

    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.header));
        }
    }

    /// Aligned `label  value` line with the label dimmed.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", key.style(self.styles.dim));
        }
    }
}

/// Output renderer selected by `--json`.
///
/// Commands call one method per result instead of branching on the mode.
pub enum Renderer<'a> {
    Human(HumanRenderer<'a>),
    Json(JsonRenderer),
}

impl<'a> Renderer<'a> {
    /// JSON when `json` is set, otherwise human output through `output`.
    #[must_use]
    pub fn for_mode(json: bool, output: &'a OutputContext) -> Self {
        if json {
            Self::Json(JsonRenderer)
        } else {
            Self::Human(HumanRenderer::new(output))
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn outcome(&self, trigger: &str, outcome: &Outcome, state: &AgentState) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_outcome(trigger, outcome, state);
                Ok(())
            }
            Self::Json(r) => r.render_outcome(trigger, outcome, state),
        }
    }

    /// `action` keys the JSON result; `message` is shown to humans.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn action(&self, action: &str, message: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_action(message);
                Ok(())
            }
            Self::Json(r) => r.render_action(action),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn package_info(&self, package: &str, info: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_package_info(info);
                Ok(())
            }
            Self::Json(r) => r.render_package_info(package, info),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn state(&self, agent: &str, state: &AgentState) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_state(agent, state);
                Ok(())
            }
            Self::Json(r) => r.render_state(state),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn version(&self, version: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_version(version);
                Ok(())
            }
            Self::Json(r) => r.render_version(version),
        }
    }
}
