//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly.

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::OutputContext;

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// With a spinner attached, `step()` updates the spinner message and other
/// lines are printed above it. Everything is suppressed when `ctx.quiet`.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    spinner: Option<ProgressBar>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx, spinner: None }
    }

    /// Route step messages through `spinner`.
    #[must_use]
    pub fn with_spinner(ctx: &'a OutputContext, spinner: ProgressBar) -> Self {
        Self {
            ctx,
            spinner: Some(spinner),
        }
    }

    /// The attached spinner, if any.
    #[must_use]
    pub fn spinner(&self) -> Option<&ProgressBar> {
        self.spinner.as_ref()
    }

    fn line(&self, line: String) {
        match &self.spinner {
            Some(pb) => pb.println(line),
            None => println!("{line}"),
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        match &self.spinner {
            Some(pb) => pb.set_message(message.to_string()),
            None => println!("  {} {message}", "→".style(self.ctx.styles.info)),
        }
    }

    fn success(&self, message: &str) {
        if !self.ctx.quiet {
            self.line(format!("  {} {message}", "✓".style(self.ctx.styles.success)));
        }
    }

    fn warn(&self, message: &str) {
        if !self.ctx.quiet {
            self.line(format!("  {} {message}", "!".style(self.ctx.styles.warning)));
        }
    }
}
